use std::time::Duration;

use serde::de::DeserializeOwned;

use super::RuleSource;
use crate::agent::Agent;
use crate::config::ClientConfig;
use crate::error::{EngineError, FetchErrorKind, Result};
use crate::types::{Page, PaginatedResult, Redirect, RuleSet};

/// Default number of items requested per page
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Default timeout for a single manager request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// RuleSource backed by the rule manager HTTP API.
///
/// Lists are read page by page until the manager reports nothing more;
/// the token is sent in the configured authorization header.
pub struct HttpRuleSource {
    base_url: String,
    header_name: String,
    token: String,
    page_limit: usize,
    agent: ureq::Agent,
}

impl HttpRuleSource {
    /// Create a source for the project named in `config`
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: format!(
                "{}/api/namespaces/{}/projects/{}",
                config.manager_url.trim_end_matches('/'),
                config.namespace_code,
                config.project_code
            ),
            header_name: config.header_authorization_name.clone(),
            token: config.token_jwt.clone(),
            page_limit: DEFAULT_PAGE_LIMIT,
            agent: build_agent(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Set the page size used for listings
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit.max(1);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch_all<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/{}?limit={}&offset={}",
                self.base_url, resource, self.page_limit, offset
            );
            let page: PaginatedResult<T> = self.get_json(&url)?;
            let received = page.items.len();
            let has_more = page.has_more();
            items.extend(page.items);

            if received == 0 || !has_more {
                break;
            }
            offset += received;
        }

        Ok(items)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .agent
            .get(url)
            .header(self.header_name.as_str(), self.token.as_str())
            .call()
            .map_err(|e| request_error(url, e))?;

        let (_, body) = response.into_parts();
        let reader = body.into_reader();
        serde_json::from_reader(reader).map_err(|e| {
            EngineError::fetch(
                FetchErrorKind::Decode,
                format!("Invalid response from {}: {}", url, e),
            )
        })
    }
}

impl RuleSource for HttpRuleSource {
    fn fetch(&self) -> Result<RuleSet> {
        let redirects: Vec<Redirect> = self.fetch_all("redirects")?;
        let pages: Vec<Page> = self.fetch_all("pages")?;
        Ok(RuleSet::new(redirects, pages))
    }

    fn report(&self, agent: &Agent) -> Result<()> {
        let url = format!("{}/agents", self.base_url);
        let body = serde_json::to_vec(agent)?;

        self.agent
            .post(url.as_str())
            .header(self.header_name.as_str(), self.token.as_str())
            .header("Content-Type", "application/json")
            .send(body.as_slice())
            .map_err(|e| request_error(&url, e))?;
        Ok(())
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    ureq::Agent::new_with_config(config)
}

fn request_error(url: &str, err: ureq::Error) -> EngineError {
    match err {
        ureq::Error::StatusCode(code) => EngineError::fetch(
            FetchErrorKind::Status,
            format!("{} returned status {}", url, code),
        ),
        other => EngineError::fetch(
            FetchErrorKind::Request,
            format!("Request to {} failed: {}", url, other),
        ),
    }
}

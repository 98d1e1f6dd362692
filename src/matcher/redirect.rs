use std::sync::Arc;

use regex::Regex;

use super::bucket::{CompiledRedirect, RegexBucketIndex};
use super::exact::ExactMatchIndex;
use super::prefix::extract_regex_prefix;
use crate::error::{EngineError, Result};
use crate::types::{Redirect, RedirectMatch, RedirectType};

/// Redirect matcher.
///
/// Lookup tiers, each tried only when the previous one missed:
/// 1. `BASIC_HOST` exact on host + uri
/// 2. `BASIC` exact on uri
/// 3. `REGEX_HOST` candidates on host + uri
/// 4. `REGEX` candidates on uri
///
/// Built once per snapshot, then only read. Matching takes `&self` and keeps
/// no interior state, so a published matcher can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct RedirectMatcher {
    basic_host: ExactMatchIndex<Arc<Redirect>>,
    basic: ExactMatchIndex<Arc<Redirect>>,
    regex_host: RegexBucketIndex,
    regex: RegexBucketIndex,
}

impl RedirectMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a redirect rule.
    ///
    /// Fails only when a regex rule does not compile; the matcher is left
    /// unchanged in that case. Rules of unknown type are ignored.
    pub fn insert(&mut self, redirect: impl Into<Arc<Redirect>>) -> Result<()> {
        let redirect = redirect.into();

        if redirect.redirect_type == RedirectType::Unknown {
            tracing::debug!(source = %redirect.source, "ignoring redirect of unknown type");
            return Ok(());
        }

        let host_scoped = redirect.redirect_type.is_host_scoped();

        if redirect.redirect_type.is_regex() {
            let regex = Regex::new(&redirect.source).map_err(|source| EngineError::InvalidRegex {
                pattern: redirect.source.clone(),
                source,
            })?;

            let prefix = extract_regex_prefix(&redirect.source);
            let index = if host_scoped {
                &mut self.regex_host
            } else {
                &mut self.regex
            };
            index.insert(&prefix, CompiledRedirect::new(redirect, regex));
        } else {
            let index = if host_scoped {
                &mut self.basic_host
            } else {
                &mut self.basic
            };
            let key = redirect.source.clone();
            if index.insert(key, redirect).is_some() {
                tracing::debug!(host_scoped, "replaced duplicate exact redirect");
            }
        }
        Ok(())
    }

    /// Find the redirect for a request, `None` when no tier matches.
    pub fn match_request(&self, host: &str, uri: &str) -> Option<RedirectMatch> {
        let host_uri = join_host_uri(host, uri);

        if let Some(redirect) = self.basic_host.get(&host_uri) {
            return Some(literal_match(redirect));
        }

        if let Some(redirect) = self.basic.get(uri) {
            return Some(literal_match(redirect));
        }

        if let Some(found) = self.regex_host.find_match(&host_uri) {
            return Some(found);
        }

        self.regex.find_match(uri)
    }

    /// Total number of stored rules
    pub fn len(&self) -> usize {
        self.basic_host.len() + self.basic.len() + self.regex_host.len() + self.regex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn literal_match(redirect: &Arc<Redirect>) -> RedirectMatch {
    RedirectMatch {
        redirect: redirect.clone(),
        target: redirect.target.clone(),
    }
}

/// Matching key for host-scoped rules: host immediately followed by the uri.
pub(crate) fn join_host_uri(host: &str, uri: &str) -> String {
    let mut key = String::with_capacity(host.len() + uri.len());
    key.push_str(host);
    key.push_str(uri);
    key
}

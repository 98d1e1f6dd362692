//! Request interception.
//!
//! [`Middleware`] picks the rule client for a request's host and turns the
//! client's answer into an [`Interception`] for the embedding HTTP server to
//! carry out. It performs no I/O itself.

use std::collections::HashMap;
use std::sync::Arc;

use crate::client::{Client, RuleClient};
use crate::config::{ClientConfig, ClientSettings, Config};
use crate::error::{EngineError, Result};

/// Debug header carrying the snapshot version
pub const HEADER_VERSION: &str = "X-Rules-Version";
/// Debug header carrying the matched host + uri
pub const HEADER_URL: &str = "X-Rules-Url";
/// Debug header describing the matched redirect
pub const HEADER_REDIRECT: &str = "X-Rules-Redirect";

/// What the server should do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Answer with `status` and a `Location` header
    Redirect { status: u16, location: String },
    /// Answer 200 with `body` as `content_type`
    Page {
        content_type: &'static str,
        body: String,
    },
    /// Hand the request to the next handler
    Continue,
}

/// Decision for one request plus any debug headers to add to the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interception {
    pub action: Action,
    pub headers: Vec<(&'static str, String)>,
}

impl Interception {
    fn pass() -> Self {
        Self {
            action: Action::Continue,
            headers: Vec::new(),
        }
    }

    pub fn is_continue(&self) -> bool {
        self.action == Action::Continue
    }
}

/// Redirect and page middleware
pub struct Middleware {
    name: String,
    debug: bool,
    default_client: Option<Arc<dyn RuleClient>>,
    host_clients: HashMap<String, Arc<dyn RuleClient>>,
    /// Distinct clients keyed by settings key
    clients: Vec<(String, Arc<dyn RuleClient>)>,
}

impl Middleware {
    /// Create the middleware with clients talking to the rule manager
    pub fn new(name: impl Into<String>, config: &Config) -> Result<Self> {
        Self::with_factory(name, config, |client_config| {
            Arc::new(Client::new(client_config)) as Arc<dyn RuleClient>
        })
    }

    /// Create the middleware with a custom client factory.
    ///
    /// Client initialization failures are logged and left to the refresh
    /// task to recover from; configuration errors are returned.
    pub fn with_factory<F>(name: impl Into<String>, config: &Config, factory: F) -> Result<Self>
    where
        F: Fn(ClientConfig) -> Arc<dyn RuleClient>,
    {
        let name = name.into();
        config.validate().map_err(|e| prefix_error(&name, e))?;

        let mut middleware = Self {
            name,
            debug: config.debug,
            default_client: None,
            host_clients: HashMap::new(),
            clients: Vec::new(),
        };

        let mut by_key: HashMap<String, Arc<dyn RuleClient>> = HashMap::new();

        if !config.settings.project_code.is_empty() {
            let client = middleware.create_client(&config.settings, &factory)?;
            by_key.insert(config.settings.key(), client.clone());
            middleware.default_client = Some(client);
        }

        for host_config in &config.host_configs {
            let merged = config.settings.merge(&host_config.settings);
            let key = merged.key();

            let client = match by_key.get(&key) {
                Some(client) => client.clone(),
                None => {
                    let client = middleware.create_client(&merged, &factory)?;
                    by_key.insert(key, client.clone());
                    client
                }
            };

            for host in &host_config.hosts {
                middleware.host_clients.insert(host.clone(), client.clone());
            }
        }

        Ok(middleware)
    }

    fn create_client<F>(
        &mut self,
        settings: &ClientSettings,
        factory: &F,
    ) -> Result<Arc<dyn RuleClient>>
    where
        F: Fn(ClientConfig) -> Arc<dyn RuleClient>,
    {
        let key = settings.key();
        let client_config = settings.transform(&self.name)?;
        let client = factory(client_config);

        if let Err(e) = client.init() {
            tracing::warn!(
                middleware = %self.name,
                key = %key,
                error = %e,
                "failed to initialize client, refresh will retry"
            );
        }

        self.clients.push((key, client.clone()));
        Ok(client)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct clients owned by this middleware
    pub fn clients(&self) -> impl Iterator<Item = &Arc<dyn RuleClient>> {
        self.clients.iter().map(|(_, client)| client)
    }

    /// Client serving `host`. A `:port` suffix is ignored.
    pub fn client_for_host(&self, host: &str) -> Option<&Arc<dyn RuleClient>> {
        let bare = host.split_once(':').map_or(host, |(name, _)| name);
        self.host_clients
            .get(bare)
            .or(self.default_client.as_ref())
    }

    /// Decide what to do with a request for `host` and `uri`.
    ///
    /// `uri` is the request URI including any query string. Redirects are
    /// checked before pages.
    pub fn intercept(&self, host: &str, uri: &str) -> Interception {
        let Some(client) = self.client_for_host(host) else {
            return Interception::pass();
        };

        let mut headers = Vec::new();
        if self.debug {
            headers.push((HEADER_VERSION, client.state_version().to_string()));
            headers.push((HEADER_URL, format!("{}{}", host, uri)));
        }

        if let Some(matched) = client.redirect_match(host, uri) {
            if self.debug {
                headers.push((
                    HEADER_REDIRECT,
                    format!(
                        "{:?} {} -> {} ({})",
                        matched.redirect.redirect_type,
                        matched.redirect.source,
                        matched.redirect.target,
                        matched.http_code()
                    ),
                ));
            }
            return Interception {
                action: Action::Redirect {
                    status: matched.http_code(),
                    location: matched.target,
                },
                headers,
            };
        }

        if let Some(page) = client.page_match(host, uri) {
            return Interception {
                action: Action::Page {
                    content_type: page.http_content_type(),
                    body: page.content.clone(),
                },
                headers,
            };
        }

        Interception {
            action: Action::Continue,
            headers,
        }
    }

    /// Start one refresh task per client and hand them to `registry`,
    /// replacing the tasks of any earlier middleware with the same name.
    #[cfg(feature = "async")]
    pub fn start_refresh(&self, registry: &crate::refresh::RefreshRegistry) {
        let handles = self
            .clients
            .iter()
            .map(|(key, client)| {
                tracing::debug!(middleware = %self.name, key = %key, "starting refresh");
                crate::refresh::spawn_refresh(client.clone(), client.interval())
            })
            .collect();
        registry.register(self.name.clone(), handles);
    }
}

fn prefix_error(name: &str, err: EngineError) -> EngineError {
    match err {
        EngineError::ConfigError(message) => {
            EngineError::ConfigError(format!("{}: {}", name, message))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use crate::source::MemoryRuleSource;
    use crate::types::{
        Page, PageContentType, PageType, Redirect, RedirectStatus, RedirectType, RuleSet,
    };
    use parking_lot::Mutex;

    fn settings(project: &str) -> ClientSettings {
        ClientSettings {
            manager_url: "http://manager".to_string(),
            namespace_code: "ns".to_string(),
            project_code: project.to_string(),
            token_jwt: "jwt".to_string(),
            ..ClientSettings::default()
        }
    }

    fn rules_for(project: &str) -> RuleSet {
        RuleSet::new(
            vec![Redirect::new(
                RedirectType::Basic,
                "/old",
                format!("/{}", project),
                RedirectStatus::MovedPermanent,
            )],
            vec![Page::new(
                PageType::Basic,
                "/robots.txt",
                format!("robots for {}", project),
                PageContentType::TextPlain,
            )],
        )
    }

    /// Factory serving each project's fixed rules, recording created projects
    fn memory_factory(
        created: Arc<Mutex<Vec<String>>>,
    ) -> impl Fn(ClientConfig) -> Arc<dyn RuleClient> {
        move |config: ClientConfig| {
            created.lock().push(config.project_code.clone());
            let source = MemoryRuleSource::new(rules_for(&config.project_code));
            Arc::new(Client::with_source(config, Box::new(source))) as Arc<dyn RuleClient>
        }
    }

    #[test]
    fn test_default_client_only() {
        let config = Config {
            settings: settings("main"),
            ..Config::default()
        };
        let created = Arc::new(Mutex::new(Vec::new()));
        let middleware = Middleware::with_factory("rules", &config, memory_factory(created)).unwrap();

        let result = middleware.intercept("any.com", "/old");
        assert_eq!(
            result.action,
            Action::Redirect {
                status: 301,
                location: "/main".to_string()
            }
        );
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_host_clients_are_shared_by_settings() {
        let config = Config {
            settings: settings(""),
            host_configs: vec![
                HostConfig {
                    hosts: vec!["shop.com".to_string()],
                    settings: ClientSettings {
                        project_code: "shop".to_string(),
                        ..ClientSettings::default()
                    },
                },
                HostConfig {
                    hosts: vec!["www.shop.com".to_string()],
                    settings: ClientSettings {
                        project_code: "shop".to_string(),
                        ..ClientSettings::default()
                    },
                },
                HostConfig {
                    hosts: vec!["blog.com".to_string()],
                    settings: ClientSettings {
                        project_code: "blog".to_string(),
                        ..ClientSettings::default()
                    },
                },
            ],
            ..Config::default()
        };
        let created = Arc::new(Mutex::new(Vec::new()));
        let middleware =
            Middleware::with_factory("rules", &config, memory_factory(created.clone())).unwrap();

        assert_eq!(*created.lock(), vec!["shop".to_string(), "blog".to_string()]);
        assert_eq!(middleware.clients().count(), 2);

        let shop = middleware.intercept("www.shop.com:8443", "/old");
        assert_eq!(
            shop.action,
            Action::Redirect {
                status: 301,
                location: "/shop".to_string()
            }
        );

        // No default client configured
        assert!(middleware.intercept("unknown.com", "/old").is_continue());
    }

    #[test]
    fn test_page_and_continue() {
        let config = Config {
            settings: settings("main"),
            ..Config::default()
        };
        let created = Arc::new(Mutex::new(Vec::new()));
        let middleware = Middleware::with_factory("rules", &config, memory_factory(created)).unwrap();

        let page = middleware.intercept("a.com", "/robots.txt");
        assert_eq!(
            page.action,
            Action::Page {
                content_type: "text/plain",
                body: "robots for main".to_string()
            }
        );

        assert!(middleware.intercept("a.com", "/elsewhere").is_continue());
    }

    #[test]
    fn test_debug_headers() {
        let config = Config {
            settings: settings("main"),
            debug: true,
            ..Config::default()
        };
        let created = Arc::new(Mutex::new(Vec::new()));
        let middleware = Middleware::with_factory("rules", &config, memory_factory(created)).unwrap();

        let result = middleware.intercept("a.com", "/old");
        let names: Vec<&str> = result.headers.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec![HEADER_VERSION, HEADER_URL, HEADER_REDIRECT]);
        assert_eq!(result.headers[0].1, "1");
        assert_eq!(result.headers[1].1, "a.com/old");

        let result = middleware.intercept("a.com", "/elsewhere");
        assert_eq!(result.headers.len(), 2);
    }

    #[test]
    fn test_invalid_config_is_prefixed() {
        let created = Arc::new(Mutex::new(Vec::new()));
        let err = Middleware::with_factory("rules", &Config::default(), memory_factory(created))
            .err()
            .unwrap();
        assert!(err.to_string().contains("rules: either"), "got: {}", err);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let config = Config {
            settings: ClientSettings {
                token_jwt: String::new(),
                ..settings("main")
            },
            ..Config::default()
        };
        let created = Arc::new(Mutex::new(Vec::new()));
        let err = Middleware::with_factory("rules", &config, memory_factory(created))
            .err()
            .unwrap();
        assert!(err.to_string().contains("rules: missing configuration"), "got: {}", err);
    }
}

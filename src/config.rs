//! Middleware and client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::AgentType;
use crate::error::{EngineError, Result};

/// Header carrying the token when none is configured
pub const DEFAULT_HEADER_AUTHORIZATION_NAME: &str = "Authorization";

/// Reload interval when none is configured
pub const DEFAULT_INTERVAL_CHECK: Duration = Duration::from_secs(30);

/// Agent name when none is configured
pub const DEFAULT_AGENT_NAME: &str = "default";

/// Connection settings for one rule manager project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub manager_url: String,
    pub namespace_code: String,
    pub project_code: String,
    pub header_authorization_name: String,
    pub token_jwt: String,
    /// Reload interval as a duration string, e.g. `"30s"` or `"1m 30s"`.
    ///
    /// Parsed by `humantime`: each component is an integer with a unit, so
    /// fractional values such as `"1.5m"` are rejected; write `"1m 30s"`
    /// or `"90s"` instead.
    pub interval_check: String,
    pub agent_name: String,
}

impl ClientSettings {
    /// Overlay `override_settings` on top of these settings.
    ///
    /// Non-empty override values win. `project_code` is never inherited and
    /// `agent_name` is never overridden.
    pub fn merge(&self, override_settings: &ClientSettings) -> ClientSettings {
        fn pick(parent: &str, child: &str) -> String {
            if child.is_empty() {
                parent.to_string()
            } else {
                child.to_string()
            }
        }

        ClientSettings {
            manager_url: pick(&self.manager_url, &override_settings.manager_url),
            namespace_code: pick(&self.namespace_code, &override_settings.namespace_code),
            project_code: override_settings.project_code.clone(),
            header_authorization_name: pick(
                &self.header_authorization_name,
                &override_settings.header_authorization_name,
            ),
            token_jwt: pick(&self.token_jwt, &override_settings.token_jwt),
            interval_check: pick(&self.interval_check, &override_settings.interval_check),
            agent_name: self.agent_name.clone(),
        }
    }

    /// Key shared by settings that can use the same client
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.manager_url, self.namespace_code, self.project_code
        )
    }

    /// Resolve defaults and check mandatory fields. `name` prefixes errors.
    pub fn transform(&self, name: &str) -> Result<ClientConfig> {
        if self.manager_url.is_empty()
            || self.namespace_code.is_empty()
            || self.project_code.is_empty()
            || self.token_jwt.is_empty()
        {
            return Err(EngineError::ConfigError(format!(
                "{}: missing configuration, manager_url, namespace_code, project_code or token_jwt is mandatory",
                name
            )));
        }

        let interval_check = if self.interval_check.is_empty() {
            DEFAULT_INTERVAL_CHECK
        } else {
            humantime::parse_duration(&self.interval_check).map_err(|e| {
                EngineError::ConfigError(format!(
                    "{}: invalid interval check duration ({})",
                    name, e
                ))
            })?
        };

        Ok(ClientConfig {
            manager_url: self.manager_url.clone(),
            namespace_code: self.namespace_code.clone(),
            project_code: self.project_code.clone(),
            header_authorization_name: non_empty_or(
                &self.header_authorization_name,
                DEFAULT_HEADER_AUTHORIZATION_NAME,
            ),
            token_jwt: self.token_jwt.clone(),
            interval_check,
            agent_name: non_empty_or(&self.agent_name, DEFAULT_AGENT_NAME),
            agent_type: AgentType::Default,
        })
    }
}

/// Configuration for the hosts listed in `hosts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(flatten)]
    pub settings: ClientSettings,
}

/// Middleware configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub settings: ClientSettings,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub host_configs: Vec<HostConfig>,
}

impl Config {
    /// Parse a JSON configuration
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.settings.project_code.is_empty() && self.host_configs.is_empty() {
            return Err(EngineError::ConfigError(
                "either project_code or host_configs must be configured".to_string(),
            ));
        }

        for (i, host_config) in self.host_configs.iter().enumerate() {
            if host_config.hosts.is_empty() {
                return Err(EngineError::ConfigError(format!(
                    "host_configs[{}]: hosts is required and cannot be empty",
                    i
                )));
            }
            if host_config.settings.project_code.is_empty() {
                return Err(EngineError::ConfigError(format!(
                    "host_configs[{}]: project_code is required",
                    i
                )));
            }
        }
        Ok(())
    }
}

/// Fully resolved settings for one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub manager_url: String,
    pub namespace_code: String,
    pub project_code: String,
    pub header_authorization_name: String,
    pub token_jwt: String,
    pub interval_check: Duration,
    pub agent_name: String,
    pub agent_type: AgentType,
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

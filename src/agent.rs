//! Agent status reports sent back to the rule manager after each reload.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

static AGENT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]+$").expect("AGENT_NAME_REGEX: hardcoded regex is invalid")
});

/// Kind of process embedding the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    #[default]
    Default,
    Traefik,
}

/// Outcome of the last reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Error,
}

/// Agent report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AgentStatus>,
    #[serde(rename = "type", default)]
    pub agent_type: AgentType,
    /// Snapshot version in use
    #[serde(default)]
    pub version: u64,
    /// Time spent on the reload, integer nanoseconds on the wire
    #[serde(default, with = "duration_nanos")]
    pub load_duration: Duration,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl Agent {
    pub fn success(
        name: impl Into<String>,
        agent_type: AgentType,
        version: u64,
        load_duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            status: Some(AgentStatus::Success),
            agent_type,
            version,
            load_duration,
            error: String::new(),
        }
    }

    pub fn failure(
        name: impl Into<String>,
        agent_type: AgentType,
        version: u64,
        load_duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: Some(AgentStatus::Error),
            agent_type,
            version,
            load_duration,
            error: error.into(),
        }
    }
}

/// Check an agent report before it is sent.
///
/// Type and status are closed enums, so only the name and version can be
/// invalid here.
pub fn validate_agent(agent: &Agent) -> Result<()> {
    if !AGENT_NAME_REGEX.is_match(&agent.name) {
        return Err(EngineError::InvalidAgent(format!(
            "invalid agent name '{}': only alphanumeric characters, underscores and hyphens are allowed",
            agent.name
        )));
    }
    if agent.version == 0 {
        return Err(EngineError::InvalidAgent(
            "agent version is required".to_string(),
        ));
    }
    Ok(())
}

/// Serde adapter: writes nanoseconds, reads nanoseconds or a duration string
/// such as `"10ms"` or `"1m 30s"`.
pub mod duration_nanos {
    use std::time::Duration;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Nanos(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Nanos(nanos) => Ok(Duration::from_nanos(nanos)),
            Raw::Text(text) => humantime::parse_duration(&text)
                .map_err(|e| D::Error::custom(format!("invalid duration string '{}': {}", text, e))),
        }
    }
}

use thiserror::Error;

/// Classifies rule source fetch errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request could not be sent or the connection failed
    Request,
    /// The manager answered with a non-success status
    Status,
    /// The response body could not be decoded
    Decode,
}

/// Redirect engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Fetch error: {message}")]
    FetchError {
        kind: FetchErrorKind,
        message: String,
    },

    #[error("Invalid agent: {0}")]
    InvalidAgent(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn fetch(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        EngineError::FetchError {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! SDK error types

use thiserror::Error;

/// SDK Result type
pub type KarmaResult<T> = std::result::Result<T, KarmaError>;

/// Everything that can go wrong talking to the platform
#[derive(Debug, Error)]
pub enum KarmaError {
    /// Non-2xx response. `message` is the body's `error` field when present.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        body: serde_json::Value,
    },

    /// Key handed to a client of the wrong scope
    #[error("{client} requires an {expected_prefix} key")]
    InvalidCredential {
        client: &'static str,
        expected_prefix: &'static str,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// 2xx reply that decoded but made no sense
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl KarmaError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

//! Error types for the JSON:API repository client.
//!
//! Two tiers: [`Error`] is what every repository call can fail with, and
//! [`ApiError`] is the typed failure raised for a non-success response that
//! does not carry a JSON:API `errors` payload. Responses that do carry one are
//! not errors at all; they come back as data through [`crate::Resolved`].

use serde_json::Value;
use thiserror::Error;

/// Main error type for repository operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The transport could not complete the exchange (DNS, connect, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document could not be turned into resource objects
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream API error
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// Get the API error, if this is one.
    #[must_use]
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// A non-success response the server did not describe with an `errors` list.
///
/// `trace` holds whatever the server put under `trace` in the body, copied
/// verbatim. It is informational only.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{status_code}] {message}")]
pub struct ApiError {
    status_code: u16,
    message: String,
    trace: Option<Value>,
}

impl ApiError {
    /// Create a new API error.
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>, trace: Option<Value>) -> Self {
        Self {
            status_code,
            message: message.into(),
            trace,
        }
    }

    /// Get the HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the upstream trace, if the server sent one.
    #[must_use]
    pub fn trace(&self) -> Option<&Value> {
        self.trace.as_ref()
    }

    /// Check if the status is a 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Check if the status is a 5xx.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }
}

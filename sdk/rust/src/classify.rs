//! Response classification.
//!
//! Decides, once per response, whether the body goes back to the caller or
//! the call fails with an [`ApiError`]:
//!
//! 1. a 2xx status passes;
//! 2. any other status passes if the body has an `errors` key. A JSON:API
//!    error document is validation data for the caller, not a failure;
//! 3. everything else is raised with the body's `message` and `trace`.

use serde_json::Value;

use crate::error::ApiError;
use crate::transport::TransportResponse;

/// Outcome of classifying one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Hand the response on to resolution
    Pass,
    /// Fail the call
    Raise(ApiError),
}

/// Classify a transport response.
#[must_use]
pub fn classify(response: &TransportResponse) -> Classification {
    if response.is_success() || has_errors(&response.body) {
        tracing::debug!(status = response.status_code, "response passed classification");
        return Classification::Pass;
    }

    let message = response
        .body
        .get("message")
        .and_then(Value::as_str)
        .map_or_else(|| format!("HTTP {}", response.status_code), str::to_string);
    let trace = response.body.get("trace").cloned();

    tracing::warn!(status = response.status_code, %message, "raising API error");

    Classification::Raise(ApiError::new(response.status_code, message, trace))
}

fn has_errors(body: &Value) -> bool {
    body.as_object().is_some_and(|o| o.contains_key("errors"))
}

//! Mock transport for testing.
//!
//! Provides a `MockTransport` that answers repository requests from a script
//! of canned responses and records every call, without touching the network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::Error;
use crate::query::pairs_to_string;
use crate::transport::{Transport, TransportResponse};

/// Record of a transport call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// HTTP method (e.g., "GET", "POST")
    pub method: String,
    /// Request URI
    pub uri: String,
    /// Query pairs (GET only)
    pub query: Vec<(String, String)>,
    /// JSON body, if one was sent
    pub body: Option<Value>,
    /// Timestamp of the call
    pub timestamp: DateTime<Utc>,
}

impl MockCall {
    /// Create a new mock call record.
    pub fn new(method: &str, uri: &str, query: &[(String, String)], body: Option<&Value>) -> Self {
        Self {
            method: method.to_string(),
            uri: uri.to_string(),
            query: query.to_vec(),
            body: body.cloned(),
            timestamp: Utc::now(),
        }
    }

    /// Query pairs rendered as `k=v&k=v`, unescaped.
    #[must_use]
    pub fn query_string(&self) -> String {
        pairs_to_string(&self.query)
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Complete the exchange with this status and body
    Reply(TransportResponse),
    /// Fail the exchange as if the connection could not be made
    TransportFailure(String),
}

impl MockResponse {
    /// Create a reply with a status and JSON body.
    pub fn with_data(status_code: u16, body: Value) -> Self {
        Self::Reply(TransportResponse::new(status_code, body))
    }

    /// Create a reply with a status and no body.
    pub fn empty(status_code: u16) -> Self {
        Self::Reply(TransportResponse::new(status_code, Value::Null))
    }

    /// Create a transport failure.
    pub fn with_error(message: &str) -> Self {
        Self::TransportFailure(message.to_string())
    }

    fn into_result(self) -> Result<TransportResponse, Error> {
        match self {
            Self::Reply(response) => Ok(response),
            Self::TransportFailure(message) => Err(Error::Transport(message)),
        }
    }
}

/// Internal state for the mock transport.
#[derive(Default)]
struct MockTransportState {
    responses: VecDeque<MockResponse>,
    fallback: Option<MockResponse>,
    calls: Vec<MockCall>,
}

impl MockTransportState {
    fn record_call(&mut self, call: MockCall) -> Result<TransportResponse, Error> {
        tracing::debug!(method = %call.method, uri = %call.uri, "mock transport call");
        self.calls.push(call);

        let response = self
            .responses
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| MockResponse::with_data(200, Value::Null));
        response.into_result()
    }
}

/// Scripted transport for tests.
///
/// Responses queued with [`MockTransport::enqueue`] are returned in order;
/// once the queue is empty the response set with [`MockTransport::respond`]
/// is repeated, or a 200 with no body if none was set.
///
/// ```rust
/// use std::sync::Arc;
/// use jsonapi_repository::testing::{MockResponse, MockTransport};
/// use jsonapi_repository::{Repository, RepositoryConfig};
///
/// let transport = MockTransport::new();
/// transport.enqueue(MockResponse::empty(204));
///
/// let repo = Repository::with_transport(
///     RepositoryConfig::new("https://api.example.com/users"),
///     Arc::new(transport.clone()),
/// );
/// # let _ = repo;
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

impl MockTransport {
    /// Create a mock transport with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered call.
    pub fn enqueue(&self, response: MockResponse) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .responses
            .push_back(response);
    }

    /// Set the response returned once the queue is empty.
    pub fn respond(&self, response: MockResponse) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fallback = Some(response);
    }

    /// Check if a method was called.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method (e.g., "GET", "PUT")
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .iter()
            .any(|call| call.method == method)
    }

    /// Get the number of times a method was called.
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Get recorded calls, optionally filtered by method.
    #[must_use]
    pub fn get_calls(&self, method: Option<&str>) -> Vec<MockCall> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match method {
            Some(m) => state.calls.iter().filter(|call| call.method == m).cloned().collect(),
            None => state.calls.clone(),
        }
    }

    /// Get the most recent call.
    #[must_use]
    pub fn last_call(&self) -> Option<MockCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .last()
            .cloned()
    }

    /// Reset recorded calls and scripted responses.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.clear();
        state.responses.clear();
        state.fallback = None;
    }

    fn call(&self, call: MockCall) -> Result<TransportResponse, Error> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record_call(call)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, uri: &str, query: &[(String, String)]) -> Result<TransportResponse, Error> {
        self.call(MockCall::new("GET", uri, query, None))
    }

    async fn post(&self, uri: &str, body: &Value) -> Result<TransportResponse, Error> {
        self.call(MockCall::new("POST", uri, &[], Some(body)))
    }

    async fn put(&self, uri: &str, body: Option<&Value>) -> Result<TransportResponse, Error> {
        self.call(MockCall::new("PUT", uri, &[], body))
    }

    async fn patch(&self, uri: &str, body: &Value) -> Result<TransportResponse, Error> {
        self.call(MockCall::new("PATCH", uri, &[], Some(body)))
    }

    async fn delete(&self, uri: &str) -> Result<TransportResponse, Error> {
        self.call(MockCall::new("DELETE", uri, &[], None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime should build")
            .block_on(future)
    }

    #[test]
    fn test_queued_responses_in_order() {
        let mock = MockTransport::new();
        mock.enqueue(MockResponse::with_data(201, json!({"data": null})));
        mock.enqueue(MockResponse::empty(204));

        let first = block_on(mock.post("https://x/users", &json!({}))).unwrap();
        let second = block_on(mock.delete("https://x/users/1")).unwrap();
        let third = block_on(mock.delete("https://x/users/2")).unwrap();

        assert_eq!(first.status_code, 201);
        assert_eq!(second.status_code, 204);
        assert_eq!(third, TransportResponse::new(200, Value::Null));
    }

    #[test]
    fn test_fallback_repeats() {
        let mock = MockTransport::new();
        mock.respond(MockResponse::with_data(200, json!({"data": []})));

        for _ in 0..3 {
            let response = block_on(mock.get("https://x/users", &[])).unwrap();
            assert_eq!(response.body, json!({"data": []}));
        }
        assert_eq!(mock.call_count("GET"), 3);
    }

    #[test]
    fn test_transport_failure() {
        let mock = MockTransport::new();
        mock.enqueue(MockResponse::with_error("connection refused"));

        let result = block_on(mock.get("https://x/users", &[]));
        assert!(matches!(result, Err(Error::Transport(ref m)) if m == "connection refused"));
        assert!(mock.was_called("GET"));
    }

    #[test]
    fn test_records_calls() {
        let mock = MockTransport::new();
        let query = vec![("page[limit]".to_string(), "1".to_string())];

        block_on(mock.get("https://x/users", &query)).unwrap();
        block_on(mock.put("https://x/users/1/restore", None)).unwrap();

        assert_eq!(mock.get_calls(None).len(), 2);
        let get = &mock.get_calls(Some("GET"))[0];
        assert_eq!(get.query_string(), "page[limit]=1");

        let last = mock.last_call().unwrap();
        assert_eq!(last.method, "PUT");
        assert_eq!(last.uri, "https://x/users/1/restore");
        assert!(last.body.is_none());
    }

    #[test]
    fn test_reset() {
        let mock = MockTransport::new();
        mock.enqueue(MockResponse::empty(204));
        block_on(mock.delete("https://x/users/1")).unwrap();

        mock.reset();
        assert_eq!(mock.call_count("DELETE"), 0);
        assert!(!mock.was_called("DELETE"));
        assert!(mock.get_calls(None).is_empty());
    }
}

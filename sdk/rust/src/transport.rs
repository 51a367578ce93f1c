//! HTTP transport for the JSON:API repository client.
//!
//! [`Transport`] is the seam between the repository pipeline and the network.
//! [`HttpTransport`] implements it with `reqwest`; tests use
//! [`crate::testing::MockTransport`].
//!
//! A transport reports every completed exchange as a [`TransportResponse`],
//! whatever the status. Only failures to complete the exchange at all
//! (DNS, connect, timeout) become `Error::Transport`. Nothing is retried.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// JSON:API media type, sent as `Accept` on every request and as
/// `Content-Type` on every request with a body.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Status and decoded body of one exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportResponse {
    /// HTTP status code
    pub status_code: u16,
    /// Decoded JSON body; `Value::Null` when the server sent none
    pub body: Value,
}

impl TransportResponse {
    /// Create a new transport response.
    #[must_use]
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    /// Check if the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Performs HTTP exchanges on behalf of a repository.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET with query pairs.
    async fn get(&self, uri: &str, query: &[(String, String)]) -> Result<TransportResponse, Error>;

    /// Issue a POST with a JSON body.
    async fn post(&self, uri: &str, body: &Value) -> Result<TransportResponse, Error>;

    /// Issue a PUT, with a JSON body when one is given.
    async fn put(&self, uri: &str, body: Option<&Value>) -> Result<TransportResponse, Error>;

    /// Issue a PATCH with a JSON body.
    async fn patch(&self, uri: &str, body: &Value) -> Result<TransportResponse, Error>;

    /// Issue a DELETE.
    async fn delete(&self, uri: &str) -> Result<TransportResponse, Error>;
}

/// `reqwest`-backed transport.
///
/// Default headers, the JSON:API `Accept` header and the timeout are fixed
/// when the transport is built. `Content-Type` is set per request on writes.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    ///
    /// # Arguments
    ///
    /// * `headers` - Headers sent with every request
    /// * `timeout` - Request timeout
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if a header is invalid or the client
    /// cannot be built.
    pub fn new(headers: &HashMap<String, String>, timeout: Duration) -> Result<Self, Error> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(JSON_API_MEDIA_TYPE));

        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Configuration(format!("Invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Configuration(format!("Invalid value for header {name}: {e}")))?;
            default_headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self { client })
    }

    async fn send(&self, request: RequestBuilder) -> Result<TransportResponse, Error> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status_code = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(TransportResponse::new(status_code, decode_body(&bytes)))
    }
}

/// Attach `body` as a JSON:API payload.
///
/// `RequestBuilder::json` would label the body `application/json`, and a
/// request-level header is never replaced by a client default.
fn with_json_api_body(request: RequestBuilder, body: &Value) -> Result<RequestBuilder, Error> {
    let bytes = serde_json::to_vec(body)?;
    Ok(request
        .header(CONTENT_TYPE, HeaderValue::from_static(JSON_API_MEDIA_TYPE))
        .body(bytes))
}

/// Decode a response body. Empty bodies become `null`; bodies that are not
/// JSON are kept as a string so the classifier still sees something.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, uri: &str, query: &[(String, String)]) -> Result<TransportResponse, Error> {
        self.send(self.client.get(uri).query(query)).await
    }

    async fn post(&self, uri: &str, body: &Value) -> Result<TransportResponse, Error> {
        self.send(with_json_api_body(self.client.post(uri), body)?).await
    }

    async fn put(&self, uri: &str, body: Option<&Value>) -> Result<TransportResponse, Error> {
        let mut request = self.client.put(uri);
        if let Some(b) = body {
            request = with_json_api_body(request, b)?;
        }
        self.send(request).await
    }

    async fn patch(&self, uri: &str, body: &Value) -> Result<TransportResponse, Error> {
        self.send(with_json_api_body(self.client.patch(uri), body)?).await
    }

    async fn delete(&self, uri: &str) -> Result<TransportResponse, Error> {
        self.send(self.client.delete(uri)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use serde_json::json;

    /// Serve one HTTP/1.1 exchange on a local port and hand back the raw
    /// request text, lowercased.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("should bind");
        let uri = format!("http://{}/users", listener.local_addr().expect("should have addr"));

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("should accept");
            let mut raw = Vec::new();
            let mut chunk = [0_u8; 1024];

            let header_end = loop {
                let n = stream.read(&mut chunk).expect("should read");
                assert!(n > 0, "connection closed before headers ended");
                raw.extend_from_slice(&chunk[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&raw[..header_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map_or(0, |v| v.trim().parse::<usize>().expect("numeric length"));
            while raw.len() < header_end + content_length {
                let n = stream.read(&mut chunk).expect("should read");
                assert!(n > 0, "connection closed before body ended");
                raw.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "{status_line}\r\ncontent-type: application/vnd.api+json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).expect("should write");

            String::from_utf8_lossy(&raw).to_lowercase()
        });

        (uri, handle)
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(&HashMap::new(), Duration::from_secs(5)).expect("should build")
    }

    fn content_types(request: &str) -> Vec<&str> {
        request
            .lines()
            .filter(|l| l.starts_with("content-type:"))
            .collect()
    }

    #[test]
    fn test_transport_response_success() {
        assert!(TransportResponse::new(200, Value::Null).is_success());
        assert!(TransportResponse::new(204, Value::Null).is_success());
        assert!(!TransportResponse::new(301, Value::Null).is_success());
        assert!(!TransportResponse::new(422, Value::Null).is_success());
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(br#"{"data": null}"#), json!({"data": null}));
        assert_eq!(decode_body(b"Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn test_transport_creation_with_headers() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer token".to_string());

        assert!(HttpTransport::new(&headers, Duration::from_secs(30)).is_ok());
    }

    #[test]
    fn test_transport_rejects_invalid_header() {
        let mut headers = HashMap::new();
        headers.insert("Bad Header".to_string(), "value".to_string());

        let result = HttpTransport::new(&headers, Duration::from_secs(30));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_post_sends_json_api_content_type() {
        let (uri, server) = serve_once("HTTP/1.1 201 Created", r#"{"data": {"id": "1", "type": "users"}}"#);

        let response = transport()
            .post(&uri, &json!({"data": {"type": "users", "attributes": {"name": "Bob"}}}))
            .await
            .expect("exchange should complete");
        let request = server.join().expect("server thread should finish");

        assert!(request.starts_with("post /users "));
        assert_eq!(content_types(&request), vec!["content-type: application/vnd.api+json"]);
        assert!(request.contains("accept: application/vnd.api+json"));
        assert!(request.ends_with(r#"{"data":{"attributes":{"name":"bob"},"type":"users"}}"#));
        assert_eq!(response.status_code, 201);
        assert_eq!(response.body, json!({"data": {"id": "1", "type": "users"}}));
    }

    #[tokio::test]
    async fn test_patch_and_put_send_json_api_content_type() {
        let (uri, server) = serve_once("HTTP/1.1 200 OK", "{}");
        transport()
            .patch(&format!("{uri}/1"), &json!({"data": {"id": "1"}}))
            .await
            .expect("exchange should complete");
        let request = server.join().expect("server thread should finish");
        assert!(request.starts_with("patch /users/1 "));
        assert_eq!(content_types(&request), vec!["content-type: application/vnd.api+json"]);

        let (uri, server) = serve_once("HTTP/1.1 200 OK", "{}");
        transport()
            .put(&format!("{uri}/1"), Some(&json!({"data": {"id": "1"}})))
            .await
            .expect("exchange should complete");
        let request = server.join().expect("server thread should finish");
        assert!(request.starts_with("put /users/1 "));
        assert_eq!(content_types(&request), vec!["content-type: application/vnd.api+json"]);
    }

    #[tokio::test]
    async fn test_get_sends_query_and_accept_without_body() {
        let (uri, server) = serve_once("HTTP/1.1 422 Unprocessable Entity", r#"{"errors": []}"#);

        let response = transport()
            .get(&uri, &[("filter[role]".to_string(), "admin".to_string())])
            .await
            .expect("exchange should complete");
        let request = server.join().expect("server thread should finish");

        assert!(request.starts_with("get /users?filter%5brole%5d=admin "));
        assert!(request.contains("accept: application/vnd.api+json"));
        assert!(content_types(&request).is_empty());
        assert_eq!(response.status_code, 422);
        assert_eq!(response.body, json!({"errors": []}));
    }
}

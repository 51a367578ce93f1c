//! Repository configuration.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::Error;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How a repository call hands its result back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// The whole transport response: status and body
    Raw,
    /// The JSON:API document as received
    Document,
    /// Resources flattened into entities
    Entity,
}

/// Configuration for one repository.
///
/// Values are immutable once built; the `with_*` methods consume the
/// configuration and return a new one.
///
/// ```rust
/// use jsonapi_repository::{RepositoryConfig, ResponseMode};
///
/// let config = RepositoryConfig::new("https://api.example.com/users/")
///     .with_header("Authorization", "Bearer token")
///     .with_include(["team", "roles"])
///     .with_entity_response(true);
///
/// assert_eq!(config.base_uri(), "https://api.example.com/users");
/// assert_eq!(config.response_mode(), ResponseMode::Entity);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    base_uri: String,
    headers: HashMap<String, String>,
    include: Vec<String>,
    full_response: bool,
    entity_response: bool,
    timeout: Duration,
}

impl RepositoryConfig {
    /// Create a configuration for the resource at `base_uri`.
    ///
    /// Trailing slashes are trimmed.
    #[must_use]
    pub fn new(base_uri: &str) -> Self {
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            headers: HashMap::new(),
            include: Vec::new(),
            full_response: false,
            entity_response: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `JSONAPI_BASE_URI` - Resource base URI (required)
    /// * `JSONAPI_TIMEOUT_SECS` - Request timeout (optional, default: 30)
    /// * `JSONAPI_INCLUDE` - Comma-separated relationships to include (optional)
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if a required variable is missing or a
    /// value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from `lookup`, which maps a variable name to its
    /// value.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_uri = lookup("JSONAPI_BASE_URI").ok_or_else(|| {
            Error::Configuration("JSONAPI_BASE_URI environment variable not set".to_string())
        })?;

        let timeout_secs = match lookup("JSONAPI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Configuration(format!("Invalid value for JSONAPI_TIMEOUT_SECS: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let include = lookup("JSONAPI_INCLUDE").unwrap_or_default();

        Ok(Self::new(&base_uri)
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_include(parse_list(&include)))
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the header set.
    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the relationships requested on GET calls.
    #[must_use]
    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    /// Return whole transport responses. Takes precedence over entity mode.
    #[must_use]
    pub fn with_full_response(mut self, enabled: bool) -> Self {
        self.full_response = enabled;
        self
    }

    /// Return flattened entities.
    #[must_use]
    pub fn with_entity_response(mut self, enabled: bool) -> Self {
        self.entity_response = enabled;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    #[must_use]
    pub fn full_response(&self) -> bool {
        self.full_response
    }

    #[must_use]
    pub fn entity_response(&self) -> bool {
        self.entity_response
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve the response mode from the two flags.
    #[must_use]
    pub fn response_mode(&self) -> ResponseMode {
        match (self.full_response, self.entity_response) {
            (true, _) => ResponseMode::Raw,
            (false, true) => ResponseMode::Entity,
            (false, false) => ResponseMode::Document,
        }
    }

    /// URI of one resource. The id is percent-encoded as a single path
    /// segment.
    #[must_use]
    pub fn resource_uri(&self, id: &str) -> String {
        join_segments(&self.base_uri, &[id])
    }
}

/// Append `segments` to `base_uri`, percent-encoding each one so `/`, `?`
/// and `#` inside an id stay part of that segment.
///
/// A base that does not parse as an absolute URL is joined verbatim.
pub(crate) fn join_segments(base_uri: &str, segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse(base_uri) else {
        let mut parts = vec![base_uri];
        parts.extend_from_slice(segments);
        return parts.join("/");
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.to_string()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RepositoryConfig::new("https://api.example.com/users");

        assert_eq!(config.base_uri(), "https://api.example.com/users");
        assert!(config.headers().is_empty());
        assert!(config.include().is_empty());
        assert!(!config.full_response());
        assert!(!config.entity_response());
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.response_mode(), ResponseMode::Document);
    }

    #[test]
    fn test_response_mode_precedence() {
        let base = RepositoryConfig::new("https://api.example.com/users");

        let entity = base.clone().with_entity_response(true);
        assert_eq!(entity.response_mode(), ResponseMode::Entity);

        let raw = base.clone().with_full_response(true);
        assert_eq!(raw.response_mode(), ResponseMode::Raw);

        let both = base.with_full_response(true).with_entity_response(true);
        assert_eq!(both.response_mode(), ResponseMode::Raw);
    }

    #[test]
    fn test_builders_leave_original_untouched() {
        let original = RepositoryConfig::new("https://api.example.com/users");
        let changed = original.clone().with_include(["team"]).with_header("X-Tenant", "a");

        assert!(original.include().is_empty());
        assert_eq!(changed.include(), ["team".to_string()]);
        assert_eq!(changed.headers().get("X-Tenant").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_resource_uri() {
        let config = RepositoryConfig::new("https://api.example.com/users///");
        assert_eq!(config.resource_uri("42"), "https://api.example.com/users/42");
    }

    #[test]
    fn test_resource_uri_encodes_id() {
        let config = RepositoryConfig::new("https://api.example.com/users");

        assert_eq!(config.resource_uri("a/b"), "https://api.example.com/users/a%2Fb");
        assert_eq!(config.resource_uri("x?y"), "https://api.example.com/users/x%3Fy");
        assert_eq!(config.resource_uri("a b#c"), "https://api.example.com/users/a%20b%23c");
    }

    #[test]
    fn test_join_segments() {
        assert_eq!(
            join_segments("https://api.example.com", &["7", "restore"]),
            "https://api.example.com/7/restore"
        );
        assert_eq!(join_segments("users", &["7"]), "users/7");
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("team, roles,,"), vec!["team", "roles"]);
        assert!(parse_list("").is_empty());
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_requires_base_uri() {
        let result = RepositoryConfig::from_lookup(lookup_from(&[("JSONAPI_INCLUDE", "team")]));
        assert!(matches!(result, Err(Error::Configuration(ref m)) if m.contains("JSONAPI_BASE_URI")));
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let result = RepositoryConfig::from_lookup(lookup_from(&[
            ("JSONAPI_BASE_URI", "https://api.example.com/users"),
            ("JSONAPI_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(Error::Configuration(ref m)) if m.contains("JSONAPI_TIMEOUT_SECS")));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[
            ("JSONAPI_BASE_URI", "https://api.example.com/users/"),
            ("JSONAPI_TIMEOUT_SECS", "5"),
            ("JSONAPI_INCLUDE", "team, roles,"),
        ]))
        .expect("config should build");

        assert_eq!(config.base_uri(), "https://api.example.com/users");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.include(), ["team".to_string(), "roles".to_string()]);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[(
            "JSONAPI_BASE_URI",
            "https://api.example.com/users",
        )]))
        .expect("config should build");

        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.include().is_empty());
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        // The only test in this crate that touches these variables.
        env::set_var("JSONAPI_BASE_URI", "https://env.example.com/posts");
        env::set_var("JSONAPI_INCLUDE", "author");
        env::remove_var("JSONAPI_TIMEOUT_SECS");

        let config = RepositoryConfig::from_env().expect("config should build");

        env::remove_var("JSONAPI_BASE_URI");
        env::remove_var("JSONAPI_INCLUDE");

        assert_eq!(config.base_uri(), "https://env.example.com/posts");
        assert_eq!(config.include(), ["author".to_string()]);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}

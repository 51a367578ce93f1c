//! JSON:API repository.
//!
//! A [`Repository`] binds one resource collection (its base URI) to a
//! transport and exposes the CRUD verbs. Each verb becomes one
//! [`Operation`], one HTTP exchange, and one [`Resolved`] result.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::{join_segments, RepositoryConfig};
use crate::deserializer::{DocumentDeserializer, JsonApiDeserializer};
use crate::error::Error;
use crate::query::{Criteria, OrderBy, QueryParams};
use crate::resolve::{resolve, Resolved};
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// A resource identifier, or several of them.
///
/// One identifier becomes a percent-encoded path segment; several are looked
/// up as an `id` filter rather than a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::One(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self::One(id)
    }
}

impl From<u64> for Identifier {
    fn from(id: u64) -> Self {
        Self::One(id.to_string())
    }
}

impl From<Vec<String>> for Identifier {
    fn from(ids: Vec<String>) -> Self {
        Self::Many(ids)
    }
}

impl From<Vec<&str>> for Identifier {
    fn from(ids: Vec<&str>) -> Self {
        Self::Many(ids.into_iter().map(str::to_string).collect())
    }
}

/// One request a repository can issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `GET {base}/{id}`
    Find(String),
    /// `GET {base}?query`
    FindBy(QueryParams),
    /// `POST {base}`
    Create(Value),
    /// `PUT {base}/{id}`
    Update(String, Value),
    /// `PATCH {base}/{id}`
    Patch(String, Value),
    /// `DELETE {base}/{id}`
    Delete(String),
    /// `PUT {base}/{id}/restore`
    Restore(String),
}

impl Operation {
    /// HTTP method of the operation.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Find(_) | Self::FindBy(_) => "GET",
            Self::Create(_) => "POST",
            Self::Update(..) | Self::Restore(_) => "PUT",
            Self::Patch(..) => "PATCH",
            Self::Delete(_) => "DELETE",
        }
    }

    /// Target URI under `base_uri`. Ids are percent-encoded as one path
    /// segment.
    #[must_use]
    pub fn uri(&self, base_uri: &str) -> String {
        match self {
            Self::FindBy(_) | Self::Create(_) => base_uri.to_string(),
            Self::Find(id) | Self::Update(id, _) | Self::Patch(id, _) | Self::Delete(id) => {
                join_segments(base_uri, &[id.as_str()])
            }
            Self::Restore(id) => join_segments(base_uri, &[id.as_str(), "restore"]),
        }
    }
}

/// Repository over one JSON:API resource collection.
///
/// Repositories are immutable. The `with_*`/`as_*` methods consume the
/// repository and return a reconfigured one sharing the same transport, so a
/// repository can be cloned and handed to concurrent tasks freely.
///
/// # Example
///
/// ```rust,ignore
/// use jsonapi_repository::{Criteria, OrderBy, Repository, RepositoryConfig};
///
/// let users = Repository::new(RepositoryConfig::new("https://api.example.com/users"))?
///     .with_include(["team"])
///     .as_entity();
///
/// let admins = users
///     .find_by(
///         &Criteria::new().with("role", ["admin", "owner"]),
///         Some(&OrderBy::new().then("created_at", "desc")),
///         Some(10),
///         Some(0),
///     )
///     .await?;
/// ```
#[derive(Clone)]
pub struct Repository {
    config: RepositoryConfig,
    transport: Arc<dyn Transport>,
    deserializer: Arc<dyn DocumentDeserializer>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Create a repository with an HTTP transport built from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the transport cannot be created.
    pub fn new(config: RepositoryConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(config.headers(), config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a repository over an existing transport.
    #[must_use]
    pub fn with_transport(config: RepositoryConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            deserializer: Arc::new(JsonApiDeserializer),
        }
    }

    /// Request these relationships on every GET.
    #[must_use]
    pub fn with_include<I, S>(self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reconfigure(|c| c.with_include(include))
    }

    /// Return flattened entities.
    #[must_use]
    pub fn as_entity(self) -> Self {
        self.reconfigure(|c| c.with_entity_response(true))
    }

    /// Return whole transport responses.
    #[must_use]
    pub fn with_full_response(self) -> Self {
        self.reconfigure(|c| c.with_full_response(true))
    }

    /// Use another deserializer for entity mode.
    #[must_use]
    pub fn with_deserializer(mut self, deserializer: Arc<dyn DocumentDeserializer>) -> Self {
        self.deserializer = deserializer;
        self
    }

    fn reconfigure(mut self, f: impl FnOnce(RepositoryConfig) -> RepositoryConfig) -> Self {
        self.config = f(self.config);
        self
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Find a resource by identifier.
    ///
    /// Several identifiers are fetched with `find_by({id: ids})`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response is raised.
    pub async fn find(&self, id: impl Into<Identifier>) -> Result<Resolved, Error> {
        match id.into() {
            Identifier::One(id) => self.execute(Operation::Find(id)).await,
            Identifier::Many(ids) => {
                self.find_by(&Criteria::new().with("id", ids), None, None, None)
                    .await
            }
        }
    }

    /// Find resources matching `criteria`.
    ///
    /// # Arguments
    ///
    /// * `criteria` - Filters; list values are sent comma-joined
    /// * `order_by` - Sort fields in priority order
    /// * `limit` - `page[limit]`
    /// * `offset` - `page[offset]`
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response is raised.
    pub async fn find_by(
        &self,
        criteria: &Criteria,
        order_by: Option<&OrderBy>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Resolved, Error> {
        let params = QueryParams::build(criteria, order_by, limit, offset);
        self.execute(Operation::FindBy(params)).await
    }

    /// Find the first resource matching `criteria`.
    ///
    /// Requests a page of one. Returns `None` when the collection is empty
    /// or the document's data is `null`. Raw results and validation payloads
    /// come back unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response is raised.
    pub async fn find_one_by(
        &self,
        criteria: &Criteria,
        order_by: Option<&OrderBy>,
    ) -> Result<Option<Resolved>, Error> {
        let resolved = self.find_by(criteria, order_by, Some(1), None).await?;
        Ok(first_of(resolved))
    }

    /// Fetch the collection without filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response is raised.
    pub async fn find_all(&self) -> Result<Resolved, Error> {
        self.find_by(&Criteria::new(), None, None, None).await
    }

    /// Create a resource. `params` is sent as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` cannot be serialized, the exchange fails,
    /// or the response is raised.
    pub async fn create<T: Serialize + ?Sized>(&self, params: &T) -> Result<Resolved, Error> {
        let body = serde_json::to_value(params)?;
        self.execute(Operation::Create(body)).await
    }

    /// Replace a resource with `PUT`.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` cannot be serialized, the exchange fails,
    /// or the response is raised.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        id: &str,
        params: &T,
    ) -> Result<Resolved, Error> {
        let body = serde_json::to_value(params)?;
        self.execute(Operation::Update(id.to_string(), body)).await
    }

    /// Partially update a resource with `PATCH`.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` cannot be serialized, the exchange fails,
    /// or the response is raised.
    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        id: &str,
        params: &T,
    ) -> Result<Resolved, Error> {
        let body = serde_json::to_value(params)?;
        self.execute(Operation::Patch(id.to_string(), body)).await
    }

    /// Delete a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response is raised.
    pub async fn delete(&self, id: &str) -> Result<Resolved, Error> {
        self.execute(Operation::Delete(id.to_string())).await
    }

    /// Restore a soft-deleted resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response is raised.
    pub async fn restore(&self, id: &str) -> Result<Resolved, Error> {
        self.execute(Operation::Restore(id.to_string())).await
    }

    /// Issue an operation and resolve its response.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response is raised.
    pub async fn execute(&self, operation: Operation) -> Result<Resolved, Error> {
        let response = self.dispatch(&operation).await?;
        resolve(self.config.response_mode(), response, self.deserializer.as_ref())
    }

    /// Issue an operation and return the unclassified response.
    ///
    /// The configured include list is added to GET requests only.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the exchange cannot complete.
    pub async fn dispatch(&self, operation: &Operation) -> Result<TransportResponse, Error> {
        let uri = operation.uri(self.config.base_uri());

        match operation {
            Operation::Find(_) => {
                let query = QueryParams::default().with_include(self.config.include());
                self.get(&uri, &query).await
            }
            Operation::FindBy(params) => {
                let query = params.clone().with_include(self.config.include());
                self.get(&uri, &query).await
            }
            Operation::Create(body) => {
                tracing::debug!(method = "POST", %uri, "dispatching request");
                self.transport.post(&uri, body).await
            }
            Operation::Update(_, body) => {
                tracing::debug!(method = "PUT", %uri, "dispatching request");
                self.transport.put(&uri, Some(body)).await
            }
            Operation::Patch(_, body) => {
                tracing::debug!(method = "PATCH", %uri, "dispatching request");
                self.transport.patch(&uri, body).await
            }
            Operation::Delete(_) => {
                tracing::debug!(method = "DELETE", %uri, "dispatching request");
                self.transport.delete(&uri).await
            }
            Operation::Restore(_) => {
                tracing::debug!(method = "PUT", %uri, "dispatching request");
                self.transport.put(&uri, None).await
            }
        }
    }

    async fn get(&self, uri: &str, query: &QueryParams) -> Result<TransportResponse, Error> {
        let pairs = query.to_pairs();
        tracing::debug!(method = "GET", %uri, query = %query.to_query_string(), "dispatching request");
        self.transport.get(uri, &pairs).await
    }
}

/// Pick the first item out of a page-of-one result.
fn first_of(resolved: Resolved) -> Option<Resolved> {
    match resolved {
        Resolved::Raw(_) | Resolved::Entity(_) => Some(resolved),
        Resolved::Entities(entities) => entities.into_iter().next().map(Resolved::Entity),
        Resolved::Document(body) => {
            if body.get("errors").is_none() {
                match body.get("data") {
                    Some(Value::Array(items)) => {
                        return items.first().cloned().map(Resolved::Document)
                    }
                    Some(Value::Null) => return None,
                    Some(data) if data.is_object() => {
                        return Some(Resolved::Document(data.clone()))
                    }
                    _ => {}
                }
            }
            Some(Resolved::Document(body))
        }
    }
}

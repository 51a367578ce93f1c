//! JSON:API repository client for Rust
//!
//! A generic repository over a JSON:API resource collection. Calls are shaped
//! into JSON:API queries and bodies; responses are classified, then handed
//! back as the raw transport response, the JSON:API document, or flattened
//! entities.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use jsonapi_repository::testing::{MockResponse, MockTransport};
//! use jsonapi_repository::{Repository, RepositoryConfig};
//! use serde_json::json;
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let transport = MockTransport::new();
//! transport.enqueue(MockResponse::with_data(201, json!({
//!     "data": {"id": "1", "type": "users", "attributes": {"name": "Bob"}}
//! })));
//!
//! let users = Repository::with_transport(
//!     RepositoryConfig::new("https://api.example.com/users"),
//!     Arc::new(transport),
//! )
//! .as_entity();
//!
//! let bob = users.create(&json!({"name": "Bob"})).await.unwrap();
//! assert_eq!(
//!     bob.into_entity().unwrap().into_value(),
//!     json!({"id": "1", "name": "Bob"})
//! );
//! # });
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod deserializer;
pub mod error;
pub mod flatten;
pub mod query;
pub mod repository;
pub mod resolve;
pub mod testing;
pub mod transport;
pub mod types;

// Re-exports
pub use classify::{classify, Classification};
pub use config::{RepositoryConfig, ResponseMode};
pub use deserializer::{Deserialized, DocumentDeserializer, IncludedDeserializer, JsonApiDeserializer};
pub use error::{ApiError, Error};
pub use flatten::{flatten, flatten_all};
pub use query::{Criteria, FilterValue, OrderBy, Page, QueryParams};
pub use repository::{Identifier, Operation, Repository};
pub use resolve::{resolve, Resolved};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{Document, Entity, ErrorObject, PrimaryData, ResourceObject};

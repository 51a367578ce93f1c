//! Data model types for the JSON:API repository client.

pub mod document;
pub mod entity;

// Re-exports
pub use document::{Document, ErrorObject, PrimaryData, ResourceObject};
pub use entity::Entity;

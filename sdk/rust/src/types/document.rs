//! JSON:API top-level document and resource object models.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// A JSON:API top-level document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Primary data; `None` when absent or `null`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    /// Error objects, present on validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorObject>>,
    /// Non-standard meta information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
    /// Links related to the primary data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
    /// Related resources requested with `include`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<ResourceObject>>,
}

impl Document {
    /// Parse a document from a response body.
    ///
    /// # Errors
    ///
    /// Returns `Error::Deserialization` if the body is not a JSON:API document.
    pub fn from_value(body: &Value) -> Result<Self, Error> {
        Self::deserialize(body).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Primary data of a document: one resource or a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// A collection of resources (possibly empty)
    Collection(Vec<ResourceObject>),
    /// A single resource
    Single(Box<ResourceObject>),
}

/// One entity as represented on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    /// Resource identifier. Numeric ids are accepted and kept as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Resource type
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource attributes
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Relationship linkage keyed by relationship name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Map<String, Value>>,
    /// Resource links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
    /// Resource meta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ResourceObject {
    /// Create a resource with attributes and no relationships.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            attributes,
            relationships: None,
            links: None,
            meta: None,
        }
    }
}

/// A JSON:API error object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// HTTP status as a string, e.g. `"422"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Pointer or parameter that caused the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "resource id must be a string or number, got {other}"
        ))),
    }
}

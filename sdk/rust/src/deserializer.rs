//! Document deserializers.
//!
//! A [`DocumentDeserializer`] turns a JSON:API document body into resource
//! objects for entity mode. Repositories use [`JsonApiDeserializer`] unless
//! another one is plugged in with
//! [`Repository::with_deserializer`](crate::Repository::with_deserializer).

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::flatten::flatten;
use crate::types::{Document, PrimaryData, ResourceObject};

/// Resources extracted from a document's primary data.
#[derive(Debug, Clone, PartialEq)]
pub enum Deserialized {
    /// The document held a single resource
    One(ResourceObject),
    /// The document held a collection
    Many(Vec<ResourceObject>),
}

/// Turns a JSON:API document into resource objects.
pub trait DocumentDeserializer: Send + Sync {
    /// Deserialize the primary data of `document`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Deserialization` if the document has no primary data or
    /// is malformed.
    fn deserialize(&self, document: &Value) -> Result<Deserialized, Error>;
}

/// Standard JSON:API resource parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonApiDeserializer;

impl DocumentDeserializer for JsonApiDeserializer {
    fn deserialize(&self, document: &Value) -> Result<Deserialized, Error> {
        let document = Document::from_value(document)?;
        primary(document.data)
    }
}

/// Parser that inlines `included` resources into relationship linkage.
///
/// Every `{"type", "id"}` identifier under a relationship's `data` that
/// matches an included resource is replaced by that resource, flattened.
/// Unmatched identifiers stay as they are. Inlining is one level deep.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludedDeserializer;

impl DocumentDeserializer for IncludedDeserializer {
    fn deserialize(&self, document: &Value) -> Result<Deserialized, Error> {
        let document = Document::from_value(document)?;
        let included = document.included.unwrap_or_default();
        let index: HashMap<(&str, &str), &ResourceObject> = included
            .iter()
            .map(|r| ((r.kind.as_str(), r.id.as_str()), r))
            .collect();

        let inline = |mut resource: ResourceObject| {
            if let Some(relationships) = resource.relationships.as_mut() {
                inline_relationships(relationships, &index);
            }
            resource
        };

        Ok(match primary(document.data)? {
            Deserialized::One(resource) => Deserialized::One(inline(resource)),
            Deserialized::Many(resources) => {
                Deserialized::Many(resources.into_iter().map(inline).collect())
            }
        })
    }
}

fn primary(data: Option<PrimaryData>) -> Result<Deserialized, Error> {
    match data {
        Some(PrimaryData::Single(resource)) => Ok(Deserialized::One(*resource)),
        Some(PrimaryData::Collection(resources)) => Ok(Deserialized::Many(resources)),
        None => Err(Error::Deserialization(
            "document has no primary data".to_string(),
        )),
    }
}

fn inline_relationships(
    relationships: &mut Map<String, Value>,
    index: &HashMap<(&str, &str), &ResourceObject>,
) {
    for relationship in relationships.values_mut() {
        let Some(data) = relationship.get_mut("data") else {
            continue;
        };
        if let Value::Array(items) = data {
            for item in items.iter_mut() {
                inline_identifier(item, index);
            }
        } else if data.is_object() {
            inline_identifier(data, index);
        }
    }
}

fn inline_identifier(identifier: &mut Value, index: &HashMap<(&str, &str), &ResourceObject>) {
    let key = match (
        identifier.get("type").and_then(Value::as_str),
        identifier.get("id").and_then(Value::as_str),
    ) {
        (Some(kind), Some(id)) => (kind, id),
        _ => return,
    };

    let replacement = index.get(&key).map(|resource| flatten(resource).into_value());
    if let Some(value) = replacement {
        *identifier = value;
    }
}

//! Response resolution.
//!
//! Every repository call ends here. The response is classified first; if it
//! passes, the configured [`ResponseMode`] picks the shape handed back:
//!
//! | Mode | Result |
//! |---|---|
//! | `Raw` | [`Resolved::Raw`], the transport response unchanged |
//! | `Document` | [`Resolved::Document`], the body unchanged |
//! | `Entity` | [`Resolved::Entity`] or [`Resolved::Entities`]; the body unchanged as [`Resolved::Document`] when it has no primary data |

use serde_json::{Map, Value};

use crate::classify::{classify, Classification};
use crate::config::ResponseMode;
use crate::deserializer::{Deserialized, DocumentDeserializer};
use crate::error::Error;
use crate::flatten::{flatten, flatten_all};
use crate::transport::TransportResponse;
use crate::types::{Entity, ErrorObject};

/// The result of one repository call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Status and body as received
    Raw(TransportResponse),
    /// A JSON:API document, or one element of it for `find_one_by`
    Document(Value),
    /// One flattened resource
    Entity(Entity),
    /// A flattened collection, in document order
    Entities(Vec<Entity>),
}

impl Resolved {
    /// Get the transport response, if this is a raw result.
    #[must_use]
    pub fn into_raw(self) -> Option<TransportResponse> {
        match self {
            Self::Raw(response) => Some(response),
            _ => None,
        }
    }

    /// Get the document body, if this is a document result.
    #[must_use]
    pub fn into_document(self) -> Option<Value> {
        match self {
            Self::Document(body) => Some(body),
            _ => None,
        }
    }

    /// Get the entity, if this is a single-entity result.
    #[must_use]
    pub fn into_entity(self) -> Option<Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Get the entities, if this is a collection result.
    #[must_use]
    pub fn into_entities(self) -> Option<Vec<Entity>> {
        match self {
            Self::Entities(entities) => Some(entities),
            _ => None,
        }
    }

    fn body(&self) -> Option<&Value> {
        match self {
            Self::Raw(response) => Some(&response.body),
            Self::Document(body) => Some(body),
            Self::Entity(_) | Self::Entities(_) => None,
        }
    }

    /// Get the JSON:API validation errors the body carries, if any.
    #[must_use]
    pub fn errors(&self) -> Option<Vec<ErrorObject>> {
        let errors = self.body()?.get("errors")?;
        serde_json::from_value(errors.clone()).ok()
    }

    /// Check if the body is a JSON:API error document.
    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        self.body().is_some_and(|b| b.get("errors").is_some())
    }

    /// Get the document's top-level `meta`, if present.
    #[must_use]
    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.body()?.get("meta")?.as_object()
    }
}

/// Classify `response` and resolve it into the shape `mode` asks for.
///
/// # Errors
///
/// Returns `Error::Api` if classification raises, or
/// `Error::Deserialization` if entity mode cannot read the document.
pub fn resolve(
    mode: ResponseMode,
    response: TransportResponse,
    deserializer: &dyn DocumentDeserializer,
) -> Result<Resolved, Error> {
    if let Classification::Raise(error) = classify(&response) {
        return Err(error.into());
    }

    match mode {
        ResponseMode::Raw => Ok(Resolved::Raw(response)),
        ResponseMode::Document => Ok(Resolved::Document(response.body)),
        ResponseMode::Entity => {
            if !has_primary_data(&response.body) {
                return Ok(Resolved::Document(response.body));
            }
            Ok(match deserializer.deserialize(&response.body)? {
                Deserialized::One(resource) => Resolved::Entity(flatten(&resource)),
                Deserialized::Many(resources) => Resolved::Entities(flatten_all(&resources)),
            })
        }
    }
}

fn has_primary_data(body: &Value) -> bool {
    body.get("data").is_some_and(|data| !data.is_null())
}

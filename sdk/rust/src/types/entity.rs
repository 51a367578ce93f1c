//! Flattened entity view of a resource object.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// A resource collapsed into one flat map: `id`, every attribute at the top
/// level, and `relationships` when the resource has any.
///
/// Built by [`crate::flatten::flatten`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    pub(crate) fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Get the resource id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Get a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Get the nested relationships, if the resource had any.
    #[must_use]
    pub fn relationships(&self) -> Option<&Map<String, Value>> {
        self.0.get("relationships").and_then(Value::as_object)
    }

    /// Borrow the underlying map.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Deserialize the entity into an application type.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if the fields do not match `T`.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(Error::from)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        entity.into_value()
    }
}

//! Entity flattening.
//!
//! Collapses a resource object into an [`Entity`]: the resource `id`, every
//! attribute at the top level, and a nested `relationships` object when the
//! resource has a non-empty one.
//!
//! Name collisions resolve deterministically:
//!
//! - the resource `id` always wins over an attribute called `id`;
//! - a non-empty relationships object wins over an attribute called
//!   `relationships`. An empty or absent one leaves such an attribute alone.

use serde_json::{Map, Value};

use crate::types::{Entity, ResourceObject};

const ID_KEY: &str = "id";
const RELATIONSHIPS_KEY: &str = "relationships";

/// Flatten one resource object.
#[must_use]
pub fn flatten(resource: &ResourceObject) -> Entity {
    let mut fields = Map::new();
    fields.insert(ID_KEY.to_string(), Value::String(resource.id.clone()));

    for (name, value) in &resource.attributes {
        if name != ID_KEY {
            fields.insert(name.clone(), value.clone());
        }
    }

    if let Some(relationships) = resource.relationships.as_ref().filter(|r| !r.is_empty()) {
        fields.insert(
            RELATIONSHIPS_KEY.to_string(),
            Value::Object(relationships.clone()),
        );
    }

    Entity::from_map(fields)
}

/// Flatten each resource of a collection, keeping order.
#[must_use]
pub fn flatten_all(resources: &[ResourceObject]) -> Vec<Entity> {
    resources.iter().map(flatten).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(value: Value) -> ResourceObject {
        serde_json::from_value(value).expect("Should deserialize")
    }

    #[test]
    fn test_flatten_attributes() {
        let entity = flatten(&resource(json!({
            "id": "1",
            "type": "users",
            "attributes": {"name": "Bob", "age": 42}
        })));

        assert_eq!(
            entity.into_value(),
            json!({"id": "1", "name": "Bob", "age": 42})
        );
    }

    #[test]
    fn test_flatten_nests_relationships() {
        let entity = flatten(&resource(json!({
            "id": "1",
            "type": "users",
            "attributes": {"name": "Bob"},
            "relationships": {
                "team": {"data": {"type": "teams", "id": "7"}}
            }
        })));

        assert_eq!(
            entity.relationships().and_then(|r| r.get("team")),
            Some(&json!({"data": {"type": "teams", "id": "7"}}))
        );
    }

    #[test]
    fn test_flatten_skips_empty_relationships() {
        let entity = flatten(&resource(json!({
            "id": "1",
            "type": "users",
            "relationships": {}
        })));

        assert_eq!(entity.into_value(), json!({"id": "1"}));
    }

    #[test]
    fn test_resource_id_wins_over_id_attribute() {
        let entity = flatten(&resource(json!({
            "id": "1",
            "type": "users",
            "attributes": {"id": "shadow", "name": "Bob"}
        })));

        assert_eq!(entity.id(), Some("1"));
    }

    #[test]
    fn test_relationships_win_over_relationships_attribute() {
        let entity = flatten(&resource(json!({
            "id": "1",
            "type": "users",
            "attributes": {"relationships": "attr"},
            "relationships": {"team": {"data": null}}
        })));
        assert_eq!(entity.get("relationships"), Some(&json!({"team": {"data": null}})));

        let entity = flatten(&resource(json!({
            "id": "1",
            "type": "users",
            "attributes": {"relationships": "attr"}
        })));
        assert_eq!(entity.get("relationships"), Some(&json!("attr")));
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let resource = resource(json!({
            "id": "9",
            "type": "posts",
            "attributes": {"title": "Hello"},
            "relationships": {"author": {"data": {"type": "users", "id": "1"}}}
        }));

        assert_eq!(flatten(&resource), flatten(&resource));
    }

    #[test]
    fn test_flatten_all_keeps_order() {
        let resources = vec![
            resource(json!({"id": "2", "type": "users"})),
            resource(json!({"id": "1", "type": "users"})),
        ];

        let ids: Vec<_> = flatten_all(&resources)
            .iter()
            .map(|e| e.id().map(str::to_string))
            .collect();
        assert_eq!(ids, vec![Some("2".to_string()), Some("1".to_string())]);
    }
}

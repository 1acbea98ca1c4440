//! Resource identities and resource data supplied by the host

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference to a resource instance
///
/// Serializes as a JSON:API resource identifier object: `{"type": .., "id": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    /// The resource type (e.g., "posts", "tags")
    #[serde(rename = "type")]
    pub resource_type: String,

    /// The resource id, always a string on the wire
    pub id: String,
}

impl ResourceIdentity {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// A resource as returned by a [`ResourceRepository`](crate::core::ResourceRepository)
///
/// Carries the identity and every attribute the host knows about; the
/// schema decides which attributes are emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceData {
    pub identity: ResourceIdentity,
    pub attributes: Map<String, Value>,
}

impl ResourceData {
    pub fn new(identity: ResourceIdentity, attributes: Map<String, Value>) -> Self {
        Self {
            identity,
            attributes,
        }
    }

    /// Build resource data from a JSON object
    ///
    /// Non-object values produce an empty attribute map.
    pub fn from_json(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        attributes: Value,
    ) -> Self {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(ResourceIdentity::new(resource_type, id), attributes)
    }

    pub fn resource_type(&self) -> &str {
        &self.identity.resource_type
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_serializes_as_identifier_object() {
        let identity = ResourceIdentity::new("tags", "7");
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value, json!({ "type": "tags", "id": "7" }));
    }

    #[test]
    fn test_from_json_ignores_non_objects() {
        let data = ResourceData::from_json("posts", "1", json!("not an object"));
        assert!(data.attributes.is_empty());
        assert_eq!(data.resource_type(), "posts");
        assert_eq!(data.id(), "1");
    }
}

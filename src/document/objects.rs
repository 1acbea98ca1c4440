//! JSON:API document building blocks

use crate::core::ResourceIdentity;
use crate::links::{LinkSet, RELATED_LINK, SELF_LINK};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Resource linkage of a relationship object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelationshipData {
    /// `null` or a single identifier
    ToOne(Option<ResourceIdentity>),
    /// An array of identifiers, possibly empty
    ToMany(Vec<ResourceIdentity>),
}

/// Relationship object emitted under a resource's `relationships`
///
/// `serialize_using` transforms receive the default object and may strip
/// links with the `without_*` methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationshipObject {
    #[serde(skip_serializing_if = "LinkSet::is_empty")]
    pub links: LinkSet,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationshipData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl RelationshipObject {
    pub fn new(links: LinkSet) -> Self {
        Self {
            links,
            data: None,
            meta: None,
        }
    }

    /// Drop both links
    pub fn without_links(mut self) -> Self {
        self.links.clear();
        self
    }

    /// Drop the `self` link
    pub fn without_self_link(mut self) -> Self {
        self.links.remove(SELF_LINK);
        self
    }

    /// Drop the `related` link
    pub fn without_related_link(mut self) -> Self {
        self.links.remove(RELATED_LINK);
        self
    }

    pub fn with_data(mut self, data: RelationshipData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// A full resource object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    #[serde(flatten)]
    pub identity: ResourceIdentity,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub relationships: IndexMap<String, RelationshipObject>,

    #[serde(skip_serializing_if = "LinkSet::is_empty")]
    pub links: LinkSet,
}

impl ResourceObject {
    pub fn resource_type(&self) -> &str {
        &self.identity.resource_type
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }
}

/// Primary data of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// Single resource, `null` when absent (empty to-one)
    Resource(Option<Box<ResourceObject>>),
    /// Resource collection
    Resources(Vec<ResourceObject>),
    /// Single identifier, `null` when absent
    Identifier(Option<ResourceIdentity>),
    /// Identifier collection
    Identifiers(Vec<ResourceIdentity>),
}

impl PrimaryData {
    /// Identities of the primary data, in order
    pub fn identities(&self) -> Vec<&ResourceIdentity> {
        match self {
            PrimaryData::Resource(one) => one.iter().map(|r| &r.identity).collect(),
            PrimaryData::Resources(many) => many.iter().map(|r| &r.identity).collect(),
            PrimaryData::Identifier(one) => one.iter().collect(),
            PrimaryData::Identifiers(many) => many.iter().collect(),
        }
    }
}

/// The `jsonapi` member of every document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonApiObject {
    pub version: &'static str,
}

impl Default for JsonApiObject {
    fn default() -> Self {
        Self { version: "1.0" }
    }
}

/// Top-level JSON:API document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub jsonapi: JsonApiObject,

    pub data: PrimaryData,

    #[serde(skip_serializing_if = "LinkSet::is_empty")]
    pub links: LinkSet,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
}

impl Document {
    pub fn new(data: PrimaryData) -> Self {
        Self {
            jsonapi: JsonApiObject::default(),
            data,
            links: LinkSet::new(),
            included: Vec::new(),
        }
    }

    pub fn with_links(mut self, links: LinkSet) -> Self {
        self.links = links;
        self
    }

    pub fn with_included(mut self, included: Vec<ResourceObject>) -> Self {
        self.included = included;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn links() -> LinkSet {
        [
            (SELF_LINK, "http://localhost/api/v1/posts/1/relationships/tags"),
            (RELATED_LINK, "http://localhost/api/v1/posts/1/tags"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_without_self_link() {
        let object = RelationshipObject::new(links()).without_self_link();
        assert_eq!(object.links.self_link(), None);
        assert!(object.links.related_link().is_some());
    }

    #[test]
    fn test_without_links_twice_is_idempotent() {
        let object = RelationshipObject::new(links())
            .without_links()
            .without_self_link()
            .without_related_link();
        assert!(object.links.is_empty());
        assert_eq!(serde_json::to_value(&object).unwrap(), json!({}));
    }

    #[test]
    fn test_to_one_null_data_is_emitted() {
        let object = RelationshipObject::new(LinkSet::new()).with_data(RelationshipData::ToOne(None));
        assert_eq!(serde_json::to_value(&object).unwrap(), json!({ "data": null }));
    }

    #[test]
    fn test_resource_object_shape() {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), json!("rust"));
        let object = ResourceObject {
            identity: ResourceIdentity::new("tags", "3"),
            attributes,
            relationships: IndexMap::new(),
            links: [(SELF_LINK, "http://localhost/api/v1/tags/3")]
                .into_iter()
                .collect(),
        };

        assert_eq!(
            serde_json::to_value(&object).unwrap(),
            json!({
                "type": "tags",
                "id": "3",
                "attributes": { "name": "rust" },
                "links": { "self": "http://localhost/api/v1/tags/3" }
            })
        );
    }

    #[test]
    fn test_document_omits_empty_members() {
        let document = Document::new(PrimaryData::Identifiers(vec![]));
        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({ "jsonapi": { "version": "1.0" }, "data": [] })
        );
    }
}

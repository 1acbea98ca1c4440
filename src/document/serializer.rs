//! Document serializer
//!
//! Turns [`ResourceData`] loaded by the host into JSON:API documents, using
//! the schema registry of one server and its [`LinkBuilder`].
//!
//! Relationship objects are assembled in a fixed order:
//!
//! 1. links from the [`LinkBuilder`] (suppression flags applied)
//! 2. resource linkage, when the relationship was loaded
//! 3. the descriptor's `serialize_using` transform
//!
//! Hidden relationships are skipped entirely.

use crate::core::{
    JsonApiError, JsonApiResult, RelationshipError, ResourceData, ResourceIdentity,
};
use crate::document::objects::{
    Document, PrimaryData, RelationshipData, RelationshipObject, ResourceObject,
};
use crate::links::{LinkBuilder, LinkSet, SELF_LINK};
use crate::schema::{RelationshipDescriptor, Schema, SchemaRegistry, Server};
use indexmap::{IndexMap, IndexSet};
use serde_json::Map;
use std::collections::HashMap;
use std::sync::Arc;

/// Relationship members loaded alongside primary data
///
/// Keyed by the source resource, then by relationship name. Relationships
/// present here get resource linkage (`data`) in their relationship object
/// and their members are emitted under `included`.
#[derive(Debug, Clone, Default)]
pub struct LoadedRelations {
    relations: HashMap<ResourceIdentity, IndexMap<String, Vec<ResourceData>>>,
}

impl LoadedRelations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        source: ResourceIdentity,
        relationship: impl Into<String>,
        related: Vec<ResourceData>,
    ) {
        self.relations
            .entry(source)
            .or_default()
            .insert(relationship.into(), related);
    }

    pub fn get(&self, source: &ResourceIdentity, relationship: &str) -> Option<&[ResourceData]> {
        self.relations
            .get(source)
            .and_then(|by_name| by_name.get(relationship))
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// Parse an `include` query parameter against a schema
///
/// Only direct, visible relationships may be included.
pub fn parse_include(schema: &Schema, include: Option<&str>) -> JsonApiResult<Vec<String>> {
    let Some(include) = include else {
        return Ok(vec![]);
    };

    let mut paths = IndexSet::new();
    for path in include.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let allowed = !path.contains('.')
            && schema
                .relationship(path)
                .map(|relation| !relation.is_hidden())
                .unwrap_or(false);
        if !allowed {
            return Err(RelationshipError::InvalidInclude {
                path: path.to_string(),
            }
            .into());
        }
        paths.insert(path.to_string());
    }

    Ok(paths.into_iter().collect())
}

/// Serializer bound to one server's schemas and links
#[derive(Debug, Clone)]
pub struct DocumentSerializer {
    links: LinkBuilder,
    schemas: Arc<SchemaRegistry>,
}

impl DocumentSerializer {
    pub fn new(links: LinkBuilder, schemas: Arc<SchemaRegistry>) -> Self {
        Self { links, schemas }
    }

    /// Serializer over the server's current schema snapshot
    pub fn for_server(server: &Server) -> Self {
        Self::new(server.link_builder(), server.schemas())
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn link_builder(&self) -> &LinkBuilder {
        &self.links
    }

    /// Build the relationship object of `relation` on `source`
    ///
    /// Fails with `RelationshipNotVisible` for hidden relationships.
    pub fn relationship_object(
        &self,
        source: &ResourceIdentity,
        relation: &RelationshipDescriptor,
        data: Option<RelationshipData>,
    ) -> JsonApiResult<RelationshipObject> {
        let links = self.links.relationship_links(source, relation)?;
        let mut object = RelationshipObject::new(links);
        object.data = data;
        Ok(relation.transform(object))
    }

    /// Top-level links of a relationship endpoint
    ///
    /// The relationship's own links after flags and transform; empty for
    /// hidden relationships.
    pub fn relationship_links(
        &self,
        source: &ResourceIdentity,
        relation: &RelationshipDescriptor,
    ) -> JsonApiResult<LinkSet> {
        match self.relationship_object(source, relation, None) {
            Ok(object) => Ok(object.links),
            Err(JsonApiError::Relationship(RelationshipError::NotVisible { .. })) => {
                Ok(LinkSet::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Build a full resource object
    pub fn resource_object(
        &self,
        resource: &ResourceData,
        loaded: Option<&LoadedRelations>,
    ) -> JsonApiResult<ResourceObject> {
        let schema = self.schemas.schema_for(resource.resource_type())?;
        let identity = &resource.identity;

        let mut relationships = IndexMap::new();
        for relation in schema.relationships() {
            let data = loaded
                .and_then(|l| l.get(identity, relation.name()))
                .map(|related| linkage(relation, related));

            match self.relationship_object(identity, relation, data) {
                Ok(object) => {
                    relationships.insert(relation.name().to_string(), object);
                }
                Err(JsonApiError::Relationship(RelationshipError::NotVisible { .. })) => {
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(ResourceObject {
            identity: identity.clone(),
            attributes: filter_attributes(&schema, resource),
            relationships,
            links: self.links.resource_links(identity),
        })
    }

    /// Document with a single resource as primary data
    pub fn resource_document(
        &self,
        resource: &ResourceData,
        loaded: &LoadedRelations,
    ) -> JsonApiResult<Document> {
        let object = self.resource_object(resource, Some(loaded))?;
        let included = self.included(std::slice::from_ref(resource), loaded)?;

        let mut links = LinkSet::new();
        links.insert(SELF_LINK, self.links.resource(&resource.identity));

        Ok(Document::new(PrimaryData::Resource(Some(Box::new(object))))
            .with_links(links)
            .with_included(included))
    }

    /// Document with a resource collection as primary data
    pub fn collection_document(
        &self,
        resource_type: &str,
        resources: &[ResourceData],
        loaded: &LoadedRelations,
    ) -> JsonApiResult<Document> {
        self.schemas.schema_for(resource_type)?;

        let objects = resources
            .iter()
            .map(|resource| self.resource_object(resource, Some(loaded)))
            .collect::<JsonApiResult<Vec<_>>>()?;
        let included = self.included(resources, loaded)?;

        let mut links = LinkSet::new();
        links.insert(SELF_LINK, self.links.collection(resource_type));

        Ok(Document::new(PrimaryData::Resources(objects))
            .with_links(links)
            .with_included(included))
    }

    /// Document for `GET {type}/{id}/{relationship}`
    ///
    /// Primary data are the related resources themselves.
    pub fn related_document(
        &self,
        source: &ResourceIdentity,
        relationship: &str,
        related: &[ResourceData],
    ) -> JsonApiResult<Document> {
        let schema = self.schemas.schema_for(&source.resource_type)?;
        let relation = schema.relationship(relationship)?;

        let data = if relation.is_to_many() {
            let objects = related
                .iter()
                .map(|resource| self.resource_object(resource, None))
                .collect::<JsonApiResult<Vec<_>>>()?;
            PrimaryData::Resources(objects)
        } else {
            let object = related
                .first()
                .map(|resource| self.resource_object(resource, None))
                .transpose()?;
            PrimaryData::Resource(object.map(Box::new))
        };

        Ok(Document::new(data).with_links(self.relationship_links(source, relation)?))
    }

    /// Document for `GET {type}/{id}/relationships/{relationship}`
    ///
    /// Primary data are resource identifier objects only.
    pub fn relationship_document(
        &self,
        source: &ResourceIdentity,
        relationship: &str,
        related: &[ResourceIdentity],
    ) -> JsonApiResult<Document> {
        let schema = self.schemas.schema_for(&source.resource_type)?;
        let relation = schema.relationship(relationship)?;

        let data = if relation.is_to_many() {
            PrimaryData::Identifiers(related.to_vec())
        } else {
            PrimaryData::Identifier(related.first().cloned())
        };

        Ok(Document::new(data).with_links(self.relationship_links(source, relation)?))
    }

    /// Unique loaded members not already in the primary data
    fn included(
        &self,
        primary: &[ResourceData],
        loaded: &LoadedRelations,
    ) -> JsonApiResult<Vec<ResourceObject>> {
        if loaded.is_empty() {
            return Ok(vec![]);
        }

        let mut seen: IndexSet<ResourceIdentity> =
            primary.iter().map(|r| r.identity.clone()).collect();
        let mut included = Vec::new();

        for resource in primary {
            let schema = self.schemas.schema_for(resource.resource_type())?;
            for relation in schema.visible_relationships() {
                let Some(related) = loaded.get(&resource.identity, relation.name()) else {
                    continue;
                };
                for member in related {
                    if seen.insert(member.identity.clone()) {
                        included.push(self.resource_object(member, None)?);
                    }
                }
            }
        }

        Ok(included)
    }
}

fn linkage(relation: &RelationshipDescriptor, related: &[ResourceData]) -> RelationshipData {
    if relation.is_to_many() {
        RelationshipData::ToMany(related.iter().map(|r| r.identity.clone()).collect())
    } else {
        RelationshipData::ToOne(related.first().map(|r| r.identity.clone()))
    }
}

fn filter_attributes(schema: &Schema, resource: &ResourceData) -> Map<String, serde_json::Value> {
    if schema.attributes().is_empty() {
        return resource.attributes.clone();
    }

    schema
        .attributes()
        .iter()
        .filter_map(|name| {
            resource
                .attributes
                .get(name)
                .map(|value| (name.clone(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaBuilder;
    use serde_json::json;

    fn registry(configure: impl FnOnce(&mut SchemaBuilder)) -> SchemaRegistry {
        let mut posts = SchemaBuilder::new("posts")
            .attributes(["title"])
            .has_many("tags", "tags")
            .has_one("author", Some("users"));
        configure(&mut posts);

        SchemaRegistry::new()
            .with(posts.build())
            .with(SchemaBuilder::new("tags").attribute("name").build())
            .with(SchemaBuilder::new("users").build())
    }

    fn serializer(configure: impl FnOnce(&mut SchemaBuilder)) -> DocumentSerializer {
        DocumentSerializer::new(
            LinkBuilder::new("http://localhost/api/v1"),
            Arc::new(registry(configure)),
        )
    }

    fn post() -> ResourceData {
        ResourceData::from_json("posts", "1", json!({ "title": "Hello", "secret": "x" }))
    }

    fn tag(id: &str) -> ResourceData {
        ResourceData::from_json("tags", id, json!({ "name": format!("tag-{}", id) }))
    }

    #[test]
    fn test_resource_object_filters_attributes() {
        let object = serializer(|_| {}).resource_object(&post(), None).unwrap();
        assert_eq!(object.attributes.get("title"), Some(&json!("Hello")));
        assert!(object.attributes.get("secret").is_none());
        assert_eq!(
            object.links.self_link(),
            Some("http://localhost/api/v1/posts/1")
        );
    }

    #[test]
    fn test_hidden_relationship_absent() {
        let serializer = serializer(|posts| {
            posts.relationship("tags").unwrap().hidden();
        });
        let object = serializer.resource_object(&post(), None).unwrap();

        assert!(!object.relationships.contains_key("tags"));
        assert!(object.relationships.contains_key("author"));
    }

    #[test]
    fn test_flags_then_transform_compose() {
        let serializer = serializer(|posts| {
            posts
                .relationship("tags")
                .unwrap()
                .without_self_link()
                .serialize_using(|relation| relation.without_self_link());
        });
        let object = serializer.resource_object(&post(), None).unwrap();
        let tags = &object.relationships["tags"];

        assert_eq!(tags.links.len(), 1);
        assert_eq!(
            tags.links.related_link(),
            Some("http://localhost/api/v1/posts/1/tags")
        );
    }

    #[test]
    fn test_transform_sees_flagged_links() {
        let serializer = serializer(|posts| {
            posts
                .relationship("tags")
                .unwrap()
                .without_related_link()
                .serialize_using(|relation| {
                    assert!(relation.links.related_link().is_none());
                    relation.with_meta(json!({ "checked": true }))
                });
        });
        let object = serializer.resource_object(&post(), None).unwrap();
        assert_eq!(object.relationships["tags"].meta, Some(json!({ "checked": true })));
    }

    #[test]
    fn test_related_and_relationship_documents_agree_on_order() {
        let serializer = serializer(|_| {});
        let source = post().identity;
        let related = vec![tag("2"), tag("1"), tag("3")];

        let related_doc = serializer
            .related_document(&source, "tags", &related)
            .unwrap();
        let identifiers: Vec<_> = related.iter().map(|r| r.identity.clone()).collect();
        let relationship_doc = serializer
            .relationship_document(&source, "tags", &identifiers)
            .unwrap();

        assert_eq!(related_doc.data.identities(), relationship_doc.data.identities());

        let value = serde_json::to_value(&related_doc).unwrap();
        assert_eq!(value["data"][0]["attributes"]["name"], "tag-2");
        let value = serde_json::to_value(&relationship_doc).unwrap();
        assert_eq!(value["data"][0], json!({ "type": "tags", "id": "2" }));
    }

    #[test]
    fn test_relationship_document_links_follow_transform() {
        let serializer = serializer(|posts| {
            posts
                .relationship("tags")
                .unwrap()
                .serialize_using(|relation| relation.without_related_link());
        });
        let doc = serializer
            .relationship_document(&post().identity, "tags", &[])
            .unwrap();

        assert_eq!(
            serde_json::to_value(&doc.links).unwrap(),
            json!({ "self": "http://localhost/api/v1/posts/1/relationships/tags" })
        );
    }

    #[test]
    fn test_hidden_relationship_document_has_no_links() {
        let serializer = serializer(|posts| {
            posts.relationship("tags").unwrap().hidden();
        });
        let doc = serializer
            .related_document(&post().identity, "tags", &[tag("1")])
            .unwrap();

        assert!(doc.links.is_empty());
        assert_eq!(doc.data.identities().len(), 1);
    }

    #[test]
    fn test_to_one_related_document_null() {
        let doc = serializer(|_| {})
            .related_document(&post().identity, "author", &[])
            .unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["data"].is_null());
    }

    #[test]
    fn test_unknown_relationship() {
        let err = serializer(|_| {})
            .relationship_document(&post().identity, "likes", &[])
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_RELATIONSHIP");
    }

    #[test]
    fn test_resource_document_with_included() {
        let serializer = serializer(|_| {});
        let mut loaded = LoadedRelations::new();
        loaded.insert(post().identity, "tags", vec![tag("1"), tag("2"), tag("1")]);

        let doc = serializer.resource_document(&post(), &loaded).unwrap();
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(
            value["data"]["relationships"]["tags"]["data"],
            json!([
                { "type": "tags", "id": "1" },
                { "type": "tags", "id": "2" },
                { "type": "tags", "id": "1" }
            ])
        );
        assert_eq!(value["included"].as_array().unwrap().len(), 2);
        assert_eq!(value["links"]["self"], "http://localhost/api/v1/posts/1");
    }

    #[test]
    fn test_parse_include() {
        let mut builder = SchemaBuilder::new("posts")
            .has_many("tags", "tags")
            .has_many("comments", "comments");
        builder.relationship("comments").unwrap().hidden();
        let schema = builder.build();

        assert_eq!(parse_include(&schema, None).unwrap(), Vec::<String>::new());
        assert_eq!(
            parse_include(&schema, Some("tags, tags")).unwrap(),
            vec!["tags".to_string()]
        );
        assert!(parse_include(&schema, Some("comments")).is_err());
        assert!(parse_include(&schema, Some("tags.posts")).is_err());
        assert!(parse_include(&schema, Some("likes")).is_err());
    }

    #[test]
    fn test_unknown_primary_type() {
        let err = serializer(|_| {})
            .collection_document("comments", &[], &LoadedRelations::new())
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_RESOURCE_TYPE");
    }
}

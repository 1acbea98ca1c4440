//! Link construction for resources and relationships
//!
//! For a server mounted at `http://localhost/api/v1`, the `tags` relationship
//! of post `1` produces:
//!
//! - `self`: `http://localhost/api/v1/posts/1/relationships/tags`
//! - `related`: `http://localhost/api/v1/posts/1/tags`
//!
//! Every path segment is percent-encoded, so an id such as `a/b` yields
//! `.../posts/a%2Fb` and still addresses a single resource.

use crate::core::{JsonApiResult, RelationshipError, ResourceIdentity};
use crate::links::link_set::{LinkSet, RELATED_LINK, SELF_LINK};
use crate::schema::RelationshipDescriptor;
use urlencoding::encode;

/// Builds absolute links below a server's URL prefix
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    prefix: String,
}

impl LinkBuilder {
    /// `prefix` is the absolute URL prefix of the server, without trailing slash
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `{prefix}/{type}`
    pub fn collection(&self, resource_type: &str) -> String {
        format!("{}/{}", self.prefix, encode(resource_type))
    }

    /// `{prefix}/{type}/{id}`
    pub fn resource(&self, identity: &ResourceIdentity) -> String {
        format!(
            "{}/{}",
            self.collection(&identity.resource_type),
            encode(&identity.id)
        )
    }

    /// `{prefix}/{type}/{id}/{relationship}`
    pub fn related(&self, identity: &ResourceIdentity, relationship: &str) -> String {
        format!("{}/{}", self.resource(identity), encode(relationship))
    }

    /// `{prefix}/{type}/{id}/relationships/{relationship}`
    pub fn relationship(&self, identity: &ResourceIdentity, relationship: &str) -> String {
        format!(
            "{}/relationships/{}",
            self.resource(identity),
            encode(relationship)
        )
    }

    /// Links of a resource object: only `self`
    pub fn resource_links(&self, identity: &ResourceIdentity) -> LinkSet {
        let mut links = LinkSet::new();
        links.insert(SELF_LINK, self.resource(identity));
        links
    }

    /// Links of a relationship, honoring the descriptor's suppression flags
    ///
    /// Hidden relationships get no links at all: the call fails with
    /// `RelationshipNotVisible` and callers omit the relationship.
    pub fn relationship_links(
        &self,
        identity: &ResourceIdentity,
        relation: &RelationshipDescriptor,
    ) -> JsonApiResult<LinkSet> {
        if relation.is_hidden() {
            return Err(RelationshipError::NotVisible {
                resource_type: identity.resource_type.clone(),
                relationship: relation.name().to_string(),
            }
            .into());
        }

        let suppression = relation.suppression();
        let mut links = LinkSet::new();

        if !suppression.no_self {
            links.insert(SELF_LINK, self.relationship(identity, relation.name()));
        }
        if !suppression.no_related {
            links.insert(RELATED_LINK, self.related(identity, relation.name()));
        }

        Ok(links)
    }
}

//! Relationship descriptors
//!
//! A descriptor is configured fluently while its schema is being built:
//!
//! ```rust,ignore
//! let mut posts = SchemaBuilder::new("posts").has_many("tags", "tags");
//! posts
//!     .relationship("tags")?
//!     .without_self_link()
//!     .serialize_using(|relation| relation.with_meta(json!({ "count": 1 })));
//! let schema = posts.build();
//! ```
//!
//! Once the schema is built the descriptor is read-only.

use crate::document::RelationshipObject;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Whether a relationship holds one or many members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// Whether a relationship is serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Declarative link suppression
///
/// `no-links` is represented by both flags being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkSuppression {
    pub no_self: bool,
    pub no_related: bool,
}

impl LinkSuppression {
    pub fn no_links(&self) -> bool {
        self.no_self && self.no_related
    }
}

/// Transform applied to a relationship object right before it is emitted
pub type RelationshipTransform =
    Arc<dyn Fn(RelationshipObject) -> RelationshipObject + Send + Sync>;

/// Configuration of a single relationship
#[derive(Clone)]
pub struct RelationshipDescriptor {
    name: String,
    cardinality: Cardinality,
    related_type: String,
    visibility: Visibility,
    suppression: LinkSuppression,
    transform: Option<RelationshipTransform>,
}

impl RelationshipDescriptor {
    pub fn new(
        name: impl Into<String>,
        cardinality: Cardinality,
        related_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality,
            related_type: related_type.into(),
            visibility: Visibility::Visible,
            suppression: LinkSuppression::default(),
            transform: None,
        }
    }

    /// Never serialize this relationship
    pub fn hidden(&mut self) -> &mut Self {
        self.visibility = Visibility::Hidden;
        self
    }

    /// Emit neither the `self` nor the `related` link
    pub fn without_links(&mut self) -> &mut Self {
        self.suppression.no_self = true;
        self.suppression.no_related = true;
        self
    }

    pub fn without_self_link(&mut self) -> &mut Self {
        self.suppression.no_self = true;
        self
    }

    pub fn without_related_link(&mut self) -> &mut Self {
        self.suppression.no_related = true;
        self
    }

    /// Replace the serialization hook
    ///
    /// The hook runs after links are built and the suppression flags are
    /// applied.
    pub fn serialize_using<F>(&mut self, transform: F) -> &mut Self
    where
        F: Fn(RelationshipObject) -> RelationshipObject + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_to_many(&self) -> bool {
        self.cardinality == Cardinality::ToMany
    }

    /// Resource type of the related resources
    pub fn related_type(&self) -> &str {
        &self.related_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    pub fn suppression(&self) -> LinkSuppression {
        self.suppression
    }

    /// Apply the serialization hook, if any
    pub fn transform(&self, object: RelationshipObject) -> RelationshipObject {
        match &self.transform {
            Some(transform) => transform(object),
            None => object,
        }
    }
}

impl fmt::Debug for RelationshipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipDescriptor")
            .field("name", &self.name)
            .field("cardinality", &self.cardinality)
            .field("related_type", &self.related_type)
            .field("visibility", &self.visibility)
            .field("suppression", &self.suppression)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

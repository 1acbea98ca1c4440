//! Resource schemas and their build phase

use crate::core::{Inflector, JsonApiResult, RelationshipError};
use crate::schema::relationship::{Cardinality, RelationshipDescriptor};
use indexmap::IndexMap;

/// Immutable description of one resource type
#[derive(Debug, Clone)]
pub struct Schema {
    resource_type: String,
    attributes: Vec<String>,
    relationships: IndexMap<String, RelationshipDescriptor>,
}

impl Schema {
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Declared attributes; empty means "emit every attribute"
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Look up a relationship, hidden or not
    pub fn relationship(&self, name: &str) -> JsonApiResult<&RelationshipDescriptor> {
        self.relationships.get(name).ok_or_else(|| {
            RelationshipError::Unknown {
                resource_type: self.resource_type.clone(),
                relationship: name.to_string(),
            }
            .into()
        })
    }

    /// Look up a relationship that may be serialized
    ///
    /// Hidden relationships fail with `RelationshipNotVisible`.
    pub fn visible_relationship(&self, name: &str) -> JsonApiResult<&RelationshipDescriptor> {
        let relation = self.relationship(name)?;
        if relation.is_hidden() {
            return Err(RelationshipError::NotVisible {
                resource_type: self.resource_type.clone(),
                relationship: name.to_string(),
            }
            .into());
        }
        Ok(relation)
    }

    /// All relationships in declaration order
    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipDescriptor> {
        self.relationships.values()
    }

    /// Non-hidden relationships in declaration order
    pub fn visible_relationships(&self) -> impl Iterator<Item = &RelationshipDescriptor> {
        self.relationships.values().filter(|r| !r.is_hidden())
    }

    /// Re-open a copy of this schema for configuration
    ///
    /// The copy must be registered again to take effect.
    pub fn to_builder(&self) -> SchemaBuilder {
        SchemaBuilder {
            resource_type: self.resource_type.clone(),
            attributes: self.attributes.clone(),
            relationships: self.relationships.clone(),
        }
    }
}

/// Mutable schema under construction
///
/// ```
/// use jsonapi::schema::SchemaBuilder;
///
/// let mut builder = SchemaBuilder::new("posts")
///     .attribute("title")
///     .has_many("tags", "tags")
///     .has_one("author", None);
/// builder.relationship("tags").unwrap().without_self_link();
///
/// let schema = builder.build();
/// assert_eq!(schema.relationship("author").unwrap().related_type(), "authors");
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    resource_type: String,
    attributes: Vec<String>,
    relationships: IndexMap<String, RelationshipDescriptor>,
}

impl SchemaBuilder {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: Vec::new(),
            relationships: IndexMap::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.attributes.contains(&name) {
            self.attributes.push(name);
        }
        self
    }

    pub fn attributes<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |builder, name| builder.attribute(name))
    }

    /// Declare a to-many relationship
    pub fn has_many(self, name: impl Into<String>, related_type: impl Into<String>) -> Self {
        self.with_relationship(RelationshipDescriptor::new(
            name,
            Cardinality::ToMany,
            related_type,
        ))
    }

    /// Declare a to-one relationship
    ///
    /// Without an explicit related type the relationship name is pluralized
    /// (`author` -> `authors`).
    pub fn has_one(self, name: impl Into<String>, related_type: Option<&str>) -> Self {
        let name = name.into();
        let related_type = related_type
            .map(str::to_string)
            .unwrap_or_else(|| Inflector::pluralize(&name));
        self.with_relationship(RelationshipDescriptor::new(
            name,
            Cardinality::ToOne,
            related_type,
        ))
    }

    /// Add a fully configured descriptor, replacing one with the same name
    pub fn with_relationship(mut self, relation: RelationshipDescriptor) -> Self {
        self.relationships.insert(relation.name().to_string(), relation);
        self
    }

    /// Mutable access to a declared relationship for fluent configuration
    pub fn relationship(&mut self, name: &str) -> JsonApiResult<&mut RelationshipDescriptor> {
        let resource_type = &self.resource_type;
        self.relationships.get_mut(name).ok_or_else(|| {
            RelationshipError::Unknown {
                resource_type: resource_type.clone(),
                relationship: name.to_string(),
            }
            .into()
        })
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Freeze the configuration
    pub fn build(self) -> Schema {
        Schema {
            resource_type: self.resource_type,
            attributes: self.attributes,
            relationships: self.relationships,
        }
    }
}

//! Schema registry
//!
//! Maps resource type names to their [`Schema`]. Registries are built at
//! startup and shared as immutable `Arc` snapshots; see
//! [`Server::replace_schemas`](crate::schema::Server::replace_schemas) for
//! swapping one in at runtime.

use crate::core::{JsonApiResult, SchemaError};
use crate::schema::definition::Schema;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of schemas, at most one per resource type
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Register a schema
    ///
    /// A schema for the same resource type is replaced.
    pub fn register(&mut self, schema: Schema) -> &mut Self {
        let resource_type = schema.resource_type().to_string();
        if self
            .schemas
            .insert(resource_type.clone(), Arc::new(schema))
            .is_some()
        {
            tracing::debug!(resource_type = %resource_type, "replaced schema");
        }
        self
    }

    /// Builder-style registration
    pub fn with(mut self, schema: Schema) -> Self {
        self.register(schema);
        self
    }

    /// Look up the schema of a resource type
    pub fn schema_for(&self, resource_type: &str) -> JsonApiResult<Arc<Schema>> {
        self.schemas.get(resource_type).cloned().ok_or_else(|| {
            SchemaError::UnknownResourceType {
                resource_type: resource_type.to_string(),
            }
            .into()
        })
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.schemas.contains_key(resource_type)
    }

    /// Registered resource types, sorted
    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<_> = self.schemas.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

//! Data access seam between the serializer and the host application

use crate::core::identity::{ResourceData, ResourceIdentity};
use anyhow::Result;
use async_trait::async_trait;

/// Trait for loading resources dynamically
///
/// The framework never touches a database; it asks the host for resources
/// by type and id and for the ordered members of a relationship.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Fetch a single resource
    ///
    /// Returns `Ok(None)` when the resource does not exist.
    async fn find(&self, resource_type: &str, id: &str) -> Result<Option<ResourceData>>;

    /// List every resource of a type
    ///
    /// Default implementation returns an empty list.
    async fn list(&self, _resource_type: &str) -> Result<Vec<ResourceData>> {
        Ok(vec![])
    }

    /// Fetch the resources related to `source` through `relationship`
    ///
    /// The order of the returned resources is the relationship order and is
    /// preserved by every document built from it. A to-one relationship
    /// returns zero or one element.
    async fn related(
        &self,
        source: &ResourceIdentity,
        relationship: &str,
    ) -> Result<Vec<ResourceData>>;
}

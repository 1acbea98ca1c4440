//! In-memory implementation of ResourceRepository for testing and development

use crate::core::{ResourceData, ResourceIdentity, ResourceRepository};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct Store {
    /// resource type -> id -> data, in insertion order
    resources: HashMap<String, IndexMap<String, ResourceData>>,
    /// (source, relationship) -> ordered member identities
    relations: HashMap<(ResourceIdentity, String), Vec<ResourceIdentity>>,
}

/// In-memory resource store
///
/// Uses RwLock for thread-safe access. Relationship members keep the order
/// in which they were attached.
#[derive(Clone, Default)]
pub struct InMemoryResourceStore {
    store: Arc<RwLock<Store>>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource
    pub fn insert(&self, resource: ResourceData) -> Result<ResourceIdentity> {
        let mut store = self
            .store
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let identity = resource.identity.clone();
        store
            .resources
            .entry(identity.resource_type.clone())
            .or_default()
            .insert(identity.id.clone(), resource);

        Ok(identity)
    }

    /// Create a resource with a generated id
    pub fn create(&self, resource_type: &str, attributes: Value) -> Result<ResourceIdentity> {
        let id = Uuid::new_v4().to_string();
        self.insert(ResourceData::from_json(resource_type, id, attributes))
    }

    /// Append members to a to-many relationship, skipping existing ones
    pub fn attach(
        &self,
        source: &ResourceIdentity,
        relationship: &str,
        members: impl IntoIterator<Item = ResourceIdentity>,
    ) -> Result<()> {
        let mut store = self
            .store
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let entry = store
            .relations
            .entry((source.clone(), relationship.to_string()))
            .or_default();
        for member in members {
            if !entry.contains(&member) {
                entry.push(member);
            }
        }

        Ok(())
    }

    /// Replace a to-one relationship; `None` empties it
    pub fn set_to_one(
        &self,
        source: &ResourceIdentity,
        relationship: &str,
        member: Option<ResourceIdentity>,
    ) -> Result<()> {
        let mut store = self
            .store
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        store.relations.insert(
            (source.clone(), relationship.to_string()),
            member.into_iter().collect(),
        );

        Ok(())
    }
}

#[async_trait]
impl ResourceRepository for InMemoryResourceStore {
    async fn find(&self, resource_type: &str, id: &str) -> Result<Option<ResourceData>> {
        let store = self
            .store
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(store
            .resources
            .get(resource_type)
            .and_then(|by_id| by_id.get(id))
            .cloned())
    }

    async fn list(&self, resource_type: &str) -> Result<Vec<ResourceData>> {
        let store = self
            .store
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(store
            .resources
            .get(resource_type)
            .map(|by_id| by_id.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn related(
        &self,
        source: &ResourceIdentity,
        relationship: &str,
    ) -> Result<Vec<ResourceData>> {
        let store = self
            .store
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let Some(members) = store
            .relations
            .get(&(source.clone(), relationship.to_string()))
        else {
            return Ok(vec![]);
        };

        // Dangling members (deleted resources) are skipped
        Ok(members
            .iter()
            .filter_map(|member| {
                store
                    .resources
                    .get(&member.resource_type)
                    .and_then(|by_id| by_id.get(&member.id))
                    .cloned()
            })
            .collect())
    }
}

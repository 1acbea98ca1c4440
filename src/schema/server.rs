//! Named servers binding a URL prefix to a schema registry

use crate::core::{JsonApiResult, SchemaError};
use crate::links::LinkBuilder;
use crate::schema::definition::Schema;
use crate::schema::registry::SchemaRegistry;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};

/// A JSON:API server
///
/// Handlers take one [`schemas`](Self::schemas) snapshot per request, so a
/// registry swapped in while a request runs never affects it.
#[derive(Debug)]
pub struct Server {
    name: String,
    base_url: String,
    prefix: String,
    schemas: RwLock<Arc<SchemaRegistry>>,
}

impl Server {
    /// Create a server
    ///
    /// `prefix` is normalized to start with `/` and have no trailing `/`.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        prefix: impl AsRef<str>,
        schemas: SchemaRegistry,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            prefix: normalize_prefix(prefix.as_ref()),
            schemas: RwLock::new(Arc::new(schemas)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Route prefix, e.g. `/api/v1` (empty for the root)
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Absolute URL prefix used for links
    pub fn url_prefix(&self) -> String {
        format!("{}{}", self.base_url, self.prefix)
    }

    pub fn link_builder(&self) -> LinkBuilder {
        LinkBuilder::new(self.url_prefix())
    }

    /// Current schema registry snapshot
    pub fn schemas(&self) -> Arc<SchemaRegistry> {
        match self.schemas.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Atomically replace the whole registry
    pub fn replace_schemas(&self, registry: SchemaRegistry) {
        let registry = Arc::new(registry);
        match self.schemas.write() {
            Ok(mut guard) => *guard = registry,
            Err(poisoned) => *poisoned.into_inner() = registry,
        }
        tracing::info!(server = %self.name, "schema registry replaced");
    }

    /// Register one schema by copy-on-write
    pub fn register_schema(&self, schema: Schema) {
        let mut guard = match self.schemas.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = SchemaRegistry::clone(&guard);
        next.register(schema);
        *guard = Arc::new(next);
    }
}

/// `/api/v1/` and `api/v1` both become `/api/v1`; the root becomes `""`
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// All configured servers, keyed by name in configuration order
#[derive(Debug, Clone, Default)]
pub struct ServerRepository {
    servers: IndexMap<String, Arc<Server>>,
}

impl ServerRepository {
    pub fn new() -> Self {
        Self {
            servers: IndexMap::new(),
        }
    }

    /// Add a server, replacing any server with the same name
    pub fn insert(&mut self, server: Server) -> Arc<Server> {
        let server = Arc::new(server);
        self.servers.insert(server.name().to_string(), server.clone());
        server
    }

    pub fn with(mut self, server: Server) -> Self {
        self.insert(server);
        self
    }

    /// Look up a server by name
    pub fn server(&self, name: &str) -> JsonApiResult<Arc<Server>> {
        self.servers.get(name).cloned().ok_or_else(|| {
            SchemaError::UnknownServer {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.servers.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Server>> {
        self.servers.values()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

//! Configuration loading and management
//!
//! ```yaml
//! base_url: http://localhost
//! generator:
//!   app_path: src/json_api
//!   root_namespace: crate::json_api
//! servers:
//!   v1:
//!     prefix: /api/v1
//!     schemas:
//!       - type: posts
//!         attributes: [title, content]
//!         relationships:
//!           - name: tags
//!             cardinality: to-many
//!             links: { self: false }
//!       - type: tags
//!         attributes: [name]
//! ```

use crate::core::{ConfigError, Inflector, JsonApiResult};
use crate::schema::server::normalize_prefix;
use crate::schema::{
    Cardinality, RelationshipDescriptor, Schema, SchemaBuilder, SchemaRegistry, Server,
    ServerRepository,
};
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Link switches of a relationship (both default to on)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipLinksConfig {
    #[serde(rename = "self", default = "default_true")]
    pub self_link: bool,

    #[serde(default = "default_true")]
    pub related: bool,
}

impl Default for RelationshipLinksConfig {
    fn default() -> Self {
        Self {
            self_link: true,
            related: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Configuration of one relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipConfig {
    pub name: String,

    pub cardinality: Cardinality,

    /// Related resource type; inferred from the name when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub related_type: Option<String>,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub links: RelationshipLinksConfig,
}

impl RelationshipConfig {
    /// Resource type of the related resources
    ///
    /// To-many names are already plural; to-one names are pluralized.
    pub fn related_type(&self) -> String {
        match (&self.related_type, self.cardinality) {
            (Some(related), _) => related.clone(),
            (None, Cardinality::ToMany) => self.name.clone(),
            (None, Cardinality::ToOne) => Inflector::pluralize(&self.name),
        }
    }

    fn descriptor(&self) -> RelationshipDescriptor {
        let mut relation =
            RelationshipDescriptor::new(&self.name, self.cardinality, self.related_type());
        if self.hidden {
            relation.hidden();
        }
        if !self.links.self_link {
            relation.without_self_link();
        }
        if !self.links.related {
            relation.without_related_link();
        }
        relation
    }
}

/// Configuration of one resource schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default)]
    pub attributes: Vec<String>,

    #[serde(default)]
    pub relationships: Vec<RelationshipConfig>,
}

impl SchemaConfig {
    /// Open a builder so code can add hooks before freezing
    pub fn to_builder(&self) -> SchemaBuilder {
        self.relationships.iter().fold(
            SchemaBuilder::new(&self.resource_type).attributes(self.attributes.iter().cloned()),
            |builder, relation| builder.with_relationship(relation.descriptor()),
        )
    }

    pub fn to_schema(&self) -> Schema {
        self.to_builder().build()
    }
}

/// Configuration of one server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Route prefix (e.g., "/api/v1")
    #[serde(default)]
    pub prefix: String,

    /// Overrides the top-level base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}

/// Authorizer generator settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    /// Directory generated modules are written below
    #[serde(default = "default_app_path")]
    pub app_path: PathBuf,

    /// Module path matching `app_path`
    #[serde(default = "default_root_namespace")]
    pub root_namespace: String,
}

fn default_app_path() -> PathBuf {
    PathBuf::from("src/json_api")
}

fn default_root_namespace() -> String {
    "crate::json_api".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            app_path: default_app_path(),
            root_namespace: default_root_namespace(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonApiConfig {
    /// Scheme and host used for absolute links
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Servers by name, in declaration order
    #[serde(default)]
    pub servers: IndexMap<String, ServerConfig>,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

impl Default for JsonApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            servers: IndexMap::new(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl JsonApiConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Merge several configurations
    ///
    /// Later configurations win: servers with the same name are combined,
    /// schemas with the same type replace earlier ones, and the base URL and
    /// generator settings of the last non-default configuration apply.
    pub fn merge(configs: Vec<JsonApiConfig>) -> Self {
        let mut merged = JsonApiConfig::default();

        for config in configs {
            if config.base_url != default_base_url() {
                merged.base_url = config.base_url;
            }
            if config.generator != GeneratorConfig::default() {
                merged.generator = config.generator;
            }

            for (name, server) in config.servers {
                match merged.servers.get_mut(&name) {
                    Some(existing) => {
                        if !server.prefix.is_empty() {
                            existing.prefix = server.prefix;
                        }
                        if server.base_url.is_some() {
                            existing.base_url = server.base_url;
                        }
                        for schema in server.schemas {
                            existing
                                .schemas
                                .retain(|s| s.resource_type != schema.resource_type);
                            existing.schemas.push(schema);
                        }
                    }
                    None => {
                        merged.servers.insert(name, server);
                    }
                }
            }
        }

        merged
    }

    /// Check that every server has its own prefix and that every
    /// relationship targets a type of its own server
    pub fn validate(&self) -> JsonApiResult<()> {
        let mut mounted: IndexMap<String, &str> = IndexMap::new();
        for (name, server) in &self.servers {
            let prefix = normalize_prefix(&server.prefix);
            if let Some(first) = mounted.get(&prefix) {
                return Err(ConfigError::DuplicatePrefix {
                    prefix,
                    first: first.to_string(),
                    second: name.clone(),
                }
                .into());
            }
            mounted.insert(prefix, name);
        }

        for server in self.servers.values() {
            for schema in &server.schemas {
                for relation in &schema.relationships {
                    let target = relation.related_type();
                    if !server.schemas.iter().any(|s| s.resource_type == target) {
                        return Err(ConfigError::UnknownTarget {
                            resource_type: schema.resource_type.clone(),
                            relationship: relation.name.clone(),
                            target,
                        }
                        .into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Configured server names, in declaration order
    pub fn server_names(&self) -> Vec<&str> {
        self.servers.keys().map(String::as_str).collect()
    }

    /// Build every configured server with its schema registry
    pub fn build_servers(&self) -> JsonApiResult<ServerRepository> {
        self.validate()?;

        let mut repository = ServerRepository::new();
        for (name, server) in &self.servers {
            let registry = server
                .schemas
                .iter()
                .fold(SchemaRegistry::new(), |registry, schema| {
                    registry.with(schema.to_schema())
                });
            let base_url = server.base_url.as_deref().unwrap_or(&self.base_url);

            tracing::debug!(
                server = %name,
                prefix = %server.prefix,
                schemas = registry.len(),
                "configured server"
            );
            repository.insert(Server::new(name, base_url, &server.prefix, registry));
        }

        Ok(repository)
    }

    /// Create a default configuration for testing
    ///
    /// One server `v1` at `/api/v1` with `posts` (to-many `tags`, to-one
    /// `author`), `tags` and `users`.
    pub fn default_config() -> Self {
        let schemas = vec![
            SchemaConfig {
                resource_type: "posts".to_string(),
                attributes: vec!["title".to_string(), "content".to_string()],
                relationships: vec![
                    RelationshipConfig {
                        name: "tags".to_string(),
                        cardinality: Cardinality::ToMany,
                        related_type: None,
                        hidden: false,
                        links: RelationshipLinksConfig::default(),
                    },
                    RelationshipConfig {
                        name: "author".to_string(),
                        cardinality: Cardinality::ToOne,
                        related_type: Some("users".to_string()),
                        hidden: false,
                        links: RelationshipLinksConfig::default(),
                    },
                ],
            },
            SchemaConfig {
                resource_type: "tags".to_string(),
                attributes: vec!["name".to_string()],
                relationships: vec![],
            },
            SchemaConfig {
                resource_type: "users".to_string(),
                attributes: vec!["name".to_string()],
                relationships: vec![],
            },
        ];

        let mut servers = IndexMap::new();
        servers.insert(
            "v1".to_string(),
            ServerConfig {
                prefix: "/api/v1".to_string(),
                base_url: None,
                schemas,
            },
        );

        Self {
            base_url: default_base_url(),
            servers,
            generator: GeneratorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::JsonApiError;

    #[test]
    fn test_default_config() {
        let config = JsonApiConfig::default_config();

        assert_eq!(config.server_names(), vec!["v1"]);
        assert_eq!(config.servers["v1"].schemas.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_serialization() {
        let config = JsonApiConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = JsonApiConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.server_names(), config.server_names());
        assert_eq!(parsed.servers["v1"].schemas.len(), 3);
    }

    #[test]
    fn test_relationship_yaml() {
        let yaml = r#"
servers:
  v1:
    prefix: /api/v1
    schemas:
      - type: posts
        relationships:
          - name: tags
            cardinality: to-many
            links: { self: false }
          - name: author
            cardinality: to-one
            hidden: true
      - type: tags
      - type: authors
"#;
        let config = JsonApiConfig::from_yaml_str(yaml).unwrap();
        let posts = config.servers["v1"].schemas[0].to_schema();

        let tags = posts.relationship("tags").unwrap();
        assert!(tags.suppression().no_self);
        assert!(!tags.suppression().no_related);

        let author = posts.relationship("author").unwrap();
        assert!(author.is_hidden());
        assert_eq!(author.related_type(), "authors");
    }

    #[test]
    fn test_validate_unknown_target() {
        let yaml = r#"
servers:
  v1:
    schemas:
      - type: posts
        relationships:
          - name: comments
            cardinality: to-many
"#;
        let config = JsonApiConfig::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("comments"));
        assert!(config.build_servers().is_err());
    }

    #[test]
    fn test_validate_two_root_servers() {
        let yaml = r#"
servers:
  beta:
    schemas:
      - type: posts
  v1:
    schemas:
      - type: posts
"#;
        let config = JsonApiConfig::from_yaml_str(yaml).unwrap();

        match config.validate() {
            Err(JsonApiError::Config(ConfigError::DuplicatePrefix {
                prefix,
                first,
                second,
            })) => {
                assert_eq!(prefix, "");
                assert_eq!(first, "beta");
                assert_eq!(second, "v1");
            }
            other => panic!("expected DuplicatePrefix, got {:?}", other),
        }
        assert!(config.build_servers().is_err());
    }

    #[test]
    fn test_validate_prefixes_compared_normalized() {
        let yaml = r#"
servers:
  v1:
    prefix: /api/v1
  legacy:
    prefix: api/v1/
"#;
        let config = JsonApiConfig::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Servers 'v1' and 'legacy' share the prefix '/api/v1'"
        );
    }

    #[test]
    fn test_parse_error_is_typed() {
        let err = JsonApiConfig::from_yaml_str("servers: [").unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_build_servers() {
        let servers = JsonApiConfig::default_config().build_servers().unwrap();
        let v1 = servers.server("v1").unwrap();

        assert_eq!(v1.url_prefix(), "http://localhost/api/v1");
        assert_eq!(v1.schemas().resource_types(), vec!["posts", "tags", "users"]);
    }

    #[test]
    fn test_generator_defaults() {
        let config = JsonApiConfig::from_yaml_str("servers: {}").unwrap();
        assert_eq!(config.generator.root_namespace, "crate::json_api");
        assert_eq!(config.generator.app_path, PathBuf::from("src/json_api"));
        assert_eq!(config.base_url, "http://localhost");
    }
}

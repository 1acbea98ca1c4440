//! Typed error handling for the jsonapi framework
//!
//! Errors are grouped by category so that callers can match on the exact
//! failure instead of inspecting strings:
//!
//! - [`SchemaError`]: server, schema and resource lookups
//! - [`RelationshipError`]: relationship lookups and visibility
//! - [`GeneratorError`]: authorizer scaffolding
//! - [`ConfigError`]: configuration parsing and validation
//! - [`StorageError`]: failures reported by a [`ResourceRepository`](crate::core::ResourceRepository)
//!
//! Every error maps to an HTTP status and renders as a JSON:API error
//! document.
//!
//! # Example
//!
//! ```rust,ignore
//! match registry.schema_for("comments") {
//!     Ok(schema) => println!("{} attributes", schema.attributes().len()),
//!     Err(JsonApiError::Schema(SchemaError::UnknownResourceType { resource_type })) => {
//!         println!("{} is not registered", resource_type);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Media type of every JSON:API payload
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// The main error type for the jsonapi framework
#[derive(Debug)]
pub enum JsonApiError {
    /// Schema registry errors
    Schema(SchemaError),

    /// Relationship errors
    Relationship(RelationshipError),

    /// Authorizer generation errors
    Generator(GeneratorError),

    /// Configuration errors
    Config(ConfigError),

    /// Resource repository errors
    Storage(StorageError),

    /// The authorizer refused the operation
    Forbidden { operation: String, resource_type: String },
}

impl fmt::Display for JsonApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonApiError::Schema(e) => write!(f, "{}", e),
            JsonApiError::Relationship(e) => write!(f, "{}", e),
            JsonApiError::Generator(e) => write!(f, "{}", e),
            JsonApiError::Config(e) => write!(f, "{}", e),
            JsonApiError::Storage(e) => write!(f, "{}", e),
            JsonApiError::Forbidden {
                operation,
                resource_type,
            } => write!(f, "Operation '{}' on '{}' is not authorized", operation, resource_type),
        }
    }
}

impl std::error::Error for JsonApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JsonApiError::Schema(e) => Some(e),
            JsonApiError::Relationship(e) => Some(e),
            JsonApiError::Generator(e) => Some(e),
            JsonApiError::Config(e) => Some(e),
            JsonApiError::Storage(e) => Some(e),
            JsonApiError::Forbidden { .. } => None,
        }
    }
}

/// A single JSON:API error object
#[derive(Debug, Clone, Serialize)]
pub struct ErrorObject {
    /// HTTP status code, as a string
    pub status: String,
    /// Error code for programmatic handling
    pub code: String,
    /// Short summary of the problem
    pub title: String,
    /// Human-readable explanation specific to this occurrence
    pub detail: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// Top-level JSON:API error document
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

impl JsonApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            JsonApiError::Schema(e) => e.status_code(),
            JsonApiError::Relationship(e) => e.status_code(),
            JsonApiError::Generator(_) => StatusCode::INTERNAL_SERVER_ERROR,
            JsonApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            JsonApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            JsonApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            JsonApiError::Schema(e) => e.error_code(),
            JsonApiError::Relationship(e) => e.error_code(),
            JsonApiError::Generator(e) => e.error_code(),
            JsonApiError::Config(_) => "CONFIG_ERROR",
            JsonApiError::Storage(_) => "STORAGE_ERROR",
            JsonApiError::Forbidden { .. } => "FORBIDDEN",
        }
    }

    /// Render as a JSON:API error object
    pub fn to_error_object(&self) -> ErrorObject {
        let status = self.status_code();
        ErrorObject {
            status: status.as_u16().to_string(),
            code: self.error_code().to_string(),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            detail: self.to_string(),
            meta: self.details(),
        }
    }

    /// Render as a JSON:API error document
    pub fn to_document(&self) -> ErrorDocument {
        ErrorDocument {
            errors: vec![self.to_error_object()],
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            JsonApiError::Schema(SchemaError::UnknownResourceType { resource_type }) => {
                Some(serde_json::json!({ "resource_type": resource_type }))
            }
            JsonApiError::Schema(SchemaError::ResourceNotFound { resource_type, id }) => {
                Some(serde_json::json!({ "resource_type": resource_type, "id": id }))
            }
            JsonApiError::Schema(SchemaError::UnknownServer { name }) => {
                Some(serde_json::json!({ "server": name }))
            }
            JsonApiError::Relationship(RelationshipError::Unknown {
                resource_type,
                relationship,
            })
            | JsonApiError::Relationship(RelationshipError::NotVisible {
                resource_type,
                relationship,
            }) => Some(serde_json::json!({
                "resource_type": resource_type,
                "relationship": relationship
            })),
            JsonApiError::Relationship(RelationshipError::InvalidInclude { path }) => {
                Some(serde_json::json!({ "parameter": "include", "path": path }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        (
            status,
            [(header::CONTENT_TYPE, JSON_API_MEDIA_TYPE)],
            Json(self.to_document()),
        )
            .into_response()
    }
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors related to server, schema and resource lookups
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No server is registered under the name
    #[error("Unknown server '{name}'")]
    UnknownServer { name: String },

    /// No schema is registered for the resource type
    #[error("Unknown resource type: {resource_type}")]
    UnknownResourceType { resource_type: String },

    /// The resource type exists but the resource does not
    #[error("{resource_type} with id '{id}' not found")]
    ResourceNotFound { resource_type: String, id: String },
}

impl SchemaError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SchemaError::UnknownServer { .. } => "UNKNOWN_SERVER",
            SchemaError::UnknownResourceType { .. } => "UNKNOWN_RESOURCE_TYPE",
            SchemaError::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
        }
    }
}

// =============================================================================
// Relationship Errors
// =============================================================================

/// Errors related to relationships
#[derive(Debug, thiserror::Error)]
pub enum RelationshipError {
    /// The schema declares no such relationship
    #[error("Relationship '{relationship}' does not exist on {resource_type}")]
    Unknown {
        resource_type: String,
        relationship: String,
    },

    /// The relationship is hidden and must not be serialized
    #[error("Relationship '{relationship}' on {resource_type} is not visible")]
    NotVisible {
        resource_type: String,
        relationship: String,
    },

    /// An include path does not name a visible relationship
    #[error("Include path '{path}' is not allowed")]
    InvalidInclude { path: String },
}

impl RelationshipError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelationshipError::Unknown { .. } => StatusCode::NOT_FOUND,
            RelationshipError::NotVisible { .. } => StatusCode::NOT_FOUND,
            RelationshipError::InvalidInclude { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RelationshipError::Unknown { .. } => "UNKNOWN_RELATIONSHIP",
            RelationshipError::NotVisible { .. } => "RELATIONSHIP_NOT_VISIBLE",
            RelationshipError::InvalidInclude { .. } => "INVALID_INCLUDE",
        }
    }
}

// =============================================================================
// Generator Errors
// =============================================================================

/// Errors raised while generating an authorizer scaffold
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Several servers are configured and none was chosen
    #[error("Ambiguous server: choose one of [{}] with --server", .available.join(", "))]
    AmbiguousServer { available: Vec<String> },

    /// The named server is not configured
    #[error("Unknown server '{name}'")]
    UnknownServer { name: String },

    /// Resource-scoped generation with no servers configured
    #[error("No servers are configured")]
    NoServers,

    /// The authorizer name cannot produce a valid type name
    #[error("Invalid authorizer name '{name}'")]
    InvalidName { name: String },

    /// The target file exists and overwriting was not requested
    #[error("Authorizer already exists at {path}")]
    ArtifactExists { path: String },

    /// Template rendering failed
    #[error("Failed to render authorizer template: {message}")]
    Template { message: String },

    /// Filesystem failure while writing the artifact
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GeneratorError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GeneratorError::AmbiguousServer { .. } => "AMBIGUOUS_SERVER",
            GeneratorError::UnknownServer { .. } => "UNKNOWN_SERVER",
            GeneratorError::NoServers => "NO_SERVERS",
            GeneratorError::InvalidName { .. } => "INVALID_NAME",
            GeneratorError::ArtifactExists { .. } => "ARTIFACT_EXISTS",
            GeneratorError::Template { .. } => "TEMPLATE_ERROR",
            GeneratorError::Io { .. } => "IO_ERROR",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration could not be parsed
    #[error("Failed to parse configuration{}: {message}", .file.as_ref().map(|f| format!(" '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// A relationship references a resource type absent from its server
    #[error("Relationship '{relationship}' on {resource_type} targets unknown type '{target}'")]
    UnknownTarget {
        resource_type: String,
        relationship: String,
        target: String,
    },

    /// Two servers would be mounted at the same route prefix
    #[error("Servers '{first}' and '{second}' share the prefix '{}'", display_prefix(.prefix))]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },
}

/// The root prefix is empty once normalized
fn display_prefix(prefix: &str) -> &str {
    if prefix.is_empty() { "/" } else { prefix }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by resource repositories
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage operation '{operation}' failed: {message}")]
    OperationFailed { operation: String, message: String },
}

impl StorageError {
    /// Wrap a repository failure
    pub fn from_anyhow(operation: &str, err: anyhow::Error) -> Self {
        StorageError::OperationFailed {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<SchemaError> for JsonApiError {
    fn from(err: SchemaError) -> Self {
        JsonApiError::Schema(err)
    }
}

impl From<RelationshipError> for JsonApiError {
    fn from(err: RelationshipError) -> Self {
        JsonApiError::Relationship(err)
    }
}

impl From<GeneratorError> for JsonApiError {
    fn from(err: GeneratorError) -> Self {
        JsonApiError::Generator(err)
    }
}

impl From<ConfigError> for JsonApiError {
    fn from(err: ConfigError) -> Self {
        JsonApiError::Config(err)
    }
}

impl From<StorageError> for JsonApiError {
    fn from(err: StorageError) -> Self {
        JsonApiError::Storage(err)
    }
}

/// Result type alias using [`JsonApiError`]
pub type JsonApiResult<T> = Result<T, JsonApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_visible_is_not_found() {
        let err = JsonApiError::from(RelationshipError::NotVisible {
            resource_type: "posts".to_string(),
            relationship: "tags".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "RELATIONSHIP_NOT_VISIBLE");
    }

    #[test]
    fn test_error_object_fields() {
        let err = JsonApiError::from(SchemaError::UnknownResourceType {
            resource_type: "comments".to_string(),
        });
        let object = err.to_error_object();

        assert_eq!(object.status, "404");
        assert_eq!(object.code, "UNKNOWN_RESOURCE_TYPE");
        assert_eq!(object.title, "Not Found");
        assert!(object.detail.contains("comments"));
        assert_eq!(object.meta.unwrap()["resource_type"], "comments");
    }

    #[test]
    fn test_ambiguous_server_lists_choices() {
        let err = GeneratorError::AmbiguousServer {
            available: vec!["beta".to_string(), "v1".to_string()],
        };
        assert!(err.to_string().contains("beta, v1"));
    }

    #[test]
    fn test_unknown_server_is_not_found() {
        let err = JsonApiError::from(SchemaError::UnknownServer {
            name: "v2".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "UNKNOWN_SERVER");
        assert_eq!(err.to_error_object().meta.unwrap()["server"], "v2");
    }

    #[test]
    fn test_duplicate_root_prefix_message() {
        let err = ConfigError::DuplicatePrefix {
            prefix: String::new(),
            first: "beta".to_string(),
            second: "v1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Servers 'beta' and 'v1' share the prefix '/'"
        );
    }

    #[test]
    fn test_config_parse_error_with_file() {
        let err = ConfigError::ParseError {
            file: Some("jsonapi.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse configuration 'jsonapi.yaml': bad indent"
        );
    }
}

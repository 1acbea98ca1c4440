//! Core module containing fundamental traits and types for the framework

pub mod auth;
pub mod error;
pub mod identity;
pub mod inflect;
pub mod repository;

pub use auth::{AUTHORIZER_METHODS, AllowAll, AuthRequest, Authorizer};
pub use error::{
    ConfigError, ErrorDocument, ErrorObject, GeneratorError, JSON_API_MEDIA_TYPE, JsonApiError,
    JsonApiResult, RelationshipError, SchemaError, StorageError,
};
pub use identity::{ResourceData, ResourceIdentity};
pub use inflect::Inflector;
pub use repository::ResourceRepository;

//! # jsonapi-rs
//!
//! Building blocks for JSON:API servers in Rust.
//!
//! ## Features
//!
//! - **Schemas**: resource types with attributes and relationships, held in
//!   per-server registries that can be swapped at runtime
//! - **Relationship links**: `self` and `related` links with per-relationship
//!   suppression, hiding and custom transforms
//! - **Documents**: resource, collection, related and relationship documents
//!   with one-level `include`
//! - **HTTP**: read endpoints per server on top of axum
//! - **Scaffolding**: `jsonapi generate-authorizer` writes authorizer modules
//!   atomically
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jsonapi::prelude::*;
//!
//! let mut posts = SchemaBuilder::new("posts")
//!     .attribute("title")
//!     .has_many("tags", "tags");
//! posts.relationship("tags")?.without_self_link();
//!
//! let servers = ServerRepository::new().with(Server::new(
//!     "v1",
//!     "http://localhost",
//!     "/api/v1",
//!     SchemaRegistry::new().with(posts.build()).with(SchemaBuilder::new("tags").build()),
//! ));
//!
//! ServerBuilder::new()
//!     .with_repository(InMemoryResourceStore::new())
//!     .with_servers(servers)
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod console;
pub mod core;
pub mod document;
pub mod generator;
pub mod links;
pub mod schema;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AllowAll, AuthRequest, Authorizer, Inflector, JsonApiError, JsonApiResult, ResourceData,
        ResourceIdentity, ResourceRepository,
    };

    // === Schemas ===
    pub use crate::schema::{
        Cardinality, RelationshipDescriptor, Schema, SchemaBuilder, SchemaRegistry, Server,
        ServerRepository,
    };

    // === Documents & Links ===
    pub use crate::document::{
        Document, DocumentSerializer, LoadedRelations, PrimaryData, RelationshipData,
        RelationshipObject, ResourceObject,
    };
    pub use crate::links::{LinkBuilder, LinkSet};

    // === Config ===
    pub use crate::config::JsonApiConfig;

    // === Generator ===
    pub use crate::generator::{AuthorizerGenerator, GenerateOptions, GeneratedArtifact};

    // === Server ===
    pub use crate::server::ServerBuilder;

    // === Storage ===
    pub use crate::storage::InMemoryResourceStore;

    // === Re-exports from external crates ===
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};
}

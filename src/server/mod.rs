//! Server module for exposing JSON:API servers over HTTP
//!
//! `ServerBuilder` assembles a `ServerHost` from configuration and a
//! resource repository, then mounts read routes for every server under its
//! prefix.

pub mod builder;
pub mod exposure;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
pub use handlers::{AppState, DocumentQuery, JsonApiResponse};
pub use host::ServerHost;

//! Source scaffolding

pub mod authorizer;
pub mod writer;

pub use authorizer::{
    AUTHORIZER_INTERFACE, AuthorizerGenerator, GenerateOptions, GeneratedArtifact,
};
pub use writer::write_atomic;

//! Resource schemas, relationship descriptors and the servers that own them

pub mod definition;
pub mod registry;
pub mod relationship;
pub mod server;

pub use definition::{Schema, SchemaBuilder};
pub use registry::SchemaRegistry;
pub use relationship::{
    Cardinality, LinkSuppression, RelationshipDescriptor, RelationshipTransform, Visibility,
};
pub use server::{Server, ServerRepository};

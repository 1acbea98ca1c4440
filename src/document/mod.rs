//! JSON:API documents and their serializer

pub mod objects;
pub mod serializer;

pub use objects::{
    Document, JsonApiObject, PrimaryData, RelationshipData, RelationshipObject, ResourceObject,
};
pub use serializer::{DocumentSerializer, LoadedRelations, parse_include};

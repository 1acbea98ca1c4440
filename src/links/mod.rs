//! Link generation for resources and relationships

pub mod builder;
pub mod link_set;

pub use builder::LinkBuilder;
pub use link_set::{LinkSet, RELATED_LINK, SELF_LINK};

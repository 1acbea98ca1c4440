//! Ordered link maps (`self`, `related`)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the link pointing at the object itself
pub const SELF_LINK: &str = "self";

/// Name of the link pointing at the related resources
pub const RELATED_LINK: &str = "related";

/// Ordered mapping from link name to absolute URL
///
/// Only present links are stored, so serialization never emits a `null`
/// for a suppressed link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSet(IndexMap<String, String>);

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a link, keeping its original position
    pub fn insert(&mut self, name: impl Into<String>, href: impl Into<String>) {
        self.0.insert(name.into(), href.into());
    }

    /// Remove a link; removing an absent link is a no-op
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn self_link(&self) -> Option<&str> {
        self.get(SELF_LINK)
    }

    pub fn related_link(&self) -> Option<&str> {
        self.get(RELATED_LINK)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LinkSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

//! The preference store trait.

use crate::error::PreferenceError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// A single change applied by [`PreferenceStore::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Put { key: String, value: String },
    Remove { key: String },
}

impl Edit {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Edit::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Edit::Remove { key: key.into() }
    }
}

/// A flat string-to-string namespace.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Name of the namespace this store holds.
    fn namespace(&self) -> &str;

    /// Every entry in the namespace, ordered by key.
    async fn get_all(&self) -> Result<BTreeMap<String, String>, PreferenceError>;

    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Commit a batch of edits as one write, in order.
    async fn apply(&self, edits: Vec<Edit>) -> Result<(), PreferenceError>;

    async fn put(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.apply(vec![Edit::put(key, value)]).await
    }

    async fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        self.apply(vec![Edit::remove(key)]).await
    }
}

/// Apply edits to an in-memory map.
pub(crate) fn apply_edits(entries: &mut BTreeMap<String, String>, edits: Vec<Edit>) {
    for edit in edits {
        match edit {
            Edit::Put { key, value } => {
                entries.insert(key, value);
            }
            Edit::Remove { key } => {
                entries.remove(&key);
            }
        }
    }
}

/// Check that a namespace is usable as a file stem.
pub(crate) fn validate_namespace(namespace: &str) -> Result<(), PreferenceError> {
    let valid = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(PreferenceError::InvalidNamespace(namespace.to_string()))
    }
}

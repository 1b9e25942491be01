//! In-memory preference store.

use crate::error::PreferenceError;
use crate::store::{apply_edits, validate_namespace, Edit, PreferenceStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory preference store.
///
/// Clones share the same entries. Nothing survives the process.
#[derive(Debug, Clone)]
pub struct MemoryPreferences {
    namespace: String,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryPreferences {
    /// Create an empty namespace.
    pub fn new(namespace: impl Into<String>) -> Result<Self, PreferenceError> {
        Self::with_entries(namespace, BTreeMap::new())
    }

    /// Create a namespace pre-populated with entries.
    pub fn with_entries(
        namespace: impl Into<String>,
        entries: BTreeMap<String, String>,
    ) -> Result<Self, PreferenceError> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;

        Ok(Self {
            namespace,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        Ok(self.entries.read().await.clone())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn apply(&self, edits: Vec<Edit>) -> Result<(), PreferenceError> {
        let count = edits.len();
        let mut entries = self.entries.write().await;
        apply_edits(&mut entries, edits);
        debug!("Applied {} edits to {} (memory)", count, self.namespace);
        Ok(())
    }
}

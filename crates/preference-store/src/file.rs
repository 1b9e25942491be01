//! JSON-file preference store.

use crate::error::PreferenceError;
use crate::store::{apply_edits, validate_namespace, Edit, PreferenceStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Preference store persisted as one JSON object per namespace.
///
/// File layout: `<dir>/<namespace>.json`, a flat object of string values.
/// A missing file is an empty namespace.
pub struct FilePreferences {
    namespace: String,
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FilePreferences {
    /// Open a namespace under `dir`. The file is created on first write.
    pub fn open(dir: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self, PreferenceError> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        let path = dir.as_ref().join(format!("{}.json", namespace));

        Ok(Self {
            namespace,
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        if !fs::try_exists(&self.path).await? {
            debug!("Preference file {:?} not found, namespace is empty", self.path);
            return Ok(BTreeMap::new());
        }

        let data = fs::read(&self.path).await?;
        if data.is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_slice(&data)?)
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        let data = serde_json::to_vec_pretty(entries)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file + rename
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(
            "Saved {} entries ({} bytes) to {:?}",
            entries.len(),
            data.len(),
            self.path
        );
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FilePreferences {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let entries = self.read_entries().await?;
        info!(
            "Loaded {} entries from namespace {} at {:?}",
            entries.len(),
            self.namespace,
            self.path
        );
        Ok(entries)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_entries().await?.remove(key))
    }

    async fn apply(&self, edits: Vec<Edit>) -> Result<(), PreferenceError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        apply_edits(&mut entries, edits);
        self.write_entries(&entries).await
    }
}

//! Disk-backed storage.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Storage;
use crate::error::Result;

/// One value file per key under a root directory.
///
/// File names are derived from the SHA-256 of the key so arbitrary keys map
/// to safe paths; a sidecar `.meta.json` records the original key for
/// listing. Writes are atomic (write-to-temp-then-rename) so entries are
/// never observed partially written.
pub struct FileStore {
    root: PathBuf,
}

/// Listing record for a stored key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredKey {
    /// The original storage key.
    pub key: String,
    /// When the value was last written.
    pub written_at: DateTime<Utc>,
    /// Value size in bytes.
    pub size_bytes: u64,
}

impl FileStore {
    /// Create a store rooted at a directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn value_path(&self, key: &str) -> PathBuf {
        let hash = Sha256::digest(key.as_bytes());
        self.root.join(hex::encode(&hash[..8]))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.value_path(key).with_extension("meta.json")
    }

    /// List all stored keys, most recently written first.
    pub fn list(&self) -> Result<Vec<StoredKey>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(json) = fs::read_to_string(&path) {
                    if let Ok(stored) = serde_json::from_str::<StoredKey>(&json) {
                        keys.push(stored);
                    }
                }
            }
        }

        keys.sort_by(|a, b| b.written_at.cmp(&a.written_at));
        Ok(keys)
    }

    /// Remove a stored key.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let value_path = self.value_path(key);
        let meta_path = self.meta_path(key);

        let mut removed = false;
        if value_path.exists() {
            fs::remove_file(&value_path)?;
            removed = true;
        }
        if meta_path.exists() {
            fs::remove_file(&meta_path)?;
            removed = true;
        }

        Ok(removed)
    }

    /// Remove all stored keys, returning how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let keys = self.list()?;
        let count = keys.len();
        for stored in keys {
            self.remove(&stored.key)?;
        }
        Ok(count)
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&path)?))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.ensure_dir()?;

        let path = self.value_path(key);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        let meta = StoredKey {
            key: key.to_string(),
            written_at: Utc::now(),
            size_bytes: value.len() as u64,
        };
        let json = serde_json::to_string_pretty(&meta).map_err(anyhow::Error::from)?;
        fs::write(self.meta_path(key), json.as_bytes())?;

        Ok(())
    }
}

//! Publish manifest
//!
//! Records, for every published post, the key it was written under and a
//! hash of what was written there. A post that moves to a new key (retitled
//! or redated) leaves its old output behind; the manifest is how we find it.
//! It also makes sure a key belongs to one post only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::PublishError;

/// Manifest location, relative to the site base directory
pub const MANIFEST_FILE: &str = ".postpress/manifest.json";

/// One published post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Output key relative to the public dir
    pub key: String,
    /// Hash of the page and metadata written for this key
    pub content_hash: u64,
    /// Source file the post was loaded from
    pub source: PathBuf,
}

/// Published posts keyed by content id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Current manifest format version
    const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    /// Load the manifest, or start a new one if it is missing or outdated
    pub fn load(base_dir: &Path) -> Self {
        let path = base_dir.join(MANIFEST_FILE);
        if let Ok(content) = fs::read_to_string(&path) {
            match serde_json::from_str::<Manifest>(&content) {
                Ok(manifest) if manifest.version == Self::VERSION => return manifest,
                Ok(_) => tracing::info!("Manifest version mismatch, starting a new one"),
                Err(e) => tracing::warn!("Ignoring unreadable manifest {:?}: {}", path, e),
            }
        }
        Self::new()
    }

    /// Save the manifest to disk
    pub fn save(&self, base_dir: &Path) -> Result<(), PublishError> {
        let path = base_dir.join(MANIFEST_FILE);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PublishError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|e| PublishError::io(&path, e))?;
        Ok(())
    }

    /// Id of the post currently published under `key`
    pub fn owner_of(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.key == key)
            .map(|(id, _)| id.as_str())
    }

    /// True when `id` was last published under `key` with exactly this content
    pub fn is_current(&self, id: &str, key: &str, content_hash: u64) -> bool {
        self.entries
            .get(id)
            .is_some_and(|entry| entry.key == key && entry.content_hash == content_hash)
    }

    /// Fail with [`PublishError::KeyConflict`] when another post owns `key`
    ///
    /// An owner whose source file is gone no longer holds its key.
    pub fn check_key(&self, id: &str, key: &str) -> Result<(), PublishError> {
        match self.owner_of(key) {
            Some(owner) if owner != id && self.entries[owner].source.exists() => {
                Err(PublishError::KeyConflict {
                    key: key.to_string(),
                    id: id.to_string(),
                    owner: owner.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Record a post; returns the key it was previously published under, if different
    pub fn record(&mut self, id: &str, entry: ManifestEntry) -> Result<Option<String>, PublishError> {
        self.check_key(id, &entry.key)?;

        if let Some(owner) = self.owner_of(&entry.key).filter(|owner| *owner != id) {
            let owner = owner.to_string();
            tracing::debug!("{} no longer exists, releasing {}", owner, entry.key);
            self.entries.remove(&owner);
        }

        let previous = self.entries.insert(id.to_string(), entry.clone());
        Ok(previous
            .filter(|previous| previous.key != entry.key)
            .map(|previous| previous.key))
    }

    /// Drop every entry `keep` rejects, returning the dropped ones
    pub fn take_stale<F>(&mut self, keep: F) -> Vec<(String, ManifestEntry)>
    where
        F: Fn(&str, &ManifestEntry) -> bool,
    {
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(id, entry)| !keep(id, entry))
            .map(|(id, _)| id.clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|entry| (id, entry)))
            .collect()
    }
}

/// Calculate a hash over the files written for one key
pub fn hash_content(parts: &[&[u8]]) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    for part in parts {
        part.hash(&mut hasher);
    }
    hasher.finish()
}

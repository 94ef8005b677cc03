//! Publishing - writes rendered pages and their metadata to the public dir
//!
//! Every write compares against what is already on disk first, so
//! publishing the same post twice leaves the output untouched.

mod manifest;

use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::helpers::{local_media, LocalMedia};
use crate::render::{layout, PageMeta, RenderedPage};
use crate::resolve::MediaReference;
use crate::Site;

pub use manifest::{hash_content, Manifest, ManifestEntry, MANIFEST_FILE};

/// Rendered page file name inside a key directory
pub const PAGE_FILE: &str = "index.html";
/// Metadata file name inside a key directory
pub const META_FILE: &str = "meta.json";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("refusing to publish outside the public directory: {0}")]
    UnsafeKey(String),
    #[error("{id} would be published under {key}, which already belongs to {owner}")]
    KeyConflict { key: String, id: String, owner: String },
}

impl PublishError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What a publish did on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Created,
    Updated,
    Unchanged,
}

impl PublishOutcome {
    /// Combine the outcomes of the files making up one artifact
    fn merge(self, other: PublishOutcome) -> PublishOutcome {
        use PublishOutcome::*;
        match (self, other) {
            (Created, _) | (_, Created) => Created,
            (Updated, _) | (_, Updated) => Updated,
            (Unchanged, Unchanged) => Unchanged,
        }
    }
}

/// Writes rendered pages under the public directory
pub struct Publisher {
    config: SiteConfig,
    base_dir: PathBuf,
    public_dir: PathBuf,
    manifest: Manifest,
}

impl Publisher {
    /// Open the publisher, loading the manifest from previous runs
    pub fn open(site: &Site) -> Self {
        Self {
            config: site.config.clone(),
            base_dir: site.base_dir.clone(),
            public_dir: site.public_dir.clone(),
            manifest: Manifest::load(&site.base_dir),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Directory a key is published into
    pub fn key_dir(&self, key: &str) -> Result<PathBuf, PublishError> {
        let relative = safe_relative(key).ok_or_else(|| PublishError::UnsafeKey(key.to_string()))?;
        Ok(self.public_dir.join(relative))
    }

    /// Write a rendered page, its metadata, and the local media it embeds
    ///
    /// A key belongs to one post: publishing a different post under a key
    /// that is already taken fails with [`PublishError::KeyConflict`].
    pub fn publish(
        &mut self,
        page: &RenderedPage,
        source: &Path,
    ) -> Result<PublishOutcome, PublishError> {
        let id = &page.meta.id;
        let key = &page.meta.key;
        self.manifest.check_key(id, key)?;
        let dir = self.key_dir(key)?;

        let mut meta_json = serde_json::to_string_pretty(&page.meta)?;
        meta_json.push('\n');
        let content_hash = hash_content(&[page.html.as_bytes(), meta_json.as_bytes()]);

        let page_path = dir.join(PAGE_FILE);
        let meta_path = dir.join(META_FILE);
        let outcome = if self.manifest.is_current(id, key, content_hash)
            && page_path.is_file()
            && meta_path.is_file()
        {
            PublishOutcome::Unchanged
        } else {
            write_if_changed(&page_path, page.html.as_bytes())?
                .merge(write_if_changed(&meta_path, meta_json.as_bytes())?)
        };

        for reference in &page.references {
            self.copy_media(reference, &dir)?;
        }

        let entry = ManifestEntry {
            key: key.clone(),
            content_hash,
            source: source.to_path_buf(),
        };
        if let Some(old_key) = self.manifest.record(id, entry)? {
            tracing::info!("{} moved from {} to {}, removing old output", id, old_key, key);
            self.remove_key(&old_key)?;
        }

        match outcome {
            PublishOutcome::Unchanged => tracing::debug!("Unchanged: {}", key),
            _ => tracing::debug!("Published: {:?}", dir),
        }

        Ok(outcome)
    }

    /// Copy a reachable local image next to the page (or under the site root)
    fn copy_media(&self, reference: &MediaReference, page_dir: &Path) -> Result<(), PublishError> {
        let Some(file) = reference.file.as_ref() else {
            return Ok(());
        };

        let target = match local_media(&self.config, &reference.url) {
            Some(LocalMedia::SiteRoot(relative)) => {
                safe_relative(&relative).map(|r| self.public_dir.join(r))
            }
            Some(LocalMedia::PageRelative(relative)) => {
                safe_relative(&relative).map(|r| page_dir.join(r))
            }
            None => return Ok(()),
        };

        let Some(target) = target else {
            tracing::warn!(
                "Not copying {:?} from {}: path leaves the public directory",
                reference.url,
                reference.source_id
            );
            return Ok(());
        };

        let bytes = fs::read(file).map_err(|e| PublishError::io(file, e))?;
        write_if_changed(&target, &bytes)?;
        Ok(())
    }

    /// Read back the metadata stored for a key
    pub fn read_meta(&self, key: &str) -> Result<PageMeta, PublishError> {
        let path = self.key_dir(key)?.join(META_FILE);
        let content = fs::read_to_string(&path).map_err(|e| PublishError::io(&path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the home page listing the given posts
    pub fn publish_index(&self, posts: &[PageMeta]) -> Result<PublishOutcome, PublishError> {
        let html = layout::index_page(&self.config, posts);
        write_if_changed(&self.public_dir.join(PAGE_FILE), html.as_bytes())
    }

    /// Metadata of every post in the manifest, newest first
    pub fn published_meta(&self) -> Vec<PageMeta> {
        let mut posts: Vec<PageMeta> = self
            .manifest
            .entries
            .iter()
            .filter_map(|(id, entry)| match self.read_meta(&entry.key) {
                Ok(meta) => Some(meta),
                Err(e) => {
                    tracing::warn!("Leaving {} out of the index: {}", id, e);
                    None
                }
            })
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        posts
    }

    /// Remove the output of every post `keep` rejects
    pub fn prune<F>(&mut self, keep: F) -> Result<Vec<String>, PublishError>
    where
        F: Fn(&str, &ManifestEntry) -> bool,
    {
        let mut removed = Vec::new();
        for (id, entry) in self.manifest.take_stale(keep) {
            tracing::info!("Removing output of {} ({})", id, entry.key);
            self.remove_key(&entry.key)?;
            removed.push(id);
        }
        Ok(removed)
    }

    /// Persist the manifest
    pub fn save(&self) -> Result<(), PublishError> {
        self.manifest.save(&self.base_dir)
    }

    /// Delete a key's page and metadata, then any directories left empty
    fn remove_key(&self, key: &str) -> Result<(), PublishError> {
        let dir = self.key_dir(key)?;
        for name in [PAGE_FILE, META_FILE] {
            let path = dir.join(name);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| PublishError::io(&path, e))?;
            }
        }

        // Walk up removing empty directories, stopping at the public dir
        let mut current = Some(dir.as_path());
        while let Some(path) = current {
            if path == self.public_dir || !path.starts_with(&self.public_dir) {
                break;
            }
            let is_empty = fs::read_dir(path)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if !is_empty {
                break;
            }
            fs::remove_dir(path).map_err(|e| PublishError::io(path, e))?;
            current = path.parent();
        }

        Ok(())
    }
}

/// Write `bytes` unless the file already holds exactly them
fn write_if_changed(path: &Path, bytes: &[u8]) -> Result<PublishOutcome, PublishError> {
    let outcome = match fs::read(path) {
        Ok(existing) if existing == bytes => return Ok(PublishOutcome::Unchanged),
        Ok(_) => PublishOutcome::Updated,
        Err(_) => PublishOutcome::Created,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PublishError::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| PublishError::io(path, e))?;
    Ok(outcome)
}

/// A relative path made only of normal components
fn safe_relative(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_matches('/');
    let relative = Path::new(trimmed);
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| relative.to_path_buf())
}

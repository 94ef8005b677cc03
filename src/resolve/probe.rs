//! Reachability checks for media URLs

use std::path::{Path, PathBuf};

use super::ReferenceStatus;
use crate::config::SiteConfig;
use crate::content::ContentItem;
use crate::helpers::{is_remote, local_media, LocalMedia};
use crate::Site;

/// Decides whether a media URL can be served
pub trait Probe {
    fn probe(&self, url: &str, item: &ContentItem) -> ReferenceStatus;

    /// Local file backing the URL, when there is one
    fn locate(&self, _url: &str, _item: &ContentItem) -> Option<PathBuf> {
        None
    }
}

/// Checks site-local images against the source tree; never touches the network
pub struct FsProbe {
    config: SiteConfig,
    source_dir: PathBuf,
}

impl FsProbe {
    pub fn new(site: &Site) -> Self {
        Self {
            config: site.config.clone(),
            source_dir: site.source_dir.clone(),
        }
    }

    /// Candidate files for a local URL, most specific first
    fn candidates(&self, media: &LocalMedia, item: &ContentItem) -> Vec<PathBuf> {
        match media {
            LocalMedia::SiteRoot(relative) => vec![self.source_dir.join(relative)],
            LocalMedia::PageRelative(relative) => {
                let mut candidates = Vec::new();
                if self.config.post_asset_folder {
                    candidates.push(item.source.with_extension("").join(relative));
                }
                if let Some(parent) = item.source.parent() {
                    candidates.push(parent.join(relative));
                }
                candidates.push(self.source_dir.join(relative));
                candidates
            }
        }
    }
}

impl Probe for FsProbe {
    fn probe(&self, url: &str, item: &ContentItem) -> ReferenceStatus {
        let url = url.trim();
        if url.is_empty() {
            return ReferenceStatus::Unresolved("empty url".to_string());
        }
        if url.starts_with("data:") {
            return ReferenceStatus::Reachable;
        }
        if is_remote(url) || !self.config.media.check_local {
            return ReferenceStatus::Unchecked;
        }

        let Some(media) = local_media(&self.config, url) else {
            return ReferenceStatus::Unresolved("path leaves the source directory".to_string());
        };
        let candidates = self.candidates(&media, item);

        if candidates.iter().any(|c| c.is_file()) {
            ReferenceStatus::Reachable
        } else {
            let looked_in = candidates
                .first()
                .map(|p| display_relative(p, &self.source_dir))
                .unwrap_or_default();
            ReferenceStatus::Unresolved(format!("file not found: {}", looked_in))
        }
    }

    fn locate(&self, url: &str, item: &ContentItem) -> Option<PathBuf> {
        let media = local_media(&self.config, url)?;
        self.candidates(&media, item)
            .into_iter()
            .find(|c| c.is_file())
    }
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

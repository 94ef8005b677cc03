//! Media reference resolution
//!
//! Finds the images a post embeds and checks, on a best-effort basis, that
//! they can be served. An unreachable image is never an error: it is flagged
//! as [`ReferenceStatus::Unresolved`] and the renderer swaps in a placeholder.

mod probe;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::content::ContentItem;
use crate::render::markdown_options;
use crate::Site;

pub use probe::{FsProbe, Probe};

/// Whether a media reference can be served
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ReferenceStatus {
    /// Found locally, or an inline `data:` URI
    Reachable,
    /// Remote resource; not fetched
    Unchecked,
    /// Known to be missing
    Unresolved(String),
}

impl ReferenceStatus {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ReferenceStatus::Unresolved(_))
    }
}

impl fmt::Display for ReferenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceStatus::Reachable => f.write_str("ok"),
            ReferenceStatus::Unchecked => f.write_str("remote"),
            ReferenceStatus::Unresolved(reason) => write!(f, "missing ({})", reason),
        }
    }
}

/// An image embedded in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaReference {
    /// URL as written in the Markdown
    pub url: String,
    /// Alt text
    pub alt: String,
    /// Optional title attribute
    pub title: Option<String>,
    /// Id of the post the reference was found in
    pub source_id: String,
    pub status: ReferenceStatus,
    /// Local file behind a reachable site-local URL
    #[serde(skip)]
    pub file: Option<PathBuf>,
}

/// Finds media references in posts and probes them
pub struct ReferenceResolver<P = FsProbe> {
    probe: P,
}

impl ReferenceResolver<FsProbe> {
    /// Resolver that checks local files under the site's source directory
    pub fn new(site: &Site) -> Self {
        Self {
            probe: FsProbe::new(site),
        }
    }
}

impl<P: Probe> ReferenceResolver<P> {
    /// Resolver with a custom reachability check
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// All media references in the item's body, in document order
    pub fn resolve(&self, item: &ContentItem) -> Vec<MediaReference> {
        extract_images(&item.body)
            .into_iter()
            .map(|image| {
                let status = self.probe.probe(&image.url, item);
                let file = match &status {
                    ReferenceStatus::Reachable => self.probe.locate(&image.url, item),
                    ReferenceStatus::Unchecked => None,
                    ReferenceStatus::Unresolved(reason) => {
                        tracing::warn!(
                            "Unresolved media reference {:?} in {}: {}",
                            image.url,
                            item.id,
                            reason
                        );
                        None
                    }
                };
                MediaReference {
                    url: image.url,
                    alt: image.alt,
                    title: image.title,
                    source_id: item.id.clone(),
                    status,
                    file,
                }
            })
            .collect()
    }
}

/// An image as written in Markdown, before probing
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageLink {
    pub url: String,
    pub alt: String,
    pub title: Option<String>,
}

/// Collect every image (inline and reference style) from Markdown
pub(crate) fn extract_images(markdown: &str) -> Vec<ImageLink> {
    let mut images = Vec::new();
    let mut current: Option<ImageLink> = None;

    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                current = Some(ImageLink {
                    url: dest_url.trim().to_string(),
                    alt: String::new(),
                    title: (!title.is_empty()).then(|| title.to_string()),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(image) = current.as_mut() {
                    image.alt.push_str(&text);
                }
            }
            Event::End(TagEnd::Image) => {
                if let Some(image) = current.take() {
                    images.push(image);
                }
            }
            _ => {}
        }
    }

    images
}

//! Rendering - turns a post into a complete HTML page
//!
//! Prose goes through pulldown-cmark, fenced code keeps its language tag
//! (optionally highlighted by syntect), and images become `<img>` elements
//! or placeholders depending on how the resolver classified them.

mod fence;
mod highlight;
pub mod layout;
mod markdown;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::content::ContentItem;
use crate::helpers::{full_url_for, permalink_key, url_for};
use crate::resolve::MediaReference;

pub use fence::check_fences;
pub use highlight::Highlighter;
pub use markdown::markdown_options;

use markdown::BodyRenderer;

/// Marker separating the excerpt from the rest of a post
pub const MORE_MARKER: &str = "<!-- more -->";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unterminated code fence {fence:?} opened on line {line}")]
    UnterminatedFence { line: usize, fence: String },
    #[error("highlighting: {0}")]
    Highlight(String),
}

/// Metadata published alongside a rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: String,
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub categories: IndexSet<String>,
    pub tags: IndexSet<String>,
    /// Output key, relative to the public directory
    pub key: String,
    /// Site-relative URL
    pub url: String,
    /// Absolute URL
    pub permalink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// A rendered post, ready to publish
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub meta: PageMeta,
    pub references: Vec<MediaReference>,
    pub code_blocks: usize,
}

impl RenderedPage {
    pub fn unresolved_count(&self) -> usize {
        self.references
            .iter()
            .filter(|r| r.status.is_unresolved())
            .count()
    }
}

/// Renders posts with the site's settings
pub struct Renderer {
    config: SiteConfig,
    highlighter: Option<Highlighter>,
}

impl Renderer {
    /// Create a renderer; loads syntect assets only when highlighting is on
    pub fn new(config: &SiteConfig) -> Result<Self, RenderError> {
        let highlighter = if config.highlight.enable {
            Some(Highlighter::new(
                &config.highlight.theme,
                config.highlight.line_number,
            )?)
        } else {
            None
        };

        Ok(Self {
            config: config.clone(),
            highlighter,
        })
    }

    /// Render a post and its resolved media references
    pub fn render(
        &self,
        item: &ContentItem,
        references: &[MediaReference],
    ) -> Result<RenderedPage, RenderError> {
        check_fences(&item.body)?;

        let body = self.body_renderer(references).render(&item.body);

        let excerpt = split_excerpt(&item.body)
            .map(|excerpt| self.body_renderer(references).render(excerpt).html);

        let key = permalink_key(&self.config, item);
        let meta = PageMeta {
            id: item.id.clone(),
            title: item.title.clone(),
            date: item.date,
            categories: item.categories.clone(),
            tags: item.tags.clone(),
            url: url_for(&self.config, &key),
            permalink: full_url_for(&self.config, &key),
            key,
            excerpt,
        };

        let html = layout::post_page(&self.config, &meta, &body.html);

        tracing::debug!(
            "Rendered {} ({} code blocks, {} media elements)",
            item.id,
            body.code_blocks,
            body.media_elements
        );

        Ok(RenderedPage {
            html,
            meta,
            references: references.to_vec(),
            code_blocks: body.code_blocks,
        })
    }

    fn body_renderer<'a>(&'a self, references: &'a [MediaReference]) -> BodyRenderer<'a> {
        BodyRenderer {
            highlighter: self.highlighter.as_ref(),
            media: &self.config.media,
            references,
        }
    }
}

/// Text before the `<!-- more -->` marker, if the post has one
pub fn split_excerpt(body: &str) -> Option<&str> {
    body.find(MORE_MARKER)
        .map(|pos| body[..pos].trim())
        .filter(|excerpt| !excerpt.is_empty())
}

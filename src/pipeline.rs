//! The publishing pipeline: load, resolve, render, publish
//!
//! Items are processed one at a time. A parse or render failure stops that
//! item only; the rest of the run carries on and the failure is reported.
//! Output of posts that are no longer published is removed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::content::{ContentItem, ContentLoader, LoadError};
use crate::publish::{PublishError, PublishOutcome, Publisher};
use crate::render::{PageMeta, RenderError, Renderer};
use crate::resolve::ReferenceResolver;
use crate::Site;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("{0} is unpublished or excluded by skip_render")]
    Unpublished(String),
}

/// What happened to one published item
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub id: String,
    pub key: String,
    pub outcome: PublishOutcome,
    pub code_blocks: usize,
    pub media: usize,
    pub unresolved: usize,
    pub meta: PageMeta,
}

/// Result of processing the whole site
#[derive(Debug, Default)]
pub struct RunSummary {
    pub published: Vec<ItemReport>,
    /// Items (or files) that could not be processed
    pub failures: Vec<(String, PipelineError)>,
    /// Ids whose output was removed because the source is gone
    pub pruned: Vec<String>,
    pub index: Option<PublishOutcome>,
}

impl RunSummary {
    pub fn count(&self, outcome: PublishOutcome) -> usize {
        self.published
            .iter()
            .filter(|r| r.outcome == outcome)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Wires the loader, resolver, renderer and publisher together for one site
pub struct Pipeline<'a> {
    loader: ContentLoader<'a>,
    resolver: ReferenceResolver,
    renderer: Renderer,
    publisher: Publisher,
}

impl<'a> Pipeline<'a> {
    pub fn new(site: &'a Site) -> Result<Self, PipelineError> {
        Ok(Self {
            loader: ContentLoader::new(site),
            resolver: ReferenceResolver::new(site),
            renderer: Renderer::new(&site.config)?,
            publisher: Publisher::open(site),
        })
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Load and publish one item by id
    ///
    /// Items marked `published: false` or matched by `skip_render` are refused.
    pub fn process(&mut self, id: &str) -> Result<ItemReport, PipelineError> {
        let item = self.loader.load(id)?;
        if !self.loader.is_publishable(&item) {
            return Err(PipelineError::Unpublished(item.id));
        }
        self.process_item(&item)
    }

    /// Resolve, render, and publish an already loaded item
    pub fn process_item(&mut self, item: &ContentItem) -> Result<ItemReport, PipelineError> {
        let references = self.resolver.resolve(item);
        let page = self.renderer.render(item, &references)?;
        let outcome = self.publisher.publish(&page, &item.source)?;

        Ok(ItemReport {
            id: item.id.clone(),
            key: page.meta.key.clone(),
            outcome,
            code_blocks: page.code_blocks,
            media: page.references.len(),
            unresolved: page.unresolved_count(),
            meta: page.meta,
        })
    }

    /// Process every item, prune posts that are gone, and rewrite the home page
    pub fn run_all(&mut self) -> Result<RunSummary, PipelineError> {
        let report = self.loader.load_all()?;
        let mut summary = RunSummary::default();

        // Deleted, unpublished, or skipped posts lose their output. Files that
        // failed to load keep what they last published.
        let live: HashSet<&str> = report.items.iter().map(|i| i.id.as_str()).collect();
        let failed: HashSet<&PathBuf> = report.failures.iter().map(|(path, _)| path).collect();
        summary.pruned = self
            .publisher
            .prune(|id, entry| live.contains(id) || failed.contains(&entry.source))?;

        for (path, error) in report.failures {
            summary
                .failures
                .push((display_path(&path), PipelineError::Load(error)));
        }

        for item in &report.items {
            match self.process_item(item) {
                Ok(item_report) => {
                    if item_report.unresolved > 0 {
                        tracing::warn!(
                            "{}: {} of {} media references unresolved",
                            item_report.id,
                            item_report.unresolved,
                            item_report.media
                        );
                    }
                    summary.published.push(item_report);
                }
                Err(e) => {
                    tracing::error!("Failed to publish {}: {}", item.id, e);
                    summary.failures.push((item.id.clone(), e));
                }
            }
        }

        summary.index = Some(self.refresh_index()?);

        self.publisher.save()?;
        Ok(summary)
    }

    /// Rewrite the home page from everything currently published
    pub fn refresh_index(&self) -> Result<PublishOutcome, PipelineError> {
        let listing = self.publisher.published_meta();
        Ok(self.publisher.publish_index(&listing)?)
    }

    /// Persist the publish manifest
    pub fn finish(&self) -> Result<(), PipelineError> {
        Ok(self.publisher.save()?)
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

//! postpress: a small static publishing pipeline
//!
//! A post is a Markdown file with front-matter. Publishing it runs four
//! stages: the [`content`] loader parses it, the [`resolve`] stage finds the
//! images it embeds, the [`render`] stage turns it into an HTML page, and the
//! [`publish`] stage writes the page and its metadata under a stable key.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod resolve;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Site configuration file name
pub const CONFIG_FILE: &str = "_config.yml";

/// A site on disk
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Open a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site from an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        }
    }

    /// Directory holding published posts
    pub fn posts_dir(&self) -> PathBuf {
        self.source_dir.join("_posts")
    }

    /// Directory holding drafts
    pub fn drafts_dir(&self) -> PathBuf {
        self.source_dir.join("_drafts")
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::init_site(&self.base_dir)
    }

    /// Publish every post
    pub fn generate(&self) -> Result<pipeline::RunSummary> {
        commands::generate::run(self)
    }

    /// Publish a single post by id
    pub fn render_one(&self, id: &str) -> Result<pipeline::ItemReport> {
        commands::render::run(self, id)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, categories: &[String]) -> Result<PathBuf> {
        commands::new::create_post(self, title, categories)
    }
}

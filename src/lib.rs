//! folio-rs: content pipeline for a blog, news, guides and apps site
//!
//! Content lives in one directory per type as markdown files with a
//! front-matter header. This crate validates and renders those files into
//! typed [`content::ContentItem`]s, filters them by draft status and publish
//! date, picks related items, and generates the data files and sitemap
//! consumed by page renderers.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{Collection, ContentKind, GuideRelations, MarkdownRenderer};

/// Name of the site configuration file in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The main site application
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: Arc<config::SiteConfig>,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Curated guide -> posts table
    pub guide_relations: GuideRelations,
    renderer: Arc<MarkdownRenderer>,
}

impl Site {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            config::SiteConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Create a site from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Result<Self> {
        let guide_relations = match &config.related_guides {
            Some(table) => GuideRelations::new(table.clone())?,
            None => GuideRelations::builtin(),
        };

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let renderer = Arc::new(MarkdownRenderer::from_config(&config));

        Ok(Self {
            config: Arc::new(config),
            base_dir,
            content_dir,
            public_dir,
            guide_relations,
            renderer,
        })
    }

    /// The collection holding items of `kind`
    pub fn collection(&self, kind: ContentKind) -> Collection {
        Collection::new(
            kind,
            &self.content_dir,
            self.config.clone(),
            self.renderer.clone(),
        )
    }

    pub fn posts(&self) -> Collection {
        self.collection(ContentKind::Post)
    }

    pub fn guides(&self) -> Collection {
        self.collection(ContentKind::Guide)
    }

    pub fn news(&self) -> Collection {
        self.collection(ContentKind::News)
    }

    pub fn apps(&self) -> Collection {
        self.collection(ContentKind::App)
    }

    /// Generate the data files and sitemap
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

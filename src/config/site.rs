//! Site configuration (_config.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::ContentKind;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// Organization named as JSON-LD publisher; defaults to the title
    pub publisher: Option<String>,
    pub logo: Option<String>,

    // URL
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Collections
    #[serde(default)]
    pub collections: CollectionsConfig,
    pub build_window_days: u32,
    pub excerpt_length: usize,

    // Writing
    #[serde(default)]
    pub highlight: HighlightConfig,
    /// Callout type -> style overrides, merged over the built-in styles
    #[serde(default)]
    pub callouts: IndexMap<String, CalloutStyle>,
    /// Guide slug -> six related post slugs, replaces the built-in table
    #[serde(default)]
    pub related_guides: Option<IndexMap<String, Vec<String>>>,

    // Sitemap
    #[serde(default)]
    pub static_pages: Vec<StaticPage>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            publisher: None,
            logo: None,

            url: "http://example.com".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            collections: CollectionsConfig::default(),
            build_window_days: 30,
            excerpt_length: 160,

            highlight: HighlightConfig::default(),
            callouts: IndexMap::new(),
            related_guides: None,

            static_pages: default_static_pages(),
            extra: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Directory and URL prefix for a content kind
    pub fn collection(&self, kind: ContentKind) -> &CollectionConfig {
        match kind {
            ContentKind::Post => &self.collections.posts,
            ContentKind::Guide => &self.collections.guides,
            ContentKind::News => &self.collections.news,
            ContentKind::App => &self.collections.apps,
        }
    }

    /// Publisher name for structured data
    pub fn publisher_name(&self) -> &str {
        self.publisher.as_deref().unwrap_or(&self.title)
    }
}

/// Per-kind collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    pub posts: CollectionConfig,
    pub guides: CollectionConfig,
    pub news: CollectionConfig,
    pub apps: CollectionConfig,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            posts: CollectionConfig::new("posts", "tips"),
            guides: CollectionConfig::new("guides", "guides"),
            news: CollectionConfig::new("news", "news"),
            apps: CollectionConfig::new("apps", "apps"),
        }
    }
}

/// Where a collection lives on disk and under which URL prefix it is served
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Directory relative to `content_dir`
    pub dir: String,
    /// URL path segment, e.g. `tips` for `https://site/tips/{slug}`
    pub path_prefix: String,
}

impl CollectionConfig {
    pub fn new(dir: &str, path_prefix: &str) -> Self {
        Self {
            dir: dir.to_string(),
            path_prefix: path_prefix.to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Styling applied to one callout type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutStyle {
    pub class: String,
    pub icon: String,
}

impl CalloutStyle {
    pub fn new(class: &str, icon: &str) -> Self {
        Self {
            class: class.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// A page outside the content collections that still belongs in the sitemap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPage {
    pub path: String,
    #[serde(default = "default_changefreq")]
    pub changefreq: String,
    #[serde(default = "default_static_priority")]
    pub priority: f32,
}

fn default_changefreq() -> String {
    "monthly".to_string()
}

fn default_static_priority() -> f32 {
    0.5
}

fn default_static_pages() -> Vec<StaticPage> {
    ["about", "support", "privacy", "terms"]
        .iter()
        .map(|path| StaticPage {
            path: path.to_string(),
            changefreq: default_changefreq(),
            priority: if *path == "about" { 0.6 } else { 0.3 },
        })
        .collect()
}

//! Content item model

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::frontmatter::string_or_vec;
use super::{ContentKind, FrontMatter};

/// Metadata of a loaded item: validated front-matter plus derived fields
#[derive(Debug, Clone, Serialize)]
pub struct ItemMetadata {
    /// File name without extension
    pub slug: String,

    pub kind: ContentKind,

    #[serde(flatten)]
    pub front_matter: FrontMatter,

    /// JSON-LD object for the item page
    #[serde(rename = "structuredData")]
    pub structured_data: serde_json::Value,
}

/// A content item, built fresh on every read
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    pub metadata: ItemMetadata,

    /// Raw markdown body, front-matter removed
    pub content: String,

    /// Rendered HTML body
    pub html: String,

    /// Plain-text summary of the body
    pub excerpt: String,

    /// Full source file path
    #[serde(skip)]
    pub source: PathBuf,
}

impl ContentItem {
    pub fn slug(&self) -> &str {
        &self.metadata.slug
    }

    pub fn title(&self) -> &str {
        &self.metadata.front_matter.title
    }

    pub fn date(&self) -> NaiveDate {
        self.metadata.front_matter.date
    }

    pub fn tags(&self) -> &[String] {
        &self.metadata.front_matter.tags
    }

    pub fn is_draft(&self) -> bool {
        self.metadata.front_matter.draft
    }

    pub fn canonical(&self) -> &str {
        &self.metadata.front_matter.canonical
    }

    /// Whether both items share at least one tag
    pub fn shares_tag_with(&self, other: &ContentItem) -> bool {
        self.tags().iter().any(|tag| other.tags().contains(tag))
    }

    /// App-specific fields, for items of the apps collection
    pub fn app_details(&self) -> Option<AppDetails> {
        if self.metadata.kind != ContentKind::App {
            return None;
        }
        match AppDetails::from_extra(&self.metadata.front_matter.extra) {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::warn!("Invalid app fields in {}: {}", self.slug(), e);
                None
            }
        }
    }
}

/// Typed view over the extra front-matter fields of an app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppDetails {
    pub category: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub features: Vec<String>,
    pub app_store_url: Option<String>,
    pub website_url: Option<String>,
}

impl AppDetails {
    pub fn from_extra(
        extra: &IndexMap<String, serde_yaml::Value>,
    ) -> Result<Self, serde_yaml::Error> {
        let mapping = extra
            .iter()
            .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.clone()))
            .collect::<serde_yaml::Mapping>();
        serde_yaml::from_value(serde_yaml::Value::Mapping(mapping))
    }
}

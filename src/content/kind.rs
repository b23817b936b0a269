//! Content types and their per-type settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::collection::LoadPolicy;
use super::structured_data::SchemaSpec;

/// The four content collections of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Guide,
    News,
    App,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Post,
        ContentKind::Guide,
        ContentKind::News,
        ContentKind::App,
    ];

    /// Plural name, used for output directories and CLI listings
    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Guide => "guides",
            ContentKind::News => "news",
            ContentKind::App => "apps",
        }
    }

    pub fn schema(self) -> SchemaSpec {
        match self {
            ContentKind::Post => SchemaSpec {
                schema_type: "BlogPosting",
                title_property: "headline",
                extras: &[],
                field_map: &[],
            },
            ContentKind::Guide => SchemaSpec {
                schema_type: "Article",
                title_property: "headline",
                extras: &[("articleSection", "Guides")],
                field_map: &[],
            },
            ContentKind::News => SchemaSpec {
                schema_type: "NewsArticle",
                title_property: "headline",
                extras: &[],
                field_map: &[],
            },
            ContentKind::App => SchemaSpec {
                schema_type: "SoftwareApplication",
                title_property: "name",
                extras: &[],
                field_map: &[
                    ("category", "applicationCategory"),
                    ("platform", "operatingSystem"),
                ],
            },
        }
    }

    /// How `load_all` filters this type.
    ///
    /// Apps are evergreen: no build window, and one broken file does not
    /// take the whole listing down.
    pub fn policy(self, build_window_days: u32) -> LoadPolicy {
        match self {
            ContentKind::App => LoadPolicy {
                build_window_days: None,
                skip_failed_items: true,
            },
            _ => LoadPolicy {
                build_window_days: Some(build_window_days),
                skip_failed_items: false,
            },
        }
    }

    /// Whether items of this type get tag-based related items
    pub fn has_tag_relations(self) -> bool {
        matches!(self, ContentKind::Post | ContentKind::News)
    }

    /// Sitemap change frequency and priority for items of this type
    pub fn sitemap_hints(self) -> (&'static str, f32) {
        match self {
            ContentKind::Post => ("weekly", 0.7),
            ContentKind::Guide => ("monthly", 0.8),
            ContentKind::News => ("daily", 0.6),
            ContentKind::App => ("monthly", 0.7),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "post" | "posts" => Ok(ContentKind::Post),
            "guide" | "guides" => Ok(ContentKind::Guide),
            "news" => Ok(ContentKind::News),
            "app" | "apps" => Ok(ContentKind::App),
            other => anyhow::bail!(
                "Unknown content type: {}. Available: posts, guides, news, apps",
                other
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("posts".parse::<ContentKind>().unwrap(), ContentKind::Post);
        assert_eq!("App".parse::<ContentKind>().unwrap(), ContentKind::App);
        assert!("pages".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_apps_are_evergreen() {
        let apps = ContentKind::App.policy(30);
        assert_eq!(apps.build_window_days, None);
        assert!(apps.skip_failed_items);

        let news = ContentKind::News.policy(30);
        assert_eq!(news.build_window_days, Some(30));
        assert!(!news.skip_failed_items);
    }
}

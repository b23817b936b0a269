//! Generator module - writes the sitemap, search index and content data files

pub mod sitemap;

use anyhow::Result;
use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::content::{related, ContentItem, ContentKind};
use crate::helpers::{canonical_url, iso_date};
use crate::Site;

/// Published items of every collection, newest first within each
#[derive(Debug, Clone, Default)]
pub struct PublishedContent {
    collections: IndexMap<ContentKind, Vec<ContentItem>>,
}

impl PublishedContent {
    /// Load all four collections concurrently
    pub async fn load(site: &Site) -> Result<Self> {
        let (posts, guides, news, apps) = (site.posts(), site.guides(), site.news(), site.apps());
        let (posts, guides, news, apps) = tokio::try_join!(
            posts.load_all(),
            guides.load_all(),
            news.load_all(),
            apps.load_all(),
        )?;

        let mut content = Self::default();
        content.insert(ContentKind::Post, posts);
        content.insert(ContentKind::Guide, guides);
        content.insert(ContentKind::News, news);
        content.insert(ContentKind::App, apps);
        Ok(content)
    }

    pub fn insert(&mut self, kind: ContentKind, items: Vec<ContentItem>) {
        self.collections.insert(kind, items);
    }

    pub fn items(&self, kind: ContentKind) -> &[ContentItem] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContentKind, &[ContentItem])> {
        self.collections
            .iter()
            .map(|(kind, items)| (*kind, items.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }
}

/// Listing entry for an item
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub slug: String,
    pub kind: ContentKind,
    pub title: String,
    pub description: String,
    pub date: String,
    pub url: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub reading_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl ItemSummary {
    pub fn new(item: &ContentItem, url: String) -> Self {
        let fm = &item.metadata.front_matter;
        Self {
            slug: item.slug().to_string(),
            kind: item.metadata.kind,
            title: fm.title.clone(),
            description: fm.description.clone(),
            date: iso_date(&fm.date),
            url,
            tags: fm.tags.clone(),
            excerpt: item.excerpt.clone(),
            reading_time: fm.reading_time,
            cover_image: fm.cover_image.clone(),
        }
    }
}

/// Full data file for one item page
#[derive(Debug, Serialize)]
struct ItemPage<'a> {
    #[serde(flatten)]
    item: &'a ContentItem,
    url: String,
    related: Vec<ItemSummary>,
}

/// Static data generator
pub struct Generator {
    site: Site,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Self {
        Self { site: site.clone() }
    }

    /// Write every output file for `content` into the public directory
    pub fn generate(&self, content: &PublishedContent) -> Result<()> {
        fs::create_dir_all(&self.site.public_dir)?;

        self.generate_sitemap(content)?;
        self.generate_search_index(content)?;

        for (kind, items) in content.iter() {
            self.generate_collection_data(kind, items, content)?;
        }

        Ok(())
    }

    fn url_for(&self, item: &ContentItem) -> String {
        let prefix = &self.site.config.collection(item.metadata.kind).path_prefix;
        canonical_url(&self.site.config.url, prefix, item.slug())
    }

    fn summary(&self, item: &ContentItem) -> ItemSummary {
        ItemSummary::new(item, self.url_for(item))
    }

    /// Generate sitemap.xml
    fn generate_sitemap(&self, content: &PublishedContent) -> Result<()> {
        let entries = sitemap::entries(&self.site.config, content, Utc::now());
        let xml = sitemap::render(&entries);

        let output_path = self.site.public_dir.join("sitemap.xml");
        fs::write(&output_path, xml)?;
        tracing::info!("Generated sitemap.xml with {} URLs", entries.len());

        Ok(())
    }

    /// Generate search index (JSON)
    fn generate_search_index(&self, content: &PublishedContent) -> Result<()> {
        let search_data: Vec<serde_json::Value> = content
            .iter()
            .flat_map(|(_, items)| items.iter())
            .map(|item| {
                serde_json::json!({
                    "title": item.title(),
                    "kind": item.metadata.kind,
                    "url": self.url_for(item),
                    "content": item.excerpt,
                    "tags": item.tags(),
                    "date": iso_date(&item.date()),
                })
            })
            .collect();

        let output_path = self.site.public_dir.join("search.json");
        let json = serde_json::to_string_pretty(&search_data)?;
        fs::write(&output_path, json)?;
        tracing::info!("Generated search.json");

        Ok(())
    }

    /// Generate data/{kind}/index.json and one data/{kind}/{slug}.json per item
    fn generate_collection_data(
        &self,
        kind: ContentKind,
        items: &[ContentItem],
        content: &PublishedContent,
    ) -> Result<()> {
        let dir = self.site.public_dir.join("data").join(kind.name());
        fs::create_dir_all(&dir)?;

        let index: Vec<ItemSummary> = items.iter().map(|item| self.summary(item)).collect();
        write_json(&dir.join("index.json"), &index)?;

        for item in items {
            let related = self.related_summaries(item, items, content);
            let page = ItemPage {
                item,
                url: self.url_for(item),
                related,
            };
            write_json(&dir.join(format!("{}.json", item.slug())), &page)?;
        }

        tracing::info!("Generated {} {} data files", items.len(), kind);
        Ok(())
    }

    fn related_summaries(
        &self,
        item: &ContentItem,
        items: &[ContentItem],
        content: &PublishedContent,
    ) -> Vec<ItemSummary> {
        match item.metadata.kind {
            kind if kind.has_tag_relations() => {
                related::related_items(item, items, related::RELATED_LIMIT)
                    .into_iter()
                    .map(|r| self.summary(r))
                    .collect()
            }
            ContentKind::Guide => self
                .site
                .guide_relations
                .select(item.slug(), content.items(ContentKind::Post))
                .into_iter()
                .map(|r| self.summary(r))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::collection::tests::write_item;
    use tempfile::TempDir;

    fn site(root: &Path) -> Site {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..SiteConfig::default()
        };
        Site::with_config(root.to_path_buf(), config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_writes_outputs() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("content/posts");
        write_item(&posts, "first", "2024-01-01", &["rust"], "");
        write_item(&posts, "second", "2024-02-01", &["rust"], "");
        write_item(&posts, "third", "2024-03-01", &[], "");
        write_item(&posts, "draft", "2024-03-01", &[], "draft: true\n");

        let site = site(tmp.path());
        let content = PublishedContent::load(&site).await.unwrap();
        assert_eq!(content.total(), 3);
        assert!(content.items(ContentKind::News).is_empty());

        Generator::new(&site).generate(&content).unwrap();

        let public = tmp.path().join("public");
        let sitemap = fs::read_to_string(public.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/tips/first</loc>"));
        assert!(!sitemap.contains("/tips/draft<"));

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(public.join("data/posts/index.json")).unwrap())
                .unwrap();
        let slugs: Vec<_> = index
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["third", "second", "first"]);

        let page: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(public.join("data/posts/first.json")).unwrap())
                .unwrap();
        assert_eq!(page["url"], "https://example.com/tips/first");
        assert_eq!(page["metadata"]["title"], "first");
        assert_eq!(page["related"][0]["slug"], "second");
        assert_eq!(page["related"].as_array().unwrap().len(), 2);

        assert!(public.join("search.json").exists());
        assert!(public.join("data/apps/index.json").exists());
    }

    #[tokio::test]
    async fn test_guide_related_skips_unpublished_posts() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("content/posts");
        let slugs = ["p1", "p2", "p3", "p4", "p5", "p6"];
        for slug in &slugs[..4] {
            write_item(&posts, slug, "2024-01-01", &[], "");
        }
        write_item(&posts, "p5", "2999-01-01", &[], "");
        write_item(&posts, "p6", "2024-01-01", &[], "draft: true\n");
        write_item(&tmp.path().join("content/guides"), "focus", "2024-02-01", &[], "");

        let mut table = IndexMap::new();
        table.insert(
            "focus".to_string(),
            slugs.iter().map(|s| s.to_string()).collect(),
        );
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            related_guides: Some(table),
            ..SiteConfig::default()
        };
        let site = Site::with_config(tmp.path().to_path_buf(), config).unwrap();

        let content = PublishedContent::load(&site).await.unwrap();
        Generator::new(&site).generate(&content).unwrap();

        let public = tmp.path().join("public");
        let page: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(public.join("data/guides/focus.json")).unwrap())
                .unwrap();
        let related: Vec<_> = page["related"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["slug"].as_str().unwrap())
            .collect();
        assert_eq!(related, vec!["p1", "p2", "p3", "p4"]);
        assert!(!public.join("data/posts/p6.json").exists());
    }
}

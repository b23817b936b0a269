//! sitemap.xml generation

use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use super::PublishedContent;
use crate::config::SiteConfig;
use crate::content::ContentItem;
use crate::helpers::{canonical_url, date_xml, escape_xml, full_url_for, start_of_day_utc};

/// One `<url>` element
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: DateTime<Utc>,
    pub changefreq: String,
    pub priority: f32,
}

impl SitemapEntry {
    fn new(loc: String, lastmod: DateTime<Utc>, changefreq: &str, priority: f32) -> Self {
        Self {
            loc,
            lastmod,
            changefreq: changefreq.to_string(),
            priority,
        }
    }
}

/// Every published URL of the site: home, static pages, collection
/// indexes and items
pub fn entries(
    config: &SiteConfig,
    content: &PublishedContent,
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let mut entries = vec![SitemapEntry::new(
        full_url_for(config, ""),
        now,
        "daily",
        1.0,
    )];

    for page in &config.static_pages {
        entries.push(SitemapEntry::new(
            full_url_for(config, &page.path),
            now,
            &page.changefreq,
            page.priority,
        ));
    }

    for (kind, items) in content.iter() {
        let prefix = &config.collection(kind).path_prefix;
        let (changefreq, priority) = kind.sitemap_hints();

        let item_entries: Vec<SitemapEntry> = items
            .iter()
            .map(|item| {
                SitemapEntry::new(
                    canonical_url(&config.url, prefix, item.slug()),
                    last_modified(item),
                    changefreq,
                    priority,
                )
            })
            .collect();

        let index_lastmod = item_entries
            .iter()
            .map(|e| e.lastmod)
            .max()
            .unwrap_or(now);
        entries.push(SitemapEntry::new(
            full_url_for(config, prefix),
            index_lastmod,
            "daily",
            0.8,
        ));
        entries.extend(item_entries);
    }

    entries
}

/// File modification time, or the publish date when the file cannot be stat'd
pub fn last_modified(item: &ContentItem) -> DateTime<Utc> {
    file_mtime(&item.source).unwrap_or_else(|| start_of_day_utc(&item.date()))
}

fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Render entries as a sitemaps.org 0.9 document
pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            date_xml(&entry.lastmod)
        ));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            escape_xml(&entry.changefreq)
        ));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

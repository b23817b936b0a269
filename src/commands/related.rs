//! Show the related items picked for one item

use anyhow::Result;

use crate::content::{related, ContentItem, ContentKind};
use crate::Site;

/// Related items for `slug` of `kind`.
///
/// Posts and news use tag overlap against their published collection;
/// guides use the published posts listed in the curated guide table;
/// apps have no relations.
pub async fn find(site: &Site, kind: ContentKind, slug: &str) -> Result<Vec<ContentItem>> {
    match kind {
        ContentKind::Guide => {
            let posts = site.posts().load_all().await?;
            Ok(site
                .guide_relations
                .select(slug, &posts)
                .into_iter()
                .cloned()
                .collect())
        }
        kind if kind.has_tag_relations() => {
            let collection = site.collection(kind);
            let current = collection.load_by_slug(slug)?;
            let items = collection.load_all().await?;
            Ok(related::related_items(&current, &items, related::RELATED_LIMIT)
                .into_iter()
                .cloned()
                .collect())
        }
        _ => Ok(Vec::new()),
    }
}

/// Run the related command
pub async fn run(site: &Site, kind: ContentKind, slug: &str) -> Result<()> {
    let items = find(site, kind, slug).await?;
    if items.is_empty() {
        println!("No related items for {} {}", kind, slug);
        return Ok(());
    }

    println!("Related to {} ({}):", slug, items.len());
    for item in items {
        println!(
            "  {} - {} [{}]",
            item.date().format("%Y-%m-%d"),
            item.title(),
            item.tags().join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::collection::tests::write_item;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_related_posts_by_tag() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("content/posts");
        write_item(&posts, "current", "2024-01-10", &["focus"], "");
        write_item(&posts, "match", "2024-01-01", &["focus"], "");
        write_item(&posts, "newest", "2024-02-01", &["other"], "");
        write_item(&posts, "middle", "2024-01-05", &[], "");
        write_item(&posts, "oldest", "2023-01-01", &[], "");

        let site = Site::new(tmp.path()).unwrap();
        let related = find(&site, ContentKind::Post, "current").await.unwrap();
        let slugs: Vec<_> = related.iter().map(|i| i.slug()).collect();
        assert_eq!(slugs, vec!["match", "newest", "middle"]);
    }

    #[tokio::test]
    async fn test_related_posts_for_guide() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("content/posts");
        let slugs = ["p1", "p2", "p3", "p4", "p5", "p6"];
        for slug in &slugs[..4] {
            write_item(&posts, slug, "2024-01-01", &[], "");
        }

        let mut table = IndexMap::new();
        table.insert(
            "focus-guide".to_string(),
            slugs.iter().map(|s| s.to_string()).collect(),
        );
        let config = SiteConfig {
            related_guides: Some(table),
            ..SiteConfig::default()
        };
        let site = Site::with_config(tmp.path().to_path_buf(), config).unwrap();

        let related = find(&site, ContentKind::Guide, "focus-guide").await.unwrap();
        assert_eq!(related.len(), 4);
        assert!(find(&site, ContentKind::Guide, "unknown").await.unwrap().is_empty());
        assert!(find(&site, ContentKind::App, "anything").await.unwrap().is_empty());
    }
}

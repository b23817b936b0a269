//! List site content

use anyhow::Result;
use indexmap::IndexMap;

use crate::content::{ContentItem, ContentKind};
use crate::Site;

/// Count tags across `items`, most used first
pub fn tag_counts<'a>(items: impl IntoIterator<Item = &'a ContentItem>) -> Vec<(String, usize)> {
    let mut tags: IndexMap<String, usize> = IndexMap::new();
    for item in items {
        for tag in item.tags() {
            *tags.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    let mut tags: Vec<_> = tags.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1));
    tags
}

/// List published content by type, or tag usage with `tags`
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    match content_type {
        "tag" | "tags" => {
            let (posts, news) = (site.posts(), site.news());
            let (posts, news) = tokio::try_join!(posts.load_all(), news.load_all())?;
            let tags = tag_counts(posts.iter().chain(news.iter()));
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        other => {
            let kind: ContentKind = other.parse()?;
            let collection = site.collection(kind);
            let items = collection.load_all().await?;
            println!("{} ({}):", kind, items.len());
            for item in items {
                println!(
                    "  {} - {} [{}]",
                    item.date().format("%Y-%m-%d"),
                    item.title(),
                    collection.url_for(item.slug())
                );
            }
        }
    }

    Ok(())
}

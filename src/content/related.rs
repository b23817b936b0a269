//! Related-content selection
//!
//! Posts and news pick companions by shared tags, topping up with the newest
//! remaining items. Guides use a hand-curated table of six posts each.

use indexmap::IndexMap;

use super::error::ConfigError;
use super::ContentItem;

/// Number of related items shown under a post or news item
pub const RELATED_LIMIT: usize = 3;

/// Number of posts every guide entry must list
pub const GUIDE_RELATED_COUNT: usize = 6;

/// Pick up to `limit` items related to `current` from `collection`.
///
/// Items sharing a tag come first, in collection order. Remaining slots are
/// filled with the newest other items. `current` is never included and no
/// item appears twice.
pub fn related_items<'a>(
    current: &ContentItem,
    collection: &'a [ContentItem],
    limit: usize,
) -> Vec<&'a ContentItem> {
    let others: Vec<&ContentItem> = collection
        .iter()
        .filter(|item| item.slug() != current.slug())
        .collect();

    let mut related: Vec<&ContentItem> = others
        .iter()
        .copied()
        .filter(|item| item.shares_tag_with(current))
        .take(limit)
        .collect();

    if related.len() < limit {
        let mut rest: Vec<&ContentItem> = others
            .iter()
            .copied()
            .filter(|item| !related.iter().any(|r| r.slug() == item.slug()))
            .collect();
        rest.sort_by(|a, b| b.date().cmp(&a.date()));

        let missing = limit - related.len();
        related.extend(rest.into_iter().take(missing));
    }

    related.truncate(limit);
    related
}

/// Guide slug -> related post slugs
#[derive(Debug, Clone, PartialEq)]
pub struct GuideRelations {
    table: IndexMap<String, Vec<String>>,
}

impl GuideRelations {
    /// Build a table, requiring exactly six posts per guide
    pub fn new(table: IndexMap<String, Vec<String>>) -> Result<Self, ConfigError> {
        for (guide, posts) in &table {
            if posts.len() != GUIDE_RELATED_COUNT {
                return Err(ConfigError::RelatedCount {
                    guide: guide.clone(),
                    count: posts.len(),
                    expected: GUIDE_RELATED_COUNT,
                });
            }
        }
        Ok(Self { table })
    }

    /// The curated table shipped with the site
    pub fn builtin() -> Self {
        let entries: [(&str, [&str; GUIDE_RELATED_COUNT]); 3] = [
            (
                "productivity-and-wellness-mastery",
                [
                    "morning-routine-for-deep-work",
                    "pomodoro-technique-explained",
                    "digital-detox-weekend-plan",
                    "standing-desk-habits",
                    "mindful-breaks-at-work",
                    "sleep-hygiene-for-knowledge-workers",
                ],
            ),
            (
                "remote-work-complete-guide",
                [
                    "home-office-setup-essentials",
                    "async-communication-tips",
                    "video-call-etiquette",
                    "managing-time-zones",
                    "avoiding-remote-burnout",
                    "remote-team-rituals",
                ],
            ),
            (
                "personal-finance-fundamentals",
                [
                    "budgeting-with-the-50-30-20-rule",
                    "building-an-emergency-fund",
                    "automating-your-savings",
                    "understanding-index-funds",
                    "paying-down-debt-faster",
                    "subscription-audit-checklist",
                ],
            ),
        ];

        let table = entries
            .iter()
            .map(|(guide, posts)| {
                (
                    guide.to_string(),
                    posts.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();
        Self { table }
    }

    /// Post slugs listed for `guide_slug`, or an empty slice
    pub fn related_posts_for_guide(&self, guide_slug: &str) -> &[String] {
        self.table
            .get(guide_slug)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Guides with an entry in the table
    pub fn guides(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// The listed posts found among `published`, in table order.
    /// Slugs that are missing, drafts or not yet published are dropped.
    pub fn select<'a>(
        &self,
        guide_slug: &str,
        published: &'a [ContentItem],
    ) -> Vec<&'a ContentItem> {
        self.related_posts_for_guide(guide_slug)
            .iter()
            .filter_map(|slug| {
                let found = published.iter().find(|item| item.slug() == slug.as_str());
                if found.is_none() {
                    tracing::warn!(
                        "Dropping related post {} of guide {}: not published",
                        slug,
                        guide_slug
                    );
                }
                found
            })
            .collect()
    }
}

impl Default for GuideRelations {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::collection::tests::{collection, write_item};
    use crate::content::ContentKind;
    use std::collections::HashSet;
    use tempfile::TempDir;

    /// Items loaded from disk in the given (slug, date, tags) order
    fn items(specs: &[(&str, &str, &[&str])]) -> Vec<ContentItem> {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        for (slug, date, tags) in specs {
            write_item(&posts, slug, date, tags, "");
        }
        let c = collection(tmp.path(), ContentKind::Post);
        specs
            .iter()
            .map(|(slug, _, _)| c.load_by_slug(slug).unwrap())
            .collect()
    }

    fn slugs(items: &[&ContentItem]) -> Vec<String> {
        items.iter().map(|i| i.slug().to_string()).collect()
    }

    #[test]
    fn test_tag_matches_first_then_newest() {
        let all = items(&[
            ("current", "2024-05-01", &["rust"]),
            ("newest", "2024-06-01", &["cooking"]),
            ("match-a", "2024-01-01", &["rust", "web"]),
            ("middle", "2024-04-01", &[]),
            ("oldest", "2023-01-01", &["garden"]),
        ]);

        let related = related_items(&all[0], &all, RELATED_LIMIT);
        assert_eq!(slugs(&related), vec!["match-a", "newest", "middle"]);
    }

    #[test]
    fn test_tag_matches_keep_collection_order() {
        let all = items(&[
            ("m1", "2024-01-01", &["x"]),
            ("current", "2024-05-01", &["x"]),
            ("m2", "2024-03-01", &["x"]),
            ("m3", "2024-02-01", &["x"]),
            ("m4", "2024-06-01", &["x"]),
        ]);

        let related = related_items(&all[1], &all, RELATED_LIMIT);
        assert_eq!(slugs(&related), vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_related_invariants() {
        let all = items(&[
            ("a", "2024-01-01", &["x"]),
            ("b", "2024-02-01", &["y"]),
            ("c", "2024-03-01", &["x", "y"]),
            ("d", "2024-04-01", &[]),
            ("e", "2024-05-01", &["z"]),
        ]);

        for item in &all {
            let related = related_items(item, &all, RELATED_LIMIT);
            assert_eq!(related.len(), 3);
            assert!(related.iter().all(|r| r.slug() != item.slug()));
            let unique: HashSet<_> = related.iter().map(|r| r.slug()).collect();
            assert_eq!(unique.len(), related.len());
        }
    }

    #[test]
    fn test_small_collections() {
        let all = items(&[
            ("a", "2024-01-01", &["x"]),
            ("b", "2024-02-01", &[]),
            ("c", "2024-03-01", &[]),
        ]);
        for n in 1..=3 {
            let subset = &all[..n];
            assert_eq!(related_items(&subset[0], subset, RELATED_LIMIT).len(), n - 1);
        }
    }

    #[test]
    fn test_builtin_guide_table() {
        let relations = GuideRelations::builtin();
        assert_eq!(
            relations.related_posts_for_guide("productivity-and-wellness-mastery"),
            [
                "morning-routine-for-deep-work",
                "pomodoro-technique-explained",
                "digital-detox-weekend-plan",
                "standing-desk-habits",
                "mindful-breaks-at-work",
                "sleep-hygiene-for-knowledge-workers",
            ]
        );
        assert!(relations.related_posts_for_guide("unknown-guide").is_empty());
        assert!(relations
            .guides()
            .all(|g| relations.related_posts_for_guide(g).len() == GUIDE_RELATED_COUNT));
    }

    #[test]
    fn test_table_requires_six_posts() {
        let mut table = IndexMap::new();
        table.insert("short".to_string(), vec!["a".to_string()]);
        assert_eq!(
            GuideRelations::new(table),
            Err(ConfigError::RelatedCount {
                guide: "short".to_string(),
                count: 1,
                expected: 6,
            })
        );
    }

    #[tokio::test]
    async fn test_select_keeps_only_published_posts() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        write_item(&posts, "p1", "2024-01-01", &[], "");
        write_item(&posts, "p3", "2024-03-01", &[], "");
        write_item(&posts, "p4", "2024-01-01", &[], "draft: true\n");
        write_item(&posts, "p5", "2999-01-01", &[], "");

        let mut table = IndexMap::new();
        table.insert(
            "g".to_string(),
            ["p1", "p2", "p3", "p4", "p5", "p6"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let relations = GuideRelations::new(table).unwrap();

        let published = collection(tmp.path(), ContentKind::Post)
            .load_all()
            .await
            .unwrap();
        assert_eq!(published.len(), 2);

        let selected = relations.select("g", &published);
        let slugs: Vec<_> = selected.iter().map(|i| i.slug()).collect();
        assert_eq!(slugs, vec!["p1", "p3"]);
        assert!(relations.select("unknown", &published).is_empty());
    }
}

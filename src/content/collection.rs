//! Content collections - list, load and filter the items of one content type

use chrono::{Days, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use super::error::{ContentError, Result};
use super::structured_data::{self, SchemaSpec};
use super::{ContentItem, ContentKind, FrontMatter, ItemMetadata, MarkdownRenderer};
use crate::config::SiteConfig;
use crate::helpers::{canonical_url, is_absolute_url, today_utc};

/// Filtering rules applied by [`Collection::load_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
    /// Items dated further than this many days ahead are not generated
    pub build_window_days: Option<u32>,
    /// Log and skip items that fail to load instead of failing the listing
    pub skip_failed_items: bool,
}

/// One content directory and the rules for turning its files into items
#[derive(Clone)]
pub struct Collection {
    kind: ContentKind,
    directory: PathBuf,
    path_prefix: String,
    schema: SchemaSpec,
    policy: LoadPolicy,
    config: Arc<SiteConfig>,
    renderer: Arc<MarkdownRenderer>,
}

impl Collection {
    /// Collection for `kind` as laid out in the site configuration
    pub fn new(
        kind: ContentKind,
        content_dir: &Path,
        config: Arc<SiteConfig>,
        renderer: Arc<MarkdownRenderer>,
    ) -> Self {
        let settings = config.collection(kind);
        Self {
            kind,
            directory: content_dir.join(&settings.dir),
            path_prefix: settings.path_prefix.clone(),
            schema: kind.schema(),
            policy: kind.policy(config.build_window_days),
            config,
            renderer,
        }
    }

    /// Override the filtering rules
    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Canonical URL an item with `slug` is expected to declare
    pub fn url_for(&self, slug: &str) -> String {
        canonical_url(&self.config.url, &self.path_prefix, slug)
    }

    /// Slugs of every content file in the directory, sorted.
    /// A missing directory yields an empty list.
    pub fn list_slugs(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Cannot read {} directory {:?}: {}",
                    self.kind,
                    self.directory,
                    e
                );
                return Vec::new();
            }
        };

        let mut slugs: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_markdown_file(p))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();

        slugs.sort();
        slugs.dedup();
        slugs
    }

    /// Source file for `slug`
    pub fn path_for(&self, slug: &str) -> PathBuf {
        let md = self.directory.join(format!("{}.md", slug));
        if md.exists() {
            return md;
        }
        let markdown = self.directory.join(format!("{}.markdown", slug));
        if markdown.exists() {
            markdown
        } else {
            md
        }
    }

    /// Load a single item. Fails if the file is missing or its
    /// front-matter does not validate.
    pub fn load_by_slug(&self, slug: &str) -> Result<ContentItem> {
        let path = self.path_for(slug);
        let raw = fs::read_to_string(&path).map_err(|e| ContentError::io(&path, e))?;
        let (front_matter, body) = FrontMatter::parse(&raw)?;

        self.check_canonical(slug, &front_matter.canonical);

        let rendered = self.renderer.convert(body);
        let structured_data = structured_data::build(&self.schema, &front_matter, &self.config);

        tracing::debug!("Loaded {} {}", self.kind, slug);

        Ok(ContentItem {
            metadata: ItemMetadata {
                slug: slug.to_string(),
                kind: self.kind,
                front_matter,
                structured_data,
            },
            content: body.to_string(),
            html: rendered.html,
            excerpt: rendered.excerpt,
            source: path,
        })
    }

    /// Published items as of today (UTC), newest first
    pub async fn load_all(&self) -> Result<Vec<ContentItem>> {
        self.load_all_as_of(today_utc()).await
    }

    /// Published items as of `today`, newest first.
    ///
    /// Every file is loaded on its own blocking task; filtering and sorting
    /// happen once all loads have joined.
    pub async fn load_all_as_of(&self, today: NaiveDate) -> Result<Vec<ContentItem>> {
        let slugs = self.list_slugs();
        let mut tasks = JoinSet::new();

        for (index, slug) in slugs.into_iter().enumerate() {
            let collection = self.clone();
            tasks.spawn_blocking(move || {
                let result = collection.load_by_slug(&slug);
                (index, slug, result)
            });
        }

        let mut loaded = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (index, slug, result) = joined?;
            match result {
                Ok(item) => loaded.push((index, item)),
                Err(e) if self.policy.skip_failed_items => {
                    tracing::warn!("Skipping {} {}: {}", self.kind, slug, e);
                }
                Err(e) => {
                    tracing::error!("Failed to load {} {}: {}", self.kind, slug, e);
                    return Err(e);
                }
            }
        }

        // Directory order, so equal dates keep a stable order
        loaded.sort_by_key(|(index, _)| *index);
        let items = loaded.into_iter().map(|(_, item)| item).collect();

        let mut items = filter_published(items, today, self.policy.build_window_days);
        sort_by_date_desc(&mut items);

        tracing::debug!("Loaded {} published {}", items.len(), self.kind);
        Ok(items)
    }

    fn check_canonical(&self, slug: &str, canonical: &str) {
        if !is_absolute_url(canonical) {
            tracing::warn!(
                "{} {}: canonical `{}` is not an absolute URL",
                self.kind,
                slug,
                canonical
            );
            return;
        }

        let expected = self.url_for(slug);
        if canonical.trim_end_matches('/') != expected {
            tracing::warn!(
                "{} {}: canonical `{}` does not match `{}`",
                self.kind,
                slug,
                canonical,
                expected
            );
        }
    }
}

/// Drop drafts, items dated after `today`, then items beyond the build window
pub fn filter_published(
    items: Vec<ContentItem>,
    today: NaiveDate,
    build_window_days: Option<u32>,
) -> Vec<ContentItem> {
    let window_end =
        build_window_days.and_then(|days| today.checked_add_days(Days::new(days.into())));

    items
        .into_iter()
        .filter(|item| !item.is_draft())
        .filter(|item| item.date() <= today)
        .filter(|item| window_end.map_or(true, |end| item.date() <= end))
        .collect()
}

/// Newest first; items with equal dates keep their relative order
pub fn sort_by_date_desc(items: &mut [ContentItem]) {
    items.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn write_item(dir: &Path, slug: &str, date: &str, tags: &[&str], extra: &str) {
        fs::create_dir_all(dir).unwrap();
        let tags = tags
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(", ");
        let content = format!(
            "---\ntitle: {slug}\ntags: [{tags}]\ndate: {date}\ncanonical: https://example.com/tips/{slug}\n{extra}---\n\nBody of {slug}.\n"
        );
        fs::write(dir.join(format!("{}.md", slug)), content).unwrap();
    }

    pub(crate) fn collection(root: &Path, kind: ContentKind) -> Collection {
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..SiteConfig::default()
        };
        Collection::new(
            kind,
            root,
            Arc::new(config),
            Arc::new(MarkdownRenderer::new()),
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_list_slugs() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        write_item(&posts, "b-post", "2024-01-01", &[], "");
        write_item(&posts, "a-post", "2024-01-01", &[], "");
        fs::write(posts.join("notes.txt"), "ignored").unwrap();
        fs::write(posts.join("c-post.markdown"), "---\n---\n").unwrap();

        let slugs = collection(tmp.path(), ContentKind::Post).list_slugs();
        assert_eq!(slugs, vec!["a-post", "b-post", "c-post"]);
    }

    #[test]
    fn test_list_slugs_missing_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(collection(tmp.path(), ContentKind::News).list_slugs().is_empty());
    }

    #[test]
    fn test_load_by_slug() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("t.md"),
            "---\ntitle: \"T\"\ntags: [\"a\", \"b\"]\ndate: \"2024-01-01\"\ncanonical: \"https://x/tips/t\"\n---\n# T\n\nHello **world**.",
        )
        .unwrap();

        let item = collection(tmp.path(), ContentKind::Post)
            .load_by_slug("t")
            .unwrap();
        assert_eq!(item.slug(), "t");
        assert!(!item.html.contains("<h1"));
        assert!(item.html.contains("<strong>world</strong>"));
        assert_eq!(item.excerpt, "Hello world.");
        assert_eq!(item.content, "# T\n\nHello **world**.");
        assert_eq!(item.metadata.structured_data["@type"], "BlogPosting");
    }

    #[test]
    fn test_load_by_slug_keeps_extra_fields() {
        let tmp = TempDir::new().unwrap();
        write_item(
            &tmp.path().join("apps"),
            "focus",
            "2024-01-01",
            &["tools"],
            "category: Productivity\nplatform: iOS\n",
        );

        let item = collection(tmp.path(), ContentKind::App)
            .load_by_slug("focus")
            .unwrap();
        let details = item.app_details().unwrap();
        assert_eq!(details.category.as_deref(), Some("Productivity"));
        assert_eq!(item.metadata.structured_data["operatingSystem"], "iOS");
    }

    #[test]
    fn test_load_by_slug_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = collection(tmp.path(), ContentKind::Post)
            .load_by_slug("nope")
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound(_)));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_load_all_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        write_item(&posts, "today", "2025-06-01", &[], "");
        write_item(&posts, "older", "2025-05-01", &[], "");
        write_item(&posts, "oldest", "2024-12-31", &[], "");
        write_item(&posts, "soon", "2025-06-15", &[], "");
        write_item(&posts, "far", "2025-08-01", &[], "");
        write_item(&posts, "hidden", "2025-04-01", &[], "draft: true\n");

        let items = collection(tmp.path(), ContentKind::Post)
            .load_all_as_of(date("2025-06-01"))
            .await
            .unwrap();

        let slugs: Vec<_> = items.iter().map(|i| i.slug()).collect();
        assert_eq!(slugs, vec!["today", "older", "oldest"]);
        for pair in items.windows(2) {
            assert!(pair[0].date() >= pair[1].date());
        }
    }

    #[tokio::test]
    async fn test_load_all_fails_on_invalid_item() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        write_item(&posts, "good", "2024-01-01", &[], "");
        fs::write(posts.join("bad.md"), "---\ntitle: No tags\n---\n").unwrap();

        let err = collection(tmp.path(), ContentKind::Post)
            .load_all_as_of(date("2025-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::MissingField("tags")));
    }

    #[tokio::test]
    async fn test_apps_skip_invalid_items_and_ignore_window() {
        let tmp = TempDir::new().unwrap();
        let apps = tmp.path().join("apps");
        write_item(&apps, "good", "2024-01-01", &[], "");
        write_item(&apps, "future", "2025-08-01", &[], "");
        write_item(&apps, "draft", "2024-01-01", &[], "draft: true\n");
        fs::write(apps.join("bad.md"), "---\ntitle: No tags\n---\n").unwrap();

        let items = collection(tmp.path(), ContentKind::App)
            .load_all_as_of(date("2025-06-01"))
            .await
            .unwrap();
        let slugs: Vec<_> = items.iter().map(|i| i.slug()).collect();
        assert_eq!(slugs, vec!["good"]);
    }

    #[tokio::test]
    async fn test_load_all_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let items = collection(tmp.path(), ContentKind::Guide)
            .load_all_as_of(date("2025-06-01"))
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_filter_without_build_window() {
        let tmp = TempDir::new().unwrap();
        let apps = tmp.path().join("apps");
        write_item(&apps, "past", "2020-01-01", &[], "");
        write_item(&apps, "tomorrow", "2025-06-02", &[], "");
        let c = collection(tmp.path(), ContentKind::App);
        let items = vec![
            c.load_by_slug("past").unwrap(),
            c.load_by_slug("tomorrow").unwrap(),
        ];

        // The publish gate still applies to evergreen collections
        let kept = filter_published(items, date("2025-06-01"), None);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].slug(), "past");
    }
}

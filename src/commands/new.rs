//! Create a new content item

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::ContentKind;
use crate::Site;

/// Create a new item of `kind`, returning the path of the written file.
///
/// The body comes from `scaffolds/{kind}.md` when present; the
/// `{{ title }}`, `{{ date }}`, `{{ slug }}` and `{{ canonical }}`
/// placeholders are filled in.
pub fn create_item(
    site: &Site,
    kind: ContentKind,
    title: &str,
    slug: Option<&str>,
) -> Result<PathBuf> {
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from {:?}", title);
    }

    let collection = site.collection(kind);
    fs::create_dir_all(collection.directory())?;
    let file_path = collection.directory().join(format!("{}.md", slug));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = site
        .base_dir
        .join("scaffolds")
        .join(format!("{}.md", kind.name()));
    let scaffold = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
    } else {
        default_scaffold(kind).to_string()
    };

    let content = scaffold
        .replace("{{ title }}", &yaml_quote(title))
        .replace("{{ date }}", &today)
        .replace("{{ slug }}", &slug)
        .replace("{{ canonical }}", &collection.url_for(&slug));

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(site: &Site, kind: ContentKind, title: &str, slug: Option<&str>) -> Result<()> {
    let path = create_item(site, kind, title, slug)?;
    println!("Created: {}", path.display());
    Ok(())
}

fn default_scaffold(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::App => {
            r#"---
title: {{ title }}
description: ''
tags: []
date: {{ date }}
canonical: {{ canonical }}
category: ''
platform: ''
status: development
features: []
---
"#
        }
        _ => {
            r#"---
title: {{ title }}
description: ''
tags: []
date: {{ date }}
canonical: {{ canonical }}
draft: true
---
"#
        }
    }
}

/// Quote a title so characters like `:` survive YAML parsing
fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

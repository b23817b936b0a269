//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::ContentKind;
use crate::{Site, CONFIG_FILE};

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        fs::write(&config_path, DEFAULT_CONFIG)?;
        tracing::info!("Created {:?}", config_path);
    }

    let site = Site::new(target_dir)?;
    for kind in ContentKind::ALL {
        fs::create_dir_all(site.collection(kind).directory())?;
    }

    let posts = site.posts();
    let welcome = posts.directory().join("hello-world.md");
    if !welcome.exists() {
        let today = chrono::Utc::now().format("%Y-%m-%d");
        let content = format!(
            r#"---
title: Hello World
description: The first post on this site.
tags: [welcome]
date: {}
canonical: {}
---

# Hello World

Welcome! Edit or delete this post, then run `folio-rs generate`.

<Callout type="info">
Files dated in the future stay hidden until their day comes.
</Callout>
"#,
            today,
            posts.url_for("hello-world")
        );
        fs::write(&welcome, content)?;
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Site
title: Folio
description: ''
author: John Doe
language: en

# URL
url: http://example.com

# Directory
content_dir: content
public_dir: public

# Collections
build_window_days: 30
excerpt_length: 160
collections:
  posts:
    dir: posts
    path_prefix: tips
  guides:
    dir: guides
    path_prefix: guides
  news:
    dir: news
    path_prefix: news
  apps:
    dir: apps
    path_prefix: apps

# Writing
highlight:
  enable: true
  line_number: false
  theme: base16-ocean.dark

# Sitemap
static_pages:
  - path: about
    priority: 0.6
  - path: support
    priority: 0.3
  - path: privacy
    priority: 0.3
  - path: terms
    priority: 0.3
"#;

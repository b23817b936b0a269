//! JSON-LD structured data for content items

use serde_json::{json, Map, Value};

use super::FrontMatter;
use crate::config::SiteConfig;
use crate::helpers::{full_url_for, is_absolute_url, iso_date};

/// Schema.org description of one content type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaSpec {
    /// `@type` of the item, e.g. `BlogPosting`
    pub schema_type: &'static str,
    /// Property holding the title: `headline` for articles, `name` otherwise
    pub title_property: &'static str,
    /// Constant properties added to every item of the type
    pub extras: &'static [(&'static str, &'static str)],
    /// Front-matter field -> schema property copied when present
    pub field_map: &'static [(&'static str, &'static str)],
}

/// Build the JSON-LD object for an item
pub fn build(spec: &SchemaSpec, fm: &FrontMatter, config: &SiteConfig) -> Value {
    let mut data = Map::new();
    data.insert("@context".into(), json!("https://schema.org"));
    data.insert("@type".into(), json!(spec.schema_type));
    data.insert(spec.title_property.into(), json!(fm.title));
    data.insert("description".into(), json!(fm.description));
    data.insert("url".into(), json!(fm.canonical));
    data.insert("datePublished".into(), json!(iso_date(&fm.date)));
    data.insert("inLanguage".into(), json!(fm.lang));

    if !fm.tags.is_empty() {
        data.insert("keywords".into(), json!(fm.tags.join(", ")));
    }

    if let Some(image) = fm.image() {
        data.insert("image".into(), json!(absolute(config, image)));
    }

    data.insert(
        "mainEntityOfPage".into(),
        json!({ "@type": "WebPage", "@id": fm.canonical }),
    );
    data.insert(
        "author".into(),
        json!({ "@type": "Person", "name": config.author }),
    );

    let mut publisher = json!({
        "@type": "Organization",
        "name": config.publisher_name(),
        "url": full_url_for(config, ""),
    });
    if let Some(logo) = &config.logo {
        publisher["logo"] = json!({ "@type": "ImageObject", "url": absolute(config, logo) });
    }
    data.insert("publisher".into(), publisher);

    for (key, value) in spec.extras {
        data.insert((*key).into(), json!(value));
    }

    for (field, property) in spec.field_map {
        if let Some(value) = fm.extra.get(*field) {
            match serde_json::to_value(value) {
                Ok(value) if !value.is_null() => {
                    data.insert((*property).into(), value);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Skipping schema field {}: {}", field, e),
            }
        }
    }

    Value::Object(data)
}

fn absolute(config: &SiteConfig, url: &str) -> String {
    if is_absolute_url(url) {
        url.to_string()
    } else {
        full_url_for(config, url)
    }
}

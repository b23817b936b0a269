//! Front-matter parsing and validation
//!
//! Every content file starts with a header block, either YAML between `---`
//! lines or JSON between `;;;` lines. The header is first read into a
//! [`PartialFrontMatter`] where every field is optional, then
//! [`PartialFrontMatter::validate`] either produces a complete
//! [`FrontMatter`] with defaults applied or fails on the first missing
//! required field.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::{ContentError, Result};

/// Reading time assumed when the header does not state one
pub const DEFAULT_READING_TIME: u32 = 5;

/// Language assumed when the header does not state one
pub const DEFAULT_LANG: &str = "en";

/// Custom deserializer that handles both a single string and a list of strings
pub(crate) fn string_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Header fields as written, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialFrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub meta_desc: Option<String>,
    /// Kept untyped so a scalar can be rejected instead of coerced
    pub tags: Option<serde_yaml::Value>,
    pub date: Option<String>,
    pub draft: Option<bool>,
    pub canonical: Option<String>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<String>,
    #[serde(rename = "ogImage")]
    pub og_image: Option<String>,
    #[serde(rename = "readingTime")]
    pub reading_time: Option<u32>,
    pub lang: Option<String>,

    /// Type-specific fields (`category`, `platform`, ...) in source order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// Validated front-matter with every default applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    pub meta_desc: String,
    pub tags: Vec<String>,
    pub date: NaiveDate,
    pub draft: bool,
    pub canonical: String,
    #[serde(rename = "coverImage", skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(rename = "ogImage", skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(rename = "readingTime")]
    pub reading_time: u32,
    pub lang: String,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse and validate the header of a content file.
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let (partial, body) = PartialFrontMatter::parse(content)?;
        Ok((partial.validate()?, body))
    }

    /// Preferred social image: `ogImage`, then `coverImage`
    pub fn image(&self) -> Option<&str> {
        self.og_image.as_deref().or(self.cover_image.as_deref())
    }

    /// String value of an extra field
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

impl PartialFrontMatter {
    /// Split the header off `content` and parse it.
    /// Returns (front_matter, body). Content without a header yields an
    /// empty front-matter and the whole text as body.
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        match split(content) {
            Some((Header::Yaml(yaml), body)) => {
                if yaml.trim().is_empty() {
                    return Ok((Self::default(), body));
                }
                Ok((serde_yaml::from_str(yaml)?, body))
            }
            Some((Header::Json(json), body)) => Ok((serde_json::from_str(json)?, body)),
            None => Ok((Self::default(), content)),
        }
    }

    /// Check required fields and fill in defaults.
    ///
    /// `description` and `meta_desc` default to each other, and to the empty
    /// string when both are absent.
    pub fn validate(self) -> Result<FrontMatter> {
        let title = self.title.ok_or(ContentError::MissingField("title"))?;
        let tags = parse_tags(self.tags.ok_or(ContentError::MissingField("tags"))?)?;
        let raw_date = self.date.ok_or(ContentError::MissingField("date"))?;
        let canonical = self
            .canonical
            .ok_or(ContentError::MissingField("canonical"))?;

        let date = parse_date_string(&raw_date).ok_or_else(|| ContentError::InvalidField {
            field: "date",
            message: format!("`{}` is not an ISO date", raw_date),
        })?;

        let (description, meta_desc) = match (self.description, self.meta_desc) {
            (Some(d), Some(m)) => (d, m),
            (Some(d), None) => (d.clone(), d),
            (None, Some(m)) => (m.clone(), m),
            (None, None) => (String::new(), String::new()),
        };

        Ok(FrontMatter {
            title,
            description,
            meta_desc,
            tags,
            date,
            draft: self.draft.unwrap_or(false),
            canonical,
            cover_image: self.cover_image,
            og_image: self.og_image,
            reading_time: self.reading_time.unwrap_or(DEFAULT_READING_TIME),
            lang: self.lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
            extra: self.extra,
        })
    }
}

/// A header block found at the top of a file
#[derive(Debug, PartialEq)]
pub enum Header<'a> {
    Yaml(&'a str),
    Json(&'a str),
}

/// Split a file into its header block and body.
/// Returns `None` when the file has no complete header.
pub fn split(content: &str) -> Option<(Header<'_>, &str)> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    if let Some(rest) = content.strip_prefix("---") {
        let (inner, body) = split_at_delimiter(rest, "---")?;
        return Some((Header::Yaml(inner), body));
    }

    if let Some(rest) = content.strip_prefix(";;;") {
        let (inner, body) = split_at_delimiter(rest, ";;;")?;
        return Some((Header::Json(inner), body));
    }

    None
}

fn split_at_delimiter<'a>(rest: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    // The opening delimiter must be alone on its line
    let rest = rest.trim_start_matches([' ', '\t']);
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    if let Some(body) = rest.strip_prefix(delimiter) {
        return Some(("", body.trim_start_matches(['\n', '\r'])));
    }

    let closing = format!("\n{}", delimiter);
    let end_pos = rest.find(&closing)?;
    let inner = &rest[..end_pos];
    let body = &rest[end_pos + closing.len()..];
    Some((inner, body.trim_start_matches(['\n', '\r'])))
}

fn parse_tags(value: serde_yaml::Value) -> Result<Vec<String>> {
    let serde_yaml::Value::Sequence(items) = value else {
        return Err(ContentError::InvalidField {
            field: "tags",
            message: "expected a list".to_string(),
        });
    };

    items
        .into_iter()
        .map(|item| match item {
            serde_yaml::Value::String(s) => Ok(s),
            serde_yaml::Value::Number(n) => Ok(n.to_string()),
            serde_yaml::Value::Bool(b) => Ok(b.to_string()),
            other => Err(ContentError::InvalidField {
                field: "tags",
                message: format!("unsupported tag value {:?}", other),
            }),
        })
        .collect()
}

/// Parse a date string in various formats, keeping only the calendar day
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y/%m/%d") {
        return Some(d);
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 keeps the author's own offset for the calendar day
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial() -> PartialFrontMatter {
        PartialFrontMatter {
            title: Some("T".to_string()),
            tags: Some(serde_yaml::Value::Sequence(vec![
                serde_yaml::Value::String("a".to_string()),
                serde_yaml::Value::String("b".to_string()),
            ])),
            date: Some("2024-01-01".to_string()),
            canonical: Some("https://x/tips/t".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - web
canonical: https://example.com/tips/hello-world
category: productivity
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Hello World");
        assert_eq!(fm.tags, vec!["rust", "web"]);
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(fm.extra_str("category"), Some("productivity"));
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#";;;
{"title": "Test Post", "tags": ["a", "b"], "date": "2024-02-01", "canonical": "https://x/news/test"}
;;;

This is content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, "Test Post");
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert!(body.starts_with("This is content."));
    }

    #[test]
    fn test_defaults_applied() {
        let fm = partial().validate().unwrap();
        assert!(!fm.draft);
        assert_eq!(fm.reading_time, 5);
        assert_eq!(fm.lang, "en");
        assert_eq!(fm.description, "");
        assert_eq!(fm.meta_desc, "");
    }

    #[test]
    fn test_description_cross_fill() {
        let fm = PartialFrontMatter {
            meta_desc: Some("from meta".to_string()),
            ..partial()
        }
        .validate()
        .unwrap();
        assert_eq!(fm.description, "from meta");
        assert_eq!(fm.meta_desc, "from meta");

        let fm = PartialFrontMatter {
            description: Some("from description".to_string()),
            ..partial()
        }
        .validate()
        .unwrap();
        assert_eq!(fm.meta_desc, "from description");

        let fm = PartialFrontMatter {
            description: Some("d".to_string()),
            meta_desc: Some("m".to_string()),
            ..partial()
        }
        .validate()
        .unwrap();
        assert_eq!((fm.description.as_str(), fm.meta_desc.as_str()), ("d", "m"));
    }

    #[test]
    fn test_required_fields_rejected() {
        let cases: [(&str, fn(&mut PartialFrontMatter)); 4] = [
            ("title", |p| p.title = None),
            ("tags", |p| p.tags = None),
            ("date", |p| p.date = None),
            ("canonical", |p| p.canonical = None),
        ];

        for (field, strip) in cases {
            let mut p = partial();
            strip(&mut p);
            match p.validate() {
                Err(ContentError::MissingField(missing)) => assert_eq!(missing, field),
                other => panic!("expected missing {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_scalar_tags_rejected() {
        let content = "---\ntitle: T\ntags: notes\ndate: 2024-01-01\ncanonical: https://x/tips/t\n---\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, ContentError::InvalidField { field: "tags", .. }));
    }

    #[test]
    fn test_empty_tags_allowed() {
        let content = "---\ntitle: T\ntags: []\ndate: 2024-01-01\ncanonical: https://x/tips/t\n---\nBody";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert!(fm.tags.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_no_frontmatter_fails_validation() {
        let err = FrontMatter::parse("# Just markdown\n").unwrap_err();
        assert!(matches!(err, ContentError::MissingField("title")));
    }

    #[test]
    fn test_explicit_values_kept() {
        let content = r#"---
title: Draft
tags: [x]
date: 2024-03-01
canonical: https://x/guides/draft
draft: true
readingTime: 12
lang: fr
coverImage: /img/cover.webp
ogImage: /img/og.png
---
"#;
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert!(fm.draft);
        assert_eq!(fm.reading_time, 12);
        assert_eq!(fm.lang, "fr");
        assert_eq!(fm.image(), Some("/img/og.png"));
        assert!(fm.extra.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date_string("2024-01-15"), Some(expected));
        assert_eq!(parse_date_string("2024/01/15"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T23:30:00+02:00"), Some(expected));
        assert_eq!(parse_date_string("next tuesday"), None);
    }

    #[test]
    fn test_invalid_date_rejected() {
        let err = PartialFrontMatter {
            date: Some("soon".to_string()),
            ..partial()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, ContentError::InvalidField { field: "date", .. }));
    }

    #[test]
    fn test_split_unclosed_header() {
        assert_eq!(split("---\ntitle: x\nno closing"), None);
        assert_eq!(split("plain text"), None);
    }
}

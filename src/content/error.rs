//! Content pipeline errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a content item
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Missing required front-matter field: {0}")]
    MissingField(&'static str),

    #[error("Invalid front-matter field `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("Failed to parse YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Content not found: {0:?}")]
    NotFound(PathBuf),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ContentError::NotFound(path)
        } else {
            ContentError::Io { path, source }
        }
    }

    /// Whether a consumer should answer this failure with a "not found" page
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ContentError::NotFound(_)
                | ContentError::MissingField(_)
                | ContentError::InvalidField { .. }
                | ContentError::Yaml(_)
                | ContentError::Json(_)
        )
    }
}

/// Errors in injected configuration tables
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Guide `{guide}` lists {count} related posts, expected {expected}")]
    RelatedCount {
        guide: String,
        count: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, ContentError>;

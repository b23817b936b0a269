//! Content module - front-matter, markdown, collections and related items

pub mod collection;
mod error;
mod frontmatter;
mod item;
mod kind;
mod markdown;
pub mod related;
pub mod structured_data;

pub use collection::{Collection, LoadPolicy};
pub use error::{ConfigError, ContentError};
pub use frontmatter::{parse_date_string, split, FrontMatter, Header, PartialFrontMatter};
pub use item::{AppDetails, ContentItem, ItemMetadata};
pub use kind::ContentKind;
pub use markdown::{excerpt, CalloutStyles, MarkdownRenderer, Rendered};
pub use related::{related_items, GuideRelations};

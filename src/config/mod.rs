//! Configuration module

mod site;

pub use site::CalloutStyle;
pub use site::CollectionConfig;
pub use site::CollectionsConfig;
pub use site::HighlightConfig;
pub use site::SiteConfig;
pub use site::StaticPage;

//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::MediaConfig;
pub use site::SiteConfig;

//! Content module - front-matter, posts, and loading them from disk

mod error;
mod frontmatter;
mod item;
pub mod loader;

pub use error::LoadError;
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use item::{CodeBlock, ContentItem};
pub use loader::{ContentLoader, LoadReport};

//! Helper functions shared by the renderer and publisher

mod html;
mod url;

pub use html::*;
pub use url::*;

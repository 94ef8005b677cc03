//! Content loading errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("content not found: {0}")]
    NotFound(String),
    #[error("failed to parse {id}: {message}")]
    Parse { id: String, message: String },
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub(crate) fn parse(id: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

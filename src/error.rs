//! Typed errors for the renamer and the crawl layer.
//!
//! The binary edge (`main`) still works in `Box<dyn Error>`; these enums exist
//! so callers can tell a missing key apart from a failed write, and a skipped
//! 404 apart from a fatal fetch error.

use std::path::PathBuf;
use thiserror::Error;

use crate::rename::TargetFormat;

/// Failure modes of a field rename.
#[derive(Error, Debug)]
pub enum RenameError {
    /// The target could not be read or rewritten.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key pattern does not occur in the target. Callers usually ignore this.
    #[error("key `{key}` not found in {format} target")]
    NotFound { key: String, format: TargetFormat },

    /// The target does not have the shape its serializer produces.
    #[error("malformed {format} target: {reason}")]
    Malformed { format: TargetFormat, reason: String },
}

impl RenameError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenameError::NotFound { .. })
    }
}

/// Failure modes of a crawl.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered 404. Item-level callers skip the item.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("feed parse error: {0}")]
    Feed(String),

    #[error("source `{source_name}` is missing the {selector} selector")]
    MissingSelector {
        source_name: String,
        selector: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("front matter error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Rename(#[from] RenameError),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

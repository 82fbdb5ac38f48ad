//! Error types shared by the file store, the upstream client and the facade

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single file operation
///
/// Enumeration failures are not represented here: a directory walk never
/// fails, it reports dropped entries through `Listing::skipped` instead.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Cannot read content of file type: {0}")]
    UnsupportedType(String),

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File server unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("File server responded with status {0}")]
    UpstreamStatus(u16),

    #[error("Invalid payload from file server: {0}")]
    InvalidPayload(String),
}

impl FileError {
    /// Whether the failure originated on the way to (or from) the file server
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnreachable(_) | Self::UpstreamStatus(_) | Self::InvalidPayload(_)
        )
    }
}

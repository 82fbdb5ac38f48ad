//! File metadata records produced by directory enumeration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::http::mime;

/// Metadata snapshot of one file under the managed root
///
/// Wire names follow the file server's JSON contract
/// (`fileName`, `fileType`, `fileSize`, `filePath`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "fileName")]
    pub name: String,
    #[serde(rename = "fileType")]
    pub extension: String,
    #[serde(rename = "fileSize")]
    pub size_bytes: u64,
    #[serde(rename = "filePath")]
    pub absolute_path: String,
}

impl FileRecord {
    /// Build a record from a file path and its size
    pub fn new(path: &Path, size_bytes: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = mime::extension_of(&name).to_string();

        Self {
            name,
            extension,
            size_bytes,
            absolute_path: path.to_string_lossy().into_owned(),
        }
    }
}

/// Result of walking the managed root
///
/// `skipped` counts walk entries dropped because of I/O errors, so callers
/// can tell a partial listing from a complete one.
#[derive(Debug, Default, Clone)]
pub struct Listing {
    pub records: Vec<FileRecord>,
    pub skipped: usize,
}

impl Listing {
    pub const fn is_partial(&self) -> bool {
        self.skipped > 0
    }
}

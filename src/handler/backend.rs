//! Backend dispatch
//!
//! The same four file operations, served either from the local store or by
//! forwarding to a remote file server.

use hyper::body::Bytes;

use crate::error::FileError;
use crate::logger;
use crate::store::{FileRecord, FileStore};
use crate::upstream::UpstreamClient;

/// Where file operations are answered from
#[derive(Debug)]
pub enum Backend {
    Local(FileStore),
    Upstream(UpstreamClient),
}

impl Backend {
    pub const fn is_proxy(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }

    pub async fn list(&self) -> Result<Vec<FileRecord>, FileError> {
        match self {
            Self::Local(store) => {
                let walker = store.clone();
                let listing = tokio::task::spawn_blocking(move || walker.list_files())
                    .await
                    .map_err(|e| FileError::Io {
                        path: store.root().to_path_buf(),
                        source: std::io::Error::other(e),
                    })?;
                if listing.is_partial() {
                    logger::log_warning(&format!(
                        "Listing of '{}' is partial: {} entries skipped",
                        store.root().display(),
                        listing.skipped
                    ));
                }
                Ok(listing.records)
            }
            Self::Upstream(client) => client.list_files().await,
        }
    }

    pub async fn download(&self, name: &str) -> Result<Bytes, FileError> {
        match self {
            Self::Local(store) => store.read_bytes(name).await.map(Bytes::from),
            Self::Upstream(client) => client.download(name).await,
        }
    }

    pub async fn view(&self, name: &str) -> Result<Bytes, FileError> {
        match self {
            Self::Local(store) => store.read_bytes(name).await.map(Bytes::from),
            Self::Upstream(client) => client.view(name).await,
        }
    }

    pub async fn content(&self, name: &str) -> Result<String, FileError> {
        match self {
            Self::Local(store) => store.read_text(name).await,
            Self::Upstream(client) => client.content(name).await,
        }
    }
}

//! Upstream file server client
//!
//! Used by the proxy to forward `list`, `download`, `content` and `view` to a
//! remote file server. One GET per call: no retries, no timeouts.

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{Request, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::FileError;
use crate::store::FileRecord;

/// Characters escaped when a file name is sent as one path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// HTTP client bound to a file server's `/api/files` base URL
#[derive(Clone)]
pub struct UpstreamClient {
    base_url: String,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    /// Create a client for e.g. `http://file-server:8081/api/files`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    /// Fetch the remote listing
    pub async fn list_files(&self) -> Result<Vec<FileRecord>, FileError> {
        let body = self.get("list", None).await?;
        serde_json::from_slice(&body).map_err(|e| FileError::InvalidPayload(e.to_string()))
    }

    pub async fn download(&self, name: &str) -> Result<Bytes, FileError> {
        self.get("download", Some(name)).await
    }

    pub async fn view(&self, name: &str) -> Result<Bytes, FileError> {
        self.get("view", Some(name)).await
    }

    pub async fn content(&self, name: &str) -> Result<String, FileError> {
        let body = self.get("content", Some(name)).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// GET `{base_url}/{operation}[/{name}]` and return the body of a 200 response
    ///
    /// 404 and 400 are translated back into the file server's own error
    /// kinds so the proxy can relay them; other statuses are upstream errors.
    async fn get(&self, operation: &str, name: Option<&str>) -> Result<Bytes, FileError> {
        let url = match name {
            Some(name) => format!("{}/{operation}/{}", self.base_url, encode_segment(name)),
            None => format!("{}/{operation}", self.base_url),
        };
        let uri: Uri = url.parse().map_err(|e| {
            FileError::UpstreamUnreachable(format!("invalid file server URL '{url}': {e}"))
        })?;

        let request = Request::get(uri)
            .header("Accept", "*/*")
            .body(Empty::new())
            .map_err(|e| FileError::UpstreamUnreachable(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| FileError::UpstreamUnreachable(format!("GET {url}: {e}")))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FileError::UpstreamUnreachable(format!("GET {url}: {e}")))?
            .to_bytes();

        match status {
            StatusCode::OK => Ok(body),
            StatusCode::NOT_FOUND => {
                Err(FileError::NotFound(name.unwrap_or(operation).to_string()))
            }
            StatusCode::BAD_REQUEST => Err(FileError::UnsupportedType(
                String::from_utf8_lossy(&body).into_owned(),
            )),
            other => Err(FileError::UpstreamStatus(other.as_u16())),
        }
    }
}

/// Percent-encode a file name for use as a single URL path segment
pub fn encode_segment(name: &str) -> String {
    utf8_percent_encode(name, SEGMENT).to_string()
}

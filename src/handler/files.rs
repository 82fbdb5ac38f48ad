//! File route handlers
//!
//! Turns backend results into responses: media types, disposition headers,
//! and the status code for each failure.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::config::DownloadMediaType;
use crate::error::FileError;
use crate::handler::backend::Backend;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, Disposition};
use crate::logger;

pub const TEST_MESSAGE: &str = "Test successful";
pub const UNSUPPORTED_CONTENT_MESSAGE: &str = "Cannot read content of this file type";
pub const PROXY_CONTENT_FAILURE_MESSAGE: &str = "Failed to get file content";

/// `GET list`
pub async fn list(ctx: &RequestContext<'_>, backend: &Backend) -> Response<Full<Bytes>> {
    let records = match backend.list().await {
        Ok(records) => records,
        Err(e) => {
            logger::log_error(&format!("Failed to list files: {e}"));
            return http::build_empty_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match serde_json::to_vec(&records) {
        Ok(json) => http::build_json_response(json, ctx.is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize file list: {e}"));
            http::build_empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// `GET download/{name}`
pub async fn download(
    ctx: &RequestContext<'_>,
    backend: &Backend,
    name: &str,
    media_type: DownloadMediaType,
) -> Response<Full<Bytes>> {
    match backend.download(name).await {
        Ok(data) => {
            // The proxy can be told to keep the web server's fixed download type
            let content_type = if backend.is_proxy() && media_type == DownloadMediaType::OctetStream
            {
                mime::OCTET_STREAM
            } else {
                mime::media_type_for_name(name)
            };
            http::build_file_response(data, content_type, Disposition::Attachment, name, ctx.is_head)
        }
        Err(e) => binary_failure("download", name, &e),
    }
}

/// `GET view/{name}`
pub async fn view(ctx: &RequestContext<'_>, backend: &Backend, name: &str) -> Response<Full<Bytes>> {
    match backend.view(name).await {
        Ok(data) => http::build_file_response(
            data,
            mime::media_type_for_name(name),
            Disposition::Inline,
            name,
            ctx.is_head,
        ),
        Err(e) => binary_failure("view", name, &e),
    }
}

/// `GET content/{name}`
pub async fn content(
    ctx: &RequestContext<'_>,
    backend: &Backend,
    name: &str,
) -> Response<Full<Bytes>> {
    match backend.content(name).await {
        Ok(text) => http::build_text_response(StatusCode::OK, text, ctx.is_head),
        Err(e) => {
            log_failure("content", name, &e);
            match status_for(&e) {
                StatusCode::BAD_REQUEST => http::build_text_response(
                    StatusCode::BAD_REQUEST,
                    UNSUPPORTED_CONTENT_MESSAGE.to_string(),
                    ctx.is_head,
                ),
                StatusCode::NOT_FOUND => http::build_404_response(),
                status => http::build_text_response(
                    status,
                    PROXY_CONTENT_FAILURE_MESSAGE.to_string(),
                    ctx.is_head,
                ),
            }
        }
    }
}

/// `GET test`
pub fn test(ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
    logger::log_info("Test endpoint called!");
    http::build_text_response(StatusCode::OK, TEST_MESSAGE.to_string(), ctx.is_head)
}

/// Status code a failed file operation is reported with
///
/// Local read errors count as "not found", matching how the file server has
/// always answered them; anything on the way to the file server is a 500.
pub const fn status_for(err: &FileError) -> StatusCode {
    match err {
        e if e.is_upstream() => StatusCode::INTERNAL_SERVER_ERROR,
        FileError::UnsupportedType(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::NOT_FOUND,
    }
}

fn binary_failure(route: &str, name: &str, err: &FileError) -> Response<Full<Bytes>> {
    log_failure(route, name, err);
    http::build_empty_response(status_for(err))
}

fn log_failure(route: &str, name: &str, err: &FileError) {
    if err.is_upstream() || matches!(err, FileError::Io { .. }) {
        logger::log_error(&format!("{route} '{name}': {err}"));
    } else {
        logger::log_warning(&format!("{route} '{name}': {err}"));
    }
}

//! HTTP response building module
//!
//! Builders for the responses the file routes produce. Every builder falls
//! back to a bare 500 if the response cannot be assembled (for example a
//! file name that is not a valid header value).

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// How the browser should treat a served file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Inline => "inline",
        }
    }

    /// `Content-Disposition` header value for `file_name`
    pub fn header_value(self, file_name: &str) -> String {
        format!("{}; filename={file_name}", self.as_str())
    }
}

/// Build a response with a status code and no body
pub fn build_empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Length", 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback_response()
        })
}

/// Build 404 Not Found response (empty body)
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_empty_response(StatusCode::NOT_FOUND)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            fallback_response()
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(cors_origin: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, HEAD, OPTIONS");

    if let Some(origin) = cors_origin {
        builder = builder
            .header("Access-Control-Allow-Origin", origin)
            .header("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        fallback_response()
    })
}

/// Build health check response
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache")
        .body(Full::new(Bytes::from(status.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            fallback_response()
        })
}

/// Build a plain text response
pub fn build_text_response(
    status: StatusCode,
    text: String,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = text.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(text)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback_response()
        })
}

/// Build a 200 JSON response from an already serialized body
pub fn build_json_response(json: Vec<u8>, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = json.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(json)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            fallback_response()
        })
}

/// Build a 200 response carrying file bytes
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    disposition: Disposition,
    file_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Content-Disposition", disposition.header_value(file_name))
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            fallback_response()
        })
}

fn fallback_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_response_headers() {
        let resp = build_file_response(
            Bytes::from_static(b"%PDF-1.7"),
            "application/pdf",
            Disposition::Inline,
            "doc.pdf",
            false,
        );
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/pdf");
        assert_eq!(resp.headers()["Content-Length"], "8");
        assert_eq!(resp.headers()["Content-Disposition"], "inline; filename=doc.pdf");
    }

    #[test]
    fn test_invalid_file_name_falls_back_to_500() {
        let resp = build_file_response(
            Bytes::from_static(b"x"),
            "text/plain",
            Disposition::Attachment,
            "bad\nname.txt",
            false,
        );
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_disposition_values() {
        assert_eq!(
            Disposition::Attachment.header_value("a b.txt"),
            "attachment; filename=a b.txt"
        );
        assert_eq!(Disposition::Inline.as_str(), "inline");
    }

    #[test]
    fn test_empty_and_options() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["Content-Length"], "0");

        let resp = build_options_response(Some("*"));
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");

        let resp = build_options_response(None);
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
    }
}

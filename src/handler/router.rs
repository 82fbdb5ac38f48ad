//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, dispatching, and access logging.

use crate::config::AppState;
use crate::handler::files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, REFERER, SERVER, USER_AGENT,
};
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
}

/// A file operation matched under the route prefix
#[derive(Debug, PartialEq, Eq)]
pub enum FileRoute {
    List,
    Test,
    Download(String),
    Content(String),
    View(String),
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = dispatch(&method, &path, &state).await;
    apply_common_headers(&mut response, &state);

    if state.config.logging.access_log {
        log_access(
            &req,
            &response,
            peer_addr,
            started,
            &state.config.logging.access_log_format,
        );
    }

    Ok(response)
}

async fn dispatch(method: &Method, path: &str, state: &AppState) -> Response<Full<Bytes>> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state) {
        return resp;
    }

    let ctx = RequestContext {
        path,
        is_head: *method == Method::HEAD,
    };

    // 2. Health check endpoints
    let health = &state.config.health;
    if health.enabled && (ctx.path == health.liveness_path || ctx.path == health.readiness_path) {
        return http::build_health_response("ok");
    }

    // 3. File routes
    match match_file_route(ctx.path, state.route_prefix()) {
        Some(route) => route_request(&ctx, route, state).await,
        None => http::build_404_response(),
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, state: &AppState) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(
            state.config.http.cors_origin(),
        )),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Match `path` against the file routes under `prefix`
///
/// File names are a single percent-decoded segment; anything else is `None`.
pub fn match_file_route(path: &str, prefix: &str) -> Option<FileRoute> {
    let rest = path.strip_prefix(prefix)?.strip_prefix('/')?;

    match rest {
        "list" => return Some(FileRoute::List),
        "test" => return Some(FileRoute::Test),
        _ => {}
    }

    let (operation, raw_name) = rest.split_once('/')?;
    if raw_name.is_empty() || raw_name.contains('/') {
        return None;
    }
    let name = percent_decode_str(raw_name).decode_utf8().ok()?.into_owned();

    match operation {
        "download" => Some(FileRoute::Download(name)),
        "content" => Some(FileRoute::Content(name)),
        "view" => Some(FileRoute::View(name)),
        _ => None,
    }
}

/// Dispatch a matched route to its handler
async fn route_request(
    ctx: &RequestContext<'_>,
    route: FileRoute,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let backend = &state.backend;
    match route {
        FileRoute::List => files::list(ctx, backend).await,
        // The proxy only forwards the four file operations
        FileRoute::Test if backend.is_proxy() => http::build_404_response(),
        FileRoute::Test => files::test(ctx),
        FileRoute::Download(name) => {
            files::download(ctx, backend, &name, state.config.proxy.download_media_type).await
        }
        FileRoute::Content(name) => files::content(ctx, backend, &name).await,
        FileRoute::View(name) => files::view(ctx, backend, &name).await,
    }
}

/// Add `Server` and CORS headers to every response
fn apply_common_headers(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert(SERVER, value);
    }
    if let Some(origin) = state.config.http.cors_origin() {
        match HeaderValue::from_str(origin) {
            Ok(value) => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }
            Err(e) => logger::log_warning(&format!("Invalid CORS origin '{origin}': {e}")),
        }
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    format: &str,
) {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, format);
}

//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use crate::config::{AppState, HealthConfig};
use crate::handler::share;
use crate::http::{self, ResponseBody};
use crate::immich::urls::{is_valid_token, SHARE_PREFIX};
use crate::logger::{self, AccessLogEntry};
use crate::stream::ImageSize;
use hyper::header::{CONTENT_LENGTH, HOST, RANGE, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub host: Option<String>,
    pub range_header: Option<String>,
    pub access_log: bool,
}

/// Where a request path leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Liveness,
    Readiness,
    Photo {
        key: &'a str,
        id: &'a str,
        size: Option<ImageSize>,
    },
    Video {
        key: &'a str,
        id: &'a str,
    },
    Gallery {
        key: &'a str,
        open_item: Option<usize>,
    },
    NotFound,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let path = req.uri().path();

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method) {
        return Ok(resp);
    }

    // 2. Log headers if enabled
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    // 3. Extract what the handlers need from the headers
    let ctx = RequestContext {
        path,
        is_head: *method == Method::HEAD,
        host: header_string(req.headers(), HOST),
        range_header: header_string(req.headers(), RANGE),
        access_log: state.config.logging.access_log,
    };

    // 4. Dispatch
    let response = match parse_route(ctx.path, &state.config.health) {
        Route::Liveness | Route::Readiness => http::build_health_response("ok"),
        Route::Photo { key, id, size } => share::serve_photo(&ctx, &state, key, id, size).await,
        Route::Video { key, id } => share::serve_video(&ctx, &state, key, id).await,
        Route::Gallery { key, open_item } => {
            share::serve_gallery(&ctx, &state, key, open_item).await
        }
        Route::NotFound => http::build_404_response(),
    };

    if ctx.access_log {
        let entry = access_entry(&req, peer_addr, &response, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Match a request path against the health probes and share routes
///
/// Share routes:
/// - `/share/photo/{key}/{id}` and `/share/photo/{key}/{id}/{size}`
/// - `/share/video/{key}/{id}`
/// - `/share/{key}` and `/share/{key}/{item}`
///
/// Keys and ids outside `[A-Za-z0-9_-]` never match.
pub fn parse_route<'a>(path: &'a str, health: &HealthConfig) -> Route<'a> {
    if health.enabled {
        if path == health.liveness_path {
            return Route::Liveness;
        }
        if path == health.readiness_path {
            return Route::Readiness;
        }
    }

    let Some(rest) = path
        .strip_prefix(SHARE_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return Route::NotFound;
    };
    let segments: Vec<&str> = rest.strip_suffix('/').unwrap_or(rest).split('/').collect();

    let route = match *segments.as_slice() {
        ["photo", key, id] => Route::Photo {
            key,
            id,
            size: None,
        },
        ["photo", key, id, size] => match size.parse() {
            Ok(size) => Route::Photo {
                key,
                id,
                size: Some(size),
            },
            Err(_) => Route::NotFound,
        },
        ["video", key, id] => Route::Video { key, id },
        [key] => Route::Gallery {
            key,
            open_item: None,
        },
        [key, item] => match item.parse() {
            Ok(n) => Route::Gallery {
                key,
                open_item: Some(n),
            },
            Err(_) => Route::NotFound,
        },
        _ => Route::NotFound,
    };

    let tokens_ok = match &route {
        Route::Photo { key, id, .. } | Route::Video { key, id } => {
            is_valid_token(key) && is_valid_token(id)
        }
        Route::Gallery { key, .. } => is_valid_token(key),
        _ => true,
    };
    if tokens_ok {
        route
    } else {
        Route::NotFound
    }
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry(
    req: &Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    response: &Response<ResponseBody>,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    entry.range = header_string(req.headers(), RANGE);
    entry.referer = header_string(req.headers(), REFERER);
    entry.user_agent = header_string(req.headers(), USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

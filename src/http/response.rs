//! HTTP response building module
//!
//! Canned responses for everything that is not a streamed asset.

use hyper::Response;

use super::body::{empty, full, ResponseBody};

/// Build 404 Not Found response
///
/// Body is empty: a missing or unshared asset looks exactly like one that
/// never existed.
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(empty())
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(empty())
        })
}

/// Build 502 Bad Gateway response, used when a delivery died before its head
pub fn build_502_response() -> Response<ResponseBody> {
    Response::builder()
        .status(502)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("502", &e);
            Response::new(empty())
        })
}

/// Build plain-text health probe response
pub fn build_health_response(status: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-store")
        .body(full(status))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(full(status))
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head { empty() } else { full(content) };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .header("Cache-Control", "no-cache")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty())
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_404_has_empty_body() {
        let resp = build_404_response();
        assert_eq!(resp.status(), 404);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_html_head_keeps_length() {
        let resp = build_html_response("<p>hi</p>".to_string(), true);
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "9");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_405_allow_header() {
        let resp = build_405_response();
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["allow"], "GET, HEAD, OPTIONS");
    }
}

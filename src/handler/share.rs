//! Share handlers
//!
//! Serves the assets and gallery page of a shared link. Every asset request
//! is gated on the asset belonging to the share named by the key.

use hyper::Response;

use crate::config::AppState;
use crate::gallery::{self, PageContext};
use crate::handler::router::RequestContext;
use crate::http::{self, ResponseBody};
use crate::logger;
use crate::stream::{
    deliver, response_channel, AssetFetchResult, AssetFetcher, AssetKind, AssetReference,
    CancellationWatcher, FetchOptions, ImageSize,
};

/// Serve photo bytes, optionally in a size variant
pub async fn serve_photo(
    ctx: &RequestContext<'_>,
    state: &AppState,
    key: &str,
    id: &str,
    size: Option<ImageSize>,
) -> Response<ResponseBody> {
    let mut reference = AssetReference::new(key, id, AssetKind::Photo);
    reference.size = size;
    serve_asset(ctx, state, reference).await
}

/// Serve video playback bytes
pub async fn serve_video(
    ctx: &RequestContext<'_>,
    state: &AppState,
    key: &str,
    id: &str,
) -> Response<ResponseBody> {
    serve_asset(ctx, state, AssetReference::new(key, id, AssetKind::Video)).await
}

async fn serve_asset(
    ctx: &RequestContext<'_>,
    state: &AppState,
    reference: AssetReference,
) -> Response<ResponseBody> {
    let shared = state
        .immich
        .shared_link(&reference.share_key)
        .await
        .and_then(|link| link.find_asset(&reference.id).and_then(|a| a.kind()))
        .is_some_and(|kind| kind == reference.kind);

    let result = if shared {
        let options = FetchOptions {
            range: ctx.range_header.clone(),
        };
        state.immich.fetch(&reference, options).await
    } else {
        None
    };

    stream_result(result, reference, ctx.access_log).await
}

/// Stream `result` through a fresh hyper connection
///
/// The delivery runs on its own task; this returns as soon as the response
/// head is committed.
pub async fn stream_result(
    result: Option<AssetFetchResult>,
    asset: AssetReference,
    log_outcome: bool,
) -> Response<ResponseBody> {
    let (mut connection, pending) = response_channel();
    let watcher = CancellationWatcher::attach(&connection);

    tokio::spawn(async move {
        match deliver(result, &mut connection, &watcher).await {
            Ok(delivery) => {
                if log_outcome {
                    logger::log_delivery(&asset, &delivery);
                }
            }
            // Dropping the unfinished connection resets the client
            Err(e) => logger::log_delivery_failed(&asset, &e),
        }
    });

    pending.wait().await
}

/// Serve the gallery page of a share
pub async fn serve_gallery(
    ctx: &RequestContext<'_>,
    state: &AppState,
    key: &str,
    open_item: Option<usize>,
) -> Response<ResponseBody> {
    let Some(link) = state.immich.shared_link(key).await else {
        return http::build_404_response();
    };

    let items = gallery::build_items(&state.immich, &link).await;
    let base_url = base_url(ctx, state);
    let page = PageContext {
        base_url: &base_url,
        title: link.title().unwrap_or(state.config.gallery.title.as_str()),
        open_item,
    };

    http::build_html_response(gallery::render_page(&items, &page), ctx.is_head)
}

/// Origin the client used to reach the relay
fn base_url(ctx: &RequestContext<'_>, state: &AppState) -> String {
    let scheme = &state.config.gallery.public_scheme;
    match ctx.host.as_deref() {
        Some(host) => format!("{scheme}://{host}"),
        None => format!(
            "{scheme}://{}:{}",
            state.config.server.host, state.config.server.port
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HeaderBag;
    use crate::stream::FetchError;
    use futures_util::{stream, StreamExt};
    use http_body_util::BodyExt;
    use hyper::body::Bytes;

    fn video() -> AssetReference {
        AssetReference::new("k", "v1", AssetKind::Video)
    }

    #[tokio::test]
    async fn test_stream_result_absent_is_404() {
        let response = stream_result(None, video(), false).await;
        assert_eq!(response.status(), 404);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_stream_result_forwards_partial_content() {
        let headers: HeaderBag = [
            ("Content-Range", "bytes 0-4/10"),
            ("Content-Length", "5"),
            ("Accept-Ranges", "bytes"),
            ("Set-Cookie", "immich_access_token=secret"),
        ]
        .into_iter()
        .collect();
        let chunks: Vec<Result<Bytes, FetchError>> = vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"de")),
        ];
        let result = AssetFetchResult {
            status: 206,
            headers,
            body: stream::iter(chunks).boxed(),
        };

        let response = stream_result(Some(result), video(), false).await;
        assert_eq!(response.status(), 206);
        assert_eq!(response.headers()["content-range"], "bytes 0-4/10");
        assert_eq!(response.headers()["content-length"], "5");
        assert_eq!(response.headers()["accept-ranges"], "bytes");
        assert!(response.headers().get("set-cookie").is_none());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"abcde");
    }

    #[tokio::test]
    async fn test_stream_result_upstream_failure_breaks_body() {
        let chunks: Vec<Result<Bytes, FetchError>> =
            vec![Ok(Bytes::from_static(b"abc")), Err(FetchError::Timeout)];
        let result = AssetFetchResult {
            status: 200,
            headers: HeaderBag::new(),
            body: stream::iter(chunks).boxed(),
        };

        let response = stream_result(Some(result), video(), false).await;
        assert_eq!(response.status(), 200);
        assert!(response.into_body().collect().await.is_err());
    }
}

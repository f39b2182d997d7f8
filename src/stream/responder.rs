//! Streaming responder
//!
//! Replays a fetched asset onto a client connection: allow-listed headers,
//! the upstream status untouched, then the body chunk by chunk until it runs
//! out or the client leaves.

use futures_util::StreamExt;

use super::connection::ClientConnection;
use super::fetch::{AssetFetchResult, FetchError};
use super::watcher::CancellationWatcher;

/// Upstream headers copied to the client; everything else stays behind
pub const FORWARDED_HEADERS: [&str; 5] = [
    "content-type",
    "content-length",
    "content-range",
    "accept-ranges",
    "etag",
];

/// What happened to a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No fetch result; answered 404
    NotFound,
    /// Body streamed to the end
    Complete { status: u16, chunks: usize, bytes: usize },
    /// Client left before the body ran out
    Cancelled { status: u16, chunks: usize, bytes: usize },
}

impl Delivery {
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Complete { status, .. } | Self::Cancelled { status, .. } => *status,
        }
    }

    pub const fn bytes(&self) -> usize {
        match self {
            Self::NotFound => 0,
            Self::Complete { bytes, .. } | Self::Cancelled { bytes, .. } => *bytes,
        }
    }
}

/// Deliver `result` on `connection`
///
/// The watcher is polled after every chunk write, so at most one chunk goes
/// out after the client has disconnected. The connection is ended on every
/// path except an upstream body error, which is returned as-is with the
/// connection left open for the transport to reset.
pub async fn deliver<C>(
    result: Option<AssetFetchResult>,
    connection: &mut C,
    watcher: &CancellationWatcher,
) -> Result<Delivery, FetchError>
where
    C: ClientConnection + ?Sized,
{
    let Some(AssetFetchResult {
        status,
        headers,
        mut body,
    }) = result
    else {
        connection.write_status(404);
        connection.end().await;
        return Ok(Delivery::NotFound);
    };

    for name in FORWARDED_HEADERS {
        if let Some(value) = headers.get(name).filter(|v| !v.is_empty()) {
            connection.set_header(name, value);
        }
    }
    connection.write_status(status);

    let mut chunks = 0;
    let mut bytes = 0;
    let mut cancelled = false;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        chunks += 1;
        bytes += chunk.len();
        if connection.write_chunk(chunk).await.is_err() || watcher.is_client_gone() {
            cancelled = true;
            break;
        }
    }
    // Release the upstream body (and its connection) before finishing
    drop(body);

    connection.end().await;

    Ok(if cancelled {
        Delivery::Cancelled {
            status,
            chunks,
            bytes,
        }
    } else {
        Delivery::Complete {
            status,
            chunks,
            bytes,
        }
    })
}

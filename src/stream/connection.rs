//! Client connection abstraction
//!
//! `ClientConnection` is the write side of one local HTTP exchange.
//! `HyperConnection` implements it on top of hyper: the response head is
//! handed to the service future through a oneshot, and body chunks travel
//! through a bounded channel into a custom `Body`, so a slow client pushes
//! back on the upstream read instead of piling chunks up in memory.

use async_trait::async_trait;
use hyper::body::{Body, Bytes, Frame};
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Response, StatusCode};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::http::{build_502_response, ResponseBody};
use crate::logger;

/// Chunks buffered between the delivery task and hyper
const BODY_CHANNEL_CAPACITY: usize = 1;

/// Returned by `write_chunk` once nobody is reading any more
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("client connection closed")]
pub struct ConnectionClosed;

/// Write side of a local HTTP response
#[async_trait]
pub trait ClientConnection: Send {
    /// Stage a response header; ignored once the status has been written
    fn set_header(&mut self, name: &str, value: &str);

    /// Write the status line, committing the response head
    fn write_status(&mut self, status: u16);

    /// Write one body chunk, waiting until the transport accepts it
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), ConnectionClosed>;

    /// Finish the response body
    async fn end(&mut self);

    /// Token cancelled when the client side of the connection goes away
    fn on_close(&self) -> CancellationToken;
}

/// Response head not yet handed to hyper
struct PendingHead {
    headers: HeaderMap,
    body: ChannelBody,
    reply: oneshot::Sender<Response<ResponseBody>>,
}

/// `ClientConnection` feeding a hyper response
pub struct HyperConnection {
    head: Option<PendingHead>,
    frames: Option<mpsc::Sender<Bytes>>,
    aborted: Arc<AtomicBool>,
    closed: CancellationToken,
}

/// Service-side half of `response_channel`
pub struct PendingResponse {
    rx: oneshot::Receiver<Response<ResponseBody>>,
}

impl PendingResponse {
    /// Wait for the response head
    ///
    /// A connection dropped before writing its status yields 502.
    pub async fn wait(self) -> Response<ResponseBody> {
        self.rx.await.unwrap_or_else(|_| build_502_response())
    }
}

/// Create a connected `HyperConnection` / `PendingResponse` pair
pub fn response_channel() -> (HyperConnection, PendingResponse) {
    let (tx, rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);
    let (reply, pending) = oneshot::channel();
    let aborted = Arc::new(AtomicBool::new(false));
    let closed = CancellationToken::new();

    let body = ChannelBody {
        rx,
        aborted: Arc::clone(&aborted),
        _closed: closed.clone().drop_guard(),
    };

    let connection = HyperConnection {
        head: Some(PendingHead {
            headers: HeaderMap::new(),
            body,
            reply,
        }),
        frames: Some(tx),
        aborted,
        closed,
    };

    (connection, PendingResponse { rx: pending })
}

#[async_trait]
impl ClientConnection for HyperConnection {
    fn set_header(&mut self, name: &str, value: &str) {
        let Some(head) = self.head.as_mut() else {
            logger::log_warning(&format!("Header '{name}' set after status, dropped"));
            return;
        };
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                head.headers.insert(name, value);
            }
            _ => logger::log_warning(&format!("Invalid header '{name}: {value}', dropped")),
        }
    }

    fn write_status(&mut self, status: u16) {
        let Some(head) = self.head.take() else {
            logger::log_warning(&format!("Status {status} written twice, ignored"));
            return;
        };

        let status = StatusCode::from_u16(status).unwrap_or_else(|_| {
            logger::log_error(&format!("Invalid upstream status {status}, sending 502"));
            StatusCode::BAD_GATEWAY
        });

        let mut response = Response::new(http_body_util::BodyExt::boxed(head.body));
        *response.status_mut() = status;
        *response.headers_mut() = head.headers;

        // A failed send drops the response and its body, which fires `closed`
        let _ = head.reply.send(response);
    }

    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), ConnectionClosed> {
        if self.head.is_some() {
            self.write_status(200);
        }
        let Some(frames) = self.frames.as_ref() else {
            return Err(ConnectionClosed);
        };
        frames.send(chunk).await.map_err(|_| ConnectionClosed)
    }

    async fn end(&mut self) {
        if self.head.is_some() {
            self.write_status(200);
        }
        self.frames = None;
    }

    fn on_close(&self) -> CancellationToken {
        self.closed.clone()
    }
}

impl Drop for HyperConnection {
    fn drop(&mut self) {
        // Dropped without `end()`: make the body fail so hyper resets the
        // client connection instead of terminating it cleanly
        if self.frames.is_some() {
            self.aborted.store(true, Ordering::SeqCst);
        }
    }
}

/// Hyper body reading from the delivery channel
struct ChannelBody {
    rx: mpsc::Receiver<Bytes>,
    aborted: Arc<AtomicBool>,
    _closed: DropGuard,
}

impl Body for ChannelBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(chunk)) => Poll::Ready(Some(Ok(Frame::data(chunk)))),
            Poll::Ready(None) if this.aborted.load(Ordering::SeqCst) => Poll::Ready(Some(Err(
                std::io::Error::other("upstream body failed mid-stream"),
            ))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

//! Response body type shared by canned and streamed responses

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;

/// Body of every response the relay produces
///
/// Canned responses are infallible; streamed ones fail with `io::Error` when
/// the upstream body breaks mid-transfer.
pub type ResponseBody = BoxBody<Bytes, std::io::Error>;

/// Body with the given content
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Body with no content
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

//! Fetch collaborator contract
//!
//! Types describing what the streaming core receives from whoever talks to the
//! remote asset service.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use hyper::body::Bytes;
use std::fmt;
use std::str::FromStr;

use crate::http::HeaderBag;

/// Media kind of an asset; exactly two cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Photo,
    Video,
}

impl AssetKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendition of a photo to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSize {
    Thumbnail,
    Preview,
    Original,
}

impl ImageSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Preview => "preview",
            Self::Original => "original",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumbnail" => Ok(Self::Thumbnail),
            "preview" => Ok(Self::Preview),
            "original" => Ok(Self::Original),
            other => Err(format!("Unknown image size: {other}")),
        }
    }
}

/// Identifies a remote media object as reached through a share key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub share_key: String,
    pub id: String,
    pub kind: AssetKind,
    pub size: Option<ImageSize>,
}

impl AssetReference {
    pub fn new(share_key: impl Into<String>, id: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            share_key: share_key.into(),
            id: id.into(),
            kind,
            size: None,
        }
    }

    #[must_use]
    pub const fn with_size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }
}

/// Per-request fetch options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Raw `Range` header from the local client, validated by the fetcher
    pub range: Option<String>,
}

/// Failures while talking to the remote asset service
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("upstream body failed: {0}")]
    Body(#[from] hyper::Error),
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream answered with status {0}")]
    Status(u16),
    #[error("invalid upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid upstream request: {0}")]
    InvalidRequest(#[from] hyper::http::Error),
}

/// Lazy, finite, single-pass sequence of body chunks
pub type AssetBody = BoxStream<'static, Result<Bytes, FetchError>>;

/// Retrieved asset: status and headers already resolved against any range
pub struct AssetFetchResult {
    pub status: u16,
    pub headers: HeaderBag,
    pub body: AssetBody,
}

impl fmt::Debug for AssetFetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetFetchResult")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Source of asset bytes and metadata
///
/// `fetch` returns `None` when the object cannot be retrieved (missing,
/// forbidden, upstream unreachable). Range validation is the fetcher's job:
/// the returned status and `content-range` / `accept-ranges` headers are
/// forwarded as-is.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(
        &self,
        asset: &AssetReference,
        options: FetchOptions,
    ) -> Option<AssetFetchResult>;

    /// Content type the asset would be served with, if known
    async fn content_type(&self, asset: &AssetReference) -> Option<String>;
}

//! Immich REST client
//!
//! Talks plain HTTP to the Immich server with hyper-util's pooled client and
//! implements `AssetFetcher` on top of it.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use http_body_util::{BodyDataStream, BodyExt, Empty};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, RANGE};
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::types::{Album, SharedLink, SharedLinkType};
use super::urls::is_valid_token;
use crate::config::ImmichConfig;
use crate::http::HeaderBag;
use crate::logger;
use crate::stream::{
    AssetFetchResult, AssetFetcher, AssetKind, AssetReference, FetchError, FetchOptions,
    ImageSize,
};

type HttpClient = Client<HttpConnector, Empty<Bytes>>;

/// Client for one Immich server
#[derive(Clone)]
pub struct ImmichClient {
    base_url: String,
    http: HttpClient,
    request_timeout: Option<Duration>,
}

impl ImmichClient {
    pub fn new(config: &ImmichConfig) -> Self {
        let http = Client::builder(TokioExecutor::new()).build_http();
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            http,
            request_timeout: (config.request_timeout > 0)
                .then(|| Duration::from_secs(config.request_timeout)),
        }
    }

    fn api_url(&self, path_and_query: &str) -> String {
        format!("{}/api{path_and_query}", self.base_url)
    }

    /// API path serving the bytes of `asset`
    pub fn asset_path(asset: &AssetReference) -> String {
        let (id, key) = (&asset.id, &asset.share_key);
        match (asset.kind, asset.size) {
            (AssetKind::Video, _) => format!("/assets/{id}/video/playback?key={key}"),
            (AssetKind::Photo, Some(size @ (ImageSize::Thumbnail | ImageSize::Preview))) => {
                format!("/assets/{id}/thumbnail?size={size}&key={key}")
            }
            (AssetKind::Photo, Some(ImageSize::Original) | None) => {
                format!("/assets/{id}/original?key={key}")
            }
        }
    }

    /// Send a bodiless request; the timeout covers the response head only
    async fn send(
        &self,
        method: Method,
        url: &str,
        range: Option<&str>,
    ) -> Result<Response<Incoming>, FetchError> {
        let mut builder = Request::builder().method(method).uri(url);
        if let Some(range) = range {
            builder = builder.header(RANGE, range);
        }
        let request = builder.body(Empty::new())?;

        let pending = self.http.request(request);
        let response = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| FetchError::Timeout)??,
            None => pending.await?,
        };
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, FetchError> {
        let response = self
            .send(Method::GET, &self.api_url(path_and_query), None)
            .await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        let body = response.into_body().collect().await?.to_bytes();
        Ok(serde_json::from_slice(&body)?)
    }

    /// Resolve a share key to its shared link and assets
    ///
    /// Returns `None` for malformed, unknown or expired keys.
    pub async fn shared_link(&self, key: &str) -> Option<SharedLink> {
        if !is_valid_token(key) {
            return None;
        }

        let mut link: SharedLink = match self.get_json(&format!("/shared-links/me?key={key}")).await
        {
            Ok(link) => link,
            Err(FetchError::Status(status)) => {
                logger::log_warning(&format!("Shared link lookup refused upstream ({status})"));
                return None;
            }
            Err(e) => {
                logger::log_error(&format!("Shared link lookup failed: {e}"));
                return None;
            }
        };

        // Album links list their assets on the album, not on the link
        if link.link_type == SharedLinkType::Album && link.assets.is_empty() {
            if let Some(album_id) = link.album.as_ref().map(|a| a.id.clone()) {
                match self
                    .get_json::<Album>(&format!("/albums/{album_id}?key={key}"))
                    .await
                {
                    Ok(album) => link.assets = album.assets,
                    Err(e) => {
                        logger::log_error(&format!("Album {album_id} lookup failed: {e}"));
                    }
                }
            }
        }

        Some(link)
    }
}

#[async_trait]
impl AssetFetcher for ImmichClient {
    async fn fetch(
        &self,
        asset: &AssetReference,
        options: FetchOptions,
    ) -> Option<AssetFetchResult> {
        let url = self.api_url(&Self::asset_path(asset));
        let response = match self.send(Method::GET, &url, options.range.as_deref()).await {
            Ok(response) => response,
            Err(e) => {
                logger::log_error(&format!("Fetching {} {} failed: {e}", asset.kind, asset.id));
                return None;
            }
        };

        let status = response.status();
        if !(status.is_success() || status == StatusCode::RANGE_NOT_SATISFIABLE) {
            logger::log_warning(&format!(
                "{} {} unavailable upstream ({status})",
                asset.kind, asset.id
            ));
            return None;
        }

        let headers = HeaderBag::from(response.headers());
        let body = BodyDataStream::new(response.into_body())
            .map_err(FetchError::from)
            .boxed();

        Some(AssetFetchResult {
            status: status.as_u16(),
            headers,
            body,
        })
    }

    async fn content_type(&self, asset: &AssetReference) -> Option<String> {
        let url = self.api_url(&Self::asset_path(asset));
        match self.send(Method::HEAD, &url, None).await {
            Ok(response) if response.status().is_success() => response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
            Ok(response) => {
                logger::log_warning(&format!(
                    "Content type of {} {} unavailable ({})",
                    asset.kind,
                    asset.id,
                    response.status()
                ));
                None
            }
            Err(e) => {
                logger::log_error(&format!(
                    "Content type lookup for {} {} failed: {e}",
                    asset.kind, asset.id
                ));
                None
            }
        }
    }
}

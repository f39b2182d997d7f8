//! Gallery display records
//!
//! One record per servable asset of a shared link. Videos carry a playback
//! descriptor in the shape the front-end lightbox expects in `data-video`.

use futures_util::future::join_all;
use serde::Serialize;

use crate::http::mime;
use crate::immich::urls::{photo_url, video_url};
use crate::immich::{Asset, SharedLink};
use crate::logger;
use crate::stream::{AssetFetcher, AssetKind, AssetReference, ImageSize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoSource {
    pub src: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoAttributes {
    pub preload: bool,
    pub controls: bool,
}

/// Playback descriptor of a video item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoPlayback {
    pub source: Vec<VideoSource>,
    pub attributes: VideoAttributes,
}

impl VideoPlayback {
    pub fn new(src: String, content_type: String) -> Self {
        Self {
            source: vec![VideoSource { src, content_type }],
            attributes: VideoAttributes {
                preload: false,
                controls: true,
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to serialize video descriptor: {e}"));
            String::new()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryMedia {
    Photo,
    Video { playback: VideoPlayback },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub original_url: String,
    pub thumbnail_url: String,
    pub media: GalleryMedia,
}

/// Build display records for every photo and video of `link`, in share order
pub async fn build_items<F>(fetcher: &F, link: &SharedLink) -> Vec<GalleryItem>
where
    F: AssetFetcher + ?Sized,
{
    let items = link.assets.iter().filter_map(|asset| {
        asset
            .kind()
            .map(|kind| build_item(fetcher, &link.key, asset, kind))
    });
    join_all(items).await
}

async fn build_item<F>(fetcher: &F, key: &str, asset: &Asset, kind: AssetKind) -> GalleryItem
where
    F: AssetFetcher + ?Sized,
{
    let media = match kind {
        AssetKind::Photo => GalleryMedia::Photo,
        AssetKind::Video => {
            let reference = AssetReference::new(key, asset.id.as_str(), AssetKind::Video);
            let content_type = match fetcher.content_type(&reference).await {
                Some(content_type) => content_type,
                None => fallback_content_type(asset),
            };
            GalleryMedia::Video {
                playback: VideoPlayback::new(video_url(key, &asset.id), content_type),
            }
        }
    };

    GalleryItem {
        original_url: photo_url(key, &asset.id, None),
        thumbnail_url: photo_url(key, &asset.id, Some(ImageSize::Thumbnail)),
        media,
    }
}

/// Content type from Immich metadata when the upstream lookup fails
fn fallback_content_type(asset: &Asset) -> String {
    asset.original_mime_type.clone().unwrap_or_else(|| {
        mime::content_type_for_file_name(asset.original_file_name.as_deref().unwrap_or_default())
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{AssetFetchResult, FetchOptions};
    use async_trait::async_trait;

    /// Fetcher that only knows the content type of video "v1"
    struct StubFetcher;

    #[async_trait]
    impl AssetFetcher for StubFetcher {
        async fn fetch(&self, _: &AssetReference, _: FetchOptions) -> Option<AssetFetchResult> {
            None
        }

        async fn content_type(&self, asset: &AssetReference) -> Option<String> {
            (asset.id == "v1").then(|| "video/webm".to_string())
        }
    }

    fn link() -> SharedLink {
        serde_json::from_str(
            r#"{"key": "k", "type": "INDIVIDUAL", "assets": [
                {"id": "p1", "type": "IMAGE"},
                {"id": "x1", "type": "OTHER"},
                {"id": "v1", "type": "VIDEO"},
                {"id": "v2", "type": "VIDEO", "originalMimeType": "video/quicktime"},
                {"id": "v3", "type": "VIDEO", "originalFileName": "clip.MP4"}
            ]}"#,
        )
        .unwrap()
    }

    fn video_type(item: &GalleryItem) -> &str {
        match &item.media {
            GalleryMedia::Video { playback } => &playback.source[0].content_type,
            GalleryMedia::Photo => panic!("expected video"),
        }
    }

    #[tokio::test]
    async fn test_items_follow_share_order() {
        let items = build_items(&StubFetcher, &link()).await;
        assert_eq!(items.len(), 4);

        assert_eq!(items[0].original_url, "/share/photo/k/p1");
        assert_eq!(items[0].thumbnail_url, "/share/photo/k/p1/thumbnail");
        assert_eq!(items[0].media, GalleryMedia::Photo);

        assert_eq!(items[1].original_url, "/share/photo/k/v1");
        match &items[1].media {
            GalleryMedia::Video { playback } => {
                assert_eq!(playback.source[0].src, "/share/video/k/v1");
            }
            GalleryMedia::Photo => panic!("expected video"),
        }
    }

    #[tokio::test]
    async fn test_video_content_type_fallbacks() {
        let items = build_items(&StubFetcher, &link()).await;
        assert_eq!(video_type(&items[1]), "video/webm");
        assert_eq!(video_type(&items[2]), "video/quicktime");
        assert_eq!(video_type(&items[3]), "video/mp4");
    }

    #[test]
    fn test_playback_json_shape() {
        let playback = VideoPlayback::new("/share/video/k/v1".to_string(), "video/mp4".to_string());
        let value: serde_json::Value = serde_json::from_str(&playback.to_json()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "source": [{"src": "/share/video/k/v1", "type": "video/mp4"}],
                "attributes": {"preload": false, "controls": true}
            })
        );
    }
}

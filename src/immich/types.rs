// Immich API payloads
// Only the fields the relay reads are modelled; everything else is ignored.

use serde::Deserialize;

use crate::stream::AssetKind;

/// Asset type as reported by Immich
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteAssetType {
    Image,
    Video,
    #[serde(other)]
    Other,
}

/// Asset entry of a shared link or album
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: RemoteAssetType,
    #[serde(default)]
    pub original_file_name: Option<String>,
    #[serde(default)]
    pub original_mime_type: Option<String>,
}

impl Asset {
    /// Relay media kind, `None` for types the relay does not serve
    pub const fn kind(&self) -> Option<AssetKind> {
        match self.asset_type {
            RemoteAssetType::Image => Some(AssetKind::Photo),
            RemoteAssetType::Video => Some(AssetKind::Video),
            RemoteAssetType::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SharedLinkType {
    Album,
    Individual,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Shared link as returned by `/api/shared-links/me`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SharedLink {
    pub key: String,
    #[serde(rename = "type")]
    pub link_type: SharedLinkType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl SharedLink {
    /// Asset of this share with the given id and a servable kind
    pub fn find_asset(&self, id: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|asset| asset.id == id && asset.kind().is_some())
    }

    /// Page title: description, then album name
    pub fn title(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| self.album.as_ref().and_then(|a| a.album_name.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDIVIDUAL_LINK: &str = r#"{
        "id": "link-1",
        "key": "abcDEF_123-xyz",
        "type": "INDIVIDUAL",
        "description": "Holiday",
        "allowDownload": true,
        "assets": [
            {"id": "a1", "type": "IMAGE", "originalFileName": "IMG_1.HEIC", "originalMimeType": "image/heic"},
            {"id": "a2", "type": "VIDEO", "originalFileName": "clip.mov"},
            {"id": "a3", "type": "AUDIO"}
        ]
    }"#;

    #[test]
    fn test_parse_individual_link() {
        let link: SharedLink = serde_json::from_str(INDIVIDUAL_LINK).unwrap();
        assert_eq!(link.link_type, SharedLinkType::Individual);
        assert_eq!(link.assets.len(), 3);
        assert_eq!(link.assets[0].kind(), Some(AssetKind::Photo));
        assert_eq!(link.assets[1].kind(), Some(AssetKind::Video));
        assert_eq!(link.assets[1].original_mime_type, None);
        assert_eq!(link.assets[2].asset_type, RemoteAssetType::Other);
        assert_eq!(link.title(), Some("Holiday"));
    }

    #[test]
    fn test_find_asset_skips_unservable() {
        let link: SharedLink = serde_json::from_str(INDIVIDUAL_LINK).unwrap();
        assert!(link.find_asset("a1").is_some());
        assert!(link.find_asset("a3").is_none());
        assert!(link.find_asset("missing").is_none());
    }

    #[test]
    fn test_album_title_fallback() {
        let link: SharedLink = serde_json::from_str(
            r#"{"key": "k", "type": "ALBUM", "description": "",
                "album": {"id": "al-1", "albumName": "Wedding"}}"#,
        )
        .unwrap();
        assert_eq!(link.link_type, SharedLinkType::Album);
        assert!(link.assets.is_empty());
        assert_eq!(link.title(), Some("Wedding"));
    }
}

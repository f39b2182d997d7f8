//! Local URL layout for shared assets
//!
//! The same paths are produced here for gallery markup and parsed by the
//! router, so the two cannot drift apart.

use crate::stream::ImageSize;

/// Prefix of every share route
pub const SHARE_PREFIX: &str = "/share";

/// Whether `token` is acceptable as a share key or asset id
///
/// Anything outside `[A-Za-z0-9_-]` is rejected before it reaches an upstream
/// URL.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Gallery page of a share
pub fn gallery_url(key: &str) -> String {
    format!("{SHARE_PREFIX}/{key}")
}

/// Photo bytes, optionally in a specific size
pub fn photo_url(key: &str, id: &str, size: Option<ImageSize>) -> String {
    match size {
        Some(size) => format!("{SHARE_PREFIX}/photo/{key}/{id}/{size}"),
        None => format!("{SHARE_PREFIX}/photo/{key}/{id}"),
    }
}

/// Video playback bytes
pub fn video_url(key: &str, id: &str) -> String {
    format!("{SHARE_PREFIX}/video/{key}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tokens() {
        assert!(is_valid_token("abcDEF_123-xyz"));
        assert!(is_valid_token("3f2a9c1e-0b7d-4f4e-9a51-2c8e7d6b5a40"));
        assert!(!is_valid_token(""));
        assert!(!is_valid_token("../etc"));
        assert!(!is_valid_token("key?x=1"));
        assert!(!is_valid_token("k%20"));
    }

    #[test]
    fn test_urls() {
        assert_eq!(gallery_url("k"), "/share/k");
        assert_eq!(photo_url("k", "a1", None), "/share/photo/k/a1");
        assert_eq!(
            photo_url("k", "a1", Some(ImageSize::Thumbnail)),
            "/share/photo/k/a1/thumbnail"
        );
        assert_eq!(video_url("k", "v1"), "/share/video/k/v1");
    }
}

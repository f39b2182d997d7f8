//! Case-insensitive header mapping
//!
//! Upstream header names arrive in whatever case the remote service chose.
//! `HeaderBag` normalizes lookup so the forwarding allow-list behaves the same
//! regardless of where the headers came from.

use hyper::HeaderMap;
use std::collections::HashMap;

/// String-keyed header map with ASCII case-insensitive lookup
///
/// The last value inserted for a name wins. The original spelling of the name
/// is kept for iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: HashMap<String, (String, String)>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a header value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .insert(name.to_ascii_lowercase(), (name, value.into()));
    }

    /// Look up a header value, ignoring case of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate as (original name, value) pairs, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for HeaderBag
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (name, value) in iter {
            bag.insert(name, value);
        }
        bag
    }
}

/// Copy a hyper `HeaderMap`, skipping values that are not valid visible ASCII
impl From<&HeaderMap> for HeaderBag {
    fn from(map: &HeaderMap) -> Self {
        map.iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderValue, CONTENT_TYPE, ETAG};

    #[test]
    fn test_lookup_ignores_case() {
        let mut bag = HeaderBag::new();
        bag.insert("Content-Type", "image/jpeg");
        assert_eq!(bag.get("content-type"), Some("image/jpeg"));
        assert_eq!(bag.get("CONTENT-TYPE"), Some("image/jpeg"));
        assert!(bag.contains("Content-type"));
        assert_eq!(bag.get("etag"), None);
    }

    #[test]
    fn test_insert_replaces_regardless_of_case() {
        let mut bag = HeaderBag::new();
        bag.insert("ETag", "\"a\"");
        bag.insert("etag", "\"b\"");
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get("ETAG"), Some("\"b\""));
        assert_eq!(bag.iter().next(), Some(("etag", "\"b\"")));
    }

    #[test]
    fn test_from_header_map() {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
        map.insert(ETAG, HeaderValue::from_static("\"v1\""));
        map.insert("x-binary", HeaderValue::from_bytes(b"\xff\xfe").unwrap());

        let bag = HeaderBag::from(&map);
        assert_eq!(bag.get("Content-Type"), Some("video/mp4"));
        assert_eq!(bag.get("ETag"), Some("\"v1\""));
        assert!(!bag.contains("x-binary"));
    }
}

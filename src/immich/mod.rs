//! Immich integration
//!
//! Shared-link lookup and asset fetching against an Immich server, plus the
//! local URL layout the relay exposes for shared assets.

pub mod client;
pub mod types;
pub mod urls;

pub use client::ImmichClient;
pub use types::{Album, Asset, RemoteAssetType, SharedLink, SharedLinkType};

//! Asset streaming core
//!
//! Moves a fetched asset's bytes to a local client with the upstream's HTTP
//! semantics, stopping as soon as the client goes away.

pub mod connection;
pub mod fetch;
pub mod responder;
pub mod watcher;

pub use connection::{response_channel, ClientConnection, ConnectionClosed, HyperConnection};
pub use fetch::{
    AssetBody, AssetFetchResult, AssetFetcher, AssetKind, AssetReference, FetchError,
    FetchOptions, ImageSize,
};
pub use responder::{deliver, Delivery, FORWARDED_HEADERS};
pub use watcher::CancellationWatcher;

//! Shared-gallery relay for Immich
//!
//! Serves the photos and videos of Immich shared links to anonymous viewers,
//! streaming asset bytes from the upstream server chunk by chunk and stopping
//! as soon as the viewer goes away.

pub mod config;
pub mod gallery;
pub mod handler;
pub mod http;
pub mod immich;
pub mod logger;
pub mod server;
pub mod stream;

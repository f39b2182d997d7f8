//! Shared gallery view
//!
//! Display records assembled from a shared link, and the page that lists them.

pub mod items;
pub mod page;

pub use items::{build_items, GalleryItem, GalleryMedia, VideoPlayback};
pub use page::{render_page, PageContext};

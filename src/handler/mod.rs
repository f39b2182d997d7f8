//! Request handler module
//!
//! Responsible for request routing dispatch and the shared-link handlers:
//! asset streaming and the gallery page.

pub mod router;
pub mod share;

// Re-export main entry point
pub use router::handle_request;

//! HTTP protocol layer module
//!
//! Protocol helpers shared by the streaming core and the handlers, decoupled
//! from any Immich-specific logic.

pub mod body;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use headers::HeaderBag;
pub use response::{
    build_404_response, build_405_response, build_502_response, build_health_response,
    build_html_response, build_options_response,
};

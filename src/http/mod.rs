//! HTTP protocol layer module
//!
//! Media type mapping and response builders, shared by the direct file
//! server and the proxy.

pub mod mime;
pub mod response;

// Re-export commonly used items
pub use response::{
    build_404_response, build_405_response, build_empty_response, build_file_response,
    build_health_response, build_json_response, build_options_response, build_text_response,
    Disposition,
};

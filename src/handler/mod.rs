//! Request handler module
//!
//! Routes `/api/files/...` (file server) or `/api/web/files/...` (proxy)
//! requests to the file operations and builds their responses.

mod backend;
pub mod files;
pub mod router;

pub use backend::Backend;
// Re-export main entry point
pub use router::handle_request;

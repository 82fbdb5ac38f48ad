//! filebridge
//!
//! A file server that lists and serves files from a managed root directory,
//! and a web proxy that exposes the same routes by forwarding them to a file
//! server over HTTP. Both run from the same binary; `mode` picks one.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;
pub mod upstream;

//! HTTP and WebSocket front end for the arena tournament service.
//!
//! The binary in `main.rs` wires configuration, the document store and the
//! object store into [`api::create_router`]; integration tests build the same
//! router over in-memory stores.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;

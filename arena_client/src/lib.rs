//! Internal modules for the arena client.
//!
//! This library provides routing, session state, command parsing, the API
//! client, and page rendering used by the arena_client binary.

pub mod api_client;
pub mod commands;
pub mod routes;
pub mod session;
pub mod views;
pub mod websocket_client;
pub mod wizard;

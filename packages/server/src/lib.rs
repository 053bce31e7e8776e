//! Room-based WebSocket chat server.
//!
//! Authenticated users join named rooms, exchange text and audio messages,
//! receive recent history on join and observe the live list of known rooms.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::run as run_server;

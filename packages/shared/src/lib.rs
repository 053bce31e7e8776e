//! Shared utilities for the Tagarela chat server.

pub mod logger;
pub mod time;

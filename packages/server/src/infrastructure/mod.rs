//! Infrastructure layer: store implementations, password hashing and wire DTOs.

pub mod dto;
pub mod password;
pub mod repository;

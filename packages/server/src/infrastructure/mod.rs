//! Infrastructure layer
//!
//! Repository implementations, the connection hub, wire codecs and DTOs.

pub mod codec;
pub mod dto;
pub mod hub;
pub mod repository;

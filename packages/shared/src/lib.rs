//! Utilities shared by the duelhub binaries and tests.

pub mod logger;
pub mod time;

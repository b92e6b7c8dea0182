//! Repository 実装
//!
//! ドメイン層が定義する Repository trait の具体的な実装を提供します。

pub mod json_file;

pub use json_file::{JsonResultRepository, JsonRoomRepository, JsonUserRepository};

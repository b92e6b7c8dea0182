//! JSON ファイルを永続化先とする Repository 実装

mod collection;
mod result;
mod room;
mod user;

pub use result::{JsonResultRepository, RESULTS_FILE};
pub use room::{JsonRoomRepository, ROOMS_FILE};
pub use user::{JsonUserRepository, USERS_FILE};

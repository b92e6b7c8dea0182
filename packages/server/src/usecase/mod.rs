//! UseCase layer
//!
//! 1 ユースケース = 1 構造体。Repository trait（Domain 層）にのみ依存する。

mod connect_player;
mod create_room;
mod disconnect_player;
mod error;
mod finish_game;
mod join_room;
mod list_rooms;
mod login;
mod logout;
mod membership;
mod register_user;
mod reset_sessions;
mod start_game;

pub use connect_player::ConnectPlayerUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_player::DisconnectPlayerUseCase;
pub use error::{ConnectError, CreateRoomError, JoinRoomError, LoginError, RegisterError};
pub use finish_game::{FinishGameUseCase, GameOutcome};
pub use join_room::JoinRoomUseCase;
pub use list_rooms::ListRoomsUseCase;
pub use login::LoginUseCase;
pub use logout::LogoutUseCase;
pub use membership::{RoomLock, new_room_lock};
pub use register_user::RegisterUserUseCase;
pub use reset_sessions::{ResetSessionsUseCase, ResetSummary};
pub use start_game::StartGameUseCase;

//! UseCase: ログアウト
//!
//! WebSocket 接続が無い場合（HTTP の `/user/logout`）に使う。接続がある場合は
//! Hub が接続を切り、後始末は [`super::DisconnectPlayerUseCase`] が行う。

use std::sync::Arc;

use crate::domain::{RepositoryError, RoomRepository, UserRepository, Username};

use super::membership::{RoomLock, sign_out_player};

/// ログアウトのユースケース
pub struct LogoutUseCase {
    users: Arc<dyn UserRepository>,
    rooms: Arc<dyn RoomRepository>,
    room_lock: RoomLock,
}

impl LogoutUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        rooms: Arc<dyn RoomRepository>,
        room_lock: RoomLock,
    ) -> Self {
        Self {
            users,
            rooms,
            room_lock,
        }
    }

    /// 存在しないユーザー名は何もせず `Ok(false)`
    pub async fn execute(&self, username: &str) -> Result<bool, RepositoryError> {
        let Ok(username) = Username::new(username.to_string()) else {
            return Ok(false);
        };
        let _guard = self.room_lock.lock().await;
        let found = sign_out_player(&self.users, &self.rooms, &username).await?;
        if found {
            tracing::info!("User '{}' logged out", username);
        }
        Ok(found)
    }
}

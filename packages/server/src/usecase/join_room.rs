//! UseCase: Room 参加
//!
//! 判定順は「存在しない → ゲーム中 → 満員 → 参加済み」。最初に該当した理由で拒否する。

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository, UserRepository, Username};

use super::{
    error::JoinRoomError,
    membership::{RoomLock, assign_room, leave_room},
};

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    users: Arc<dyn UserRepository>,
    rooms: Arc<dyn RoomRepository>,
    room_lock: RoomLock,
}

impl JoinRoomUseCase {
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

    /// # Returns
    ///
    /// * `Ok(Room)` - 参加後の Room（2 人以上なら `Ready`）
    /// * `Err(JoinRoomError)` - 拒否理由
    pub async fn execute(&self, username: &Username, room_id: &str) -> Result<Room, JoinRoomError> {
        let room_id = RoomId::new(room_id.to_string()).map_err(|_| JoinRoomError::RoomNotFound)?;

        let _guard = self.room_lock.lock().await;
        let mut room = self
            .rooms
            .get_by_id(&room_id)
            .await
            .ok_or(JoinRoomError::RoomNotFound)?;
        room.admit(username.clone())?;

        // 他の Room に居た場合は先に抜ける
        let previous = self
            .users
            .find_by_username(username)
            .await
            .and_then(|user| user.room_id)
            .filter(|previous| previous != &room_id);
        if let Some(previous) = previous {
            leave_room(&self.rooms, username, &previous).await?;
        }

        if !self.rooms.update(room.clone()).await? {
            return Err(JoinRoomError::RoomNotFound);
        }
        assign_room(&self.users, username, Some(room_id)).await?;

        tracing::info!(
            "Player '{}' joined room '{}' ({}/{})",
            username,
            room.id,
            room.players.len(),
            room.max_players
        );
        Ok(room)
    }
}

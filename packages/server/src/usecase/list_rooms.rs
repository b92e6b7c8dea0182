//! UseCase: ロビー用の Room 一覧

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

pub struct ListRoomsUseCase {
    rooms: Arc<dyn RoomRepository>,
}

impl ListRoomsUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    /// ゲーム中でない Room を作成順に返す
    pub async fn execute(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .list()
            .await
            .into_iter()
            .filter(Room::is_listed)
            .collect();
        rooms.sort_by_key(|room| room.created_at);
        rooms
    }
}

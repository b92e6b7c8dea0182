//! JSON ファイル版 RoomRepository（`rooms.json`）

use std::path::Path;

use async_trait::async_trait;

use super::collection::JsonCollection;
use crate::domain::{RepositoryError, Room, RoomId, RoomRepository};

pub const ROOMS_FILE: &str = "rooms.json";

pub struct JsonRoomRepository {
    rooms: JsonCollection<Room>,
}

impl JsonRoomRepository {
    pub async fn open(data_dir: &Path) -> Result<Self, RepositoryError> {
        Ok(Self {
            rooms: JsonCollection::open("rooms", data_dir.join(ROOMS_FILE)).await?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            rooms: JsonCollection::in_memory("rooms"),
        }
    }
}

#[async_trait]
impl RoomRepository for JsonRoomRepository {
    async fn add(&self, room: Room) -> Result<(), RepositoryError> {
        self.rooms
            .mutate(|rooms| {
                rooms.push(room);
                true
            })
            .await
            .map(|_| ())
    }

    async fn get_by_id(&self, id: &RoomId) -> Option<Room> {
        self.rooms.find(|r| &r.id == id).await
    }

    async fn list(&self) -> Vec<Room> {
        self.rooms.snapshot().await
    }

    async fn update(&self, room: Room) -> Result<bool, RepositoryError> {
        self.rooms
            .mutate(|rooms| match rooms.iter_mut().find(|r| r.id == room.id) {
                Some(slot) => {
                    *slot = room;
                    true
                }
                None => false,
            })
            .await
    }

    async fn remove(&self, id: &RoomId) -> Result<bool, RepositoryError> {
        self.rooms
            .mutate(|rooms| {
                let before = rooms.len();
                rooms.retain(|r| &r.id != id);
                rooms.len() != before
            })
            .await
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.rooms
            .mutate(|rooms| {
                rooms.clear();
                true
            })
            .await
            .map(|_| ())
    }
}

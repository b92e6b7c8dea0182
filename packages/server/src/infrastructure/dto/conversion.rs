//! Conversion logic between DTOs and domain entities.

use crate::domain::entity::Room;
use crate::infrastructure::dto::websocket::RoomInfo;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&Room> for RoomInfo {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            name: room.name.clone(),
            host: room.host_id.as_str().to_string(),
            players: room
                .players
                .iter()
                .map(|player| player.as_str().to_string())
                .collect(),
            max_players: room.max_players,
            status: room.status.as_str().to_string(),
        }
    }
}

impl From<Room> for RoomInfo {
    fn from(room: Room) -> Self {
        Self::from(&room)
    }
}

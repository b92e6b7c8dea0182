//! Identifier factories.

use uuid::Uuid;

use super::{error::ValueObjectError, value_object::RoomId};

/// RoomId の生成
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// `room_<uuid>` 形式の新しい RoomId を生成
    pub fn generate() -> Result<RoomId, ValueObjectError> {
        RoomId::new(format!("room_{}", Uuid::new_v4().simple()))
    }
}

/// GameResult の ID 生成
pub struct ResultIdFactory;

impl ResultIdFactory {
    pub fn generate() -> String {
        format!("result_{}", Uuid::new_v4().simple())
    }
}

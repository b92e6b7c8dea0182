//! UseCase: ゲーム開始（ホストのみ）

use std::sync::Arc;

use duelhub_shared::time::Clock;

use crate::domain::{RepositoryError, Room, RoomId, RoomRepository, Timestamp, Username};

use super::membership::RoomLock;

pub struct StartGameUseCase {
    rooms: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
    room_lock: RoomLock,
}

impl StartGameUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>, room_lock: RoomLock) -> Self {
        Self {
            rooms,
            clock,
            room_lock,
        }
    }

    /// Room を `Playing` にする
    ///
    /// Room が無い、または要求者がホストでない場合は何もせず `Ok(None)`。
    pub async fn execute(
        &self,
        requested_by: &Username,
        room_id: &RoomId,
    ) -> Result<Option<Room>, RepositoryError> {
        let _guard = self.room_lock.lock().await;
        let Some(mut room) = self.rooms.get_by_id(room_id).await else {
            return Ok(None);
        };
        if !room.start(requested_by, Timestamp::new(self.clock.now_millis())) {
            tracing::warn!(
                "Ignoring start_game from '{}': not the host of '{}'",
                requested_by,
                room_id
            );
            return Ok(None);
        }
        if !self.rooms.update(room.clone()).await? {
            return Ok(None);
        }

        tracing::info!("Game started in room '{}'", room_id);
        Ok(Some(room))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::RoomStatus, infrastructure::repository::JsonRoomRepository,
        usecase::membership::new_room_lock,
    };
    use duelhub_shared::time::ManualClock;

    fn username(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_only_host_can_start() {
        // テスト項目: ホスト以外の開始要求は無視され、ホストなら Playing になる
        // given (前提条件):
        let rooms = Arc::new(JsonRoomRepository::in_memory());
        let room_id = RoomId::new("room_1".to_string()).unwrap();
        let mut room = Room::new(
            room_id.clone(),
            "duel".to_string(),
            username("alice"),
            2,
            Timestamp::new(0),
        );
        room.admit(username("bob")).unwrap();
        rooms.add(room).await.unwrap();
        let usecase = StartGameUseCase::new(
            rooms.clone(),
            Arc::new(ManualClock::new(9_000)),
            new_room_lock(),
        );

        // when (操作):
        let by_guest = usecase.execute(&username("bob"), &room_id).await.unwrap();
        let status_after_guest = rooms.get_by_id(&room_id).await.unwrap().status;
        let by_host = usecase.execute(&username("alice"), &room_id).await.unwrap();

        // then (期待する結果):
        assert!(by_guest.is_none());
        assert_eq!(status_after_guest, RoomStatus::Ready);
        let started = by_host.unwrap();
        assert_eq!(started.status, RoomStatus::Playing);
        assert_eq!(started.started_at, Some(Timestamp::new(9_000)));
        assert_eq!(rooms.get_by_id(&room_id).await.unwrap(), started);
    }

    #[tokio::test]
    async fn test_start_missing_room_is_noop() {
        // テスト項目: 存在しない Room の開始要求は何もしない
        // given (前提条件):
        let usecase = StartGameUseCase::new(
            Arc::new(JsonRoomRepository::in_memory()),
            Arc::new(ManualClock::new(0)),
            new_room_lock(),
        );

        // when (操作):
        let result = usecase
            .execute(&username("alice"), &RoomId::new("room_x".to_string()).unwrap())
            .await;

        // then (期待する結果):
        assert!(result.unwrap().is_none());
    }
}

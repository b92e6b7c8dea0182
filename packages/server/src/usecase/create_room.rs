//! UseCase: Room 作成

use std::sync::Arc;

use duelhub_shared::time::Clock;

use crate::domain::{
    Room, RoomIdFactory, RoomRepository, Timestamp, UserRepository, Username,
};

use super::{
    error::CreateRoomError,
    membership::{RoomLock, assign_room, leave_room},
};

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    users: Arc<dyn UserRepository>,
    rooms: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
    room_lock: RoomLock,
}

impl CreateRoomUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        rooms: Arc<dyn RoomRepository>,
        clock: Arc<dyn Clock>,
        room_lock: RoomLock,
    ) -> Self {
        Self {
            users,
            rooms,
            clock,
            room_lock,
        }
    }

    /// ホストだけが参加した `Waiting` の Room を作り、ホストの所属 Room にする
    ///
    /// ホストが別の Room に参加していた場合は先にそこから外す。
    pub async fn execute(
        &self,
        host: &Username,
        name: String,
        max_players: usize,
    ) -> Result<Room, CreateRoomError> {
        let _guard = self.room_lock.lock().await;

        let user = self
            .users
            .find_by_username(host)
            .await
            .ok_or_else(|| CreateRoomError::UnknownUser(host.as_str().to_string()))?;
        if let Some(previous) = &user.room_id {
            leave_room(&self.rooms, host, previous).await?;
        }

        let room = Room::new(
            RoomIdFactory::generate()?,
            name,
            host.clone(),
            max_players,
            Timestamp::new(self.clock.now_millis()),
        );
        self.rooms.add(room.clone()).await?;
        assign_room(&self.users, host, Some(room.id.clone())).await?;

        tracing::info!("Player '{}' created room '{}' ({})", host, room.name, room.id);
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomStatus, User},
        infrastructure::repository::{JsonRoomRepository, JsonUserRepository},
        usecase::membership::new_room_lock,
    };
    use duelhub_shared::time::ManualClock;

    fn username(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    async fn create_usecase() -> (
        CreateRoomUseCase,
        Arc<JsonUserRepository>,
        Arc<JsonRoomRepository>,
    ) {
        let users = Arc::new(JsonUserRepository::in_memory());
        users
            .add(User::new(username("alice"), "secret1".into(), "a@x".into()))
            .await
            .unwrap();
        let rooms = Arc::new(JsonRoomRepository::in_memory());
        let usecase = CreateRoomUseCase::new(
            users.clone(),
            rooms.clone(),
            Arc::new(ManualClock::new(5_000)),
            new_room_lock(),
        );
        (usecase, users, rooms)
    }

    #[tokio::test]
    async fn test_create_room_success() {
        // テスト項目: 作成した Room はホストのみ参加の Waiting で、ホストの所属 Room になる
        // given (前提条件):
        let (usecase, users, rooms) = create_usecase().await;

        // when (操作):
        let room = usecase
            .execute(&username("alice"), "duel".to_string(), 2)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.players, vec![username("alice")]);
        assert_eq!(room.created_at, Timestamp::new(5_000));
        assert!(rooms.get_by_id(&room.id).await.is_some());
        let alice = users.find_by_username(&username("alice")).await.unwrap();
        assert_eq!(alice.room_id, Some(room.id));
    }

    #[tokio::test]
    async fn test_create_room_leaves_previous_room() {
        // テスト項目: 別の Room に居るホストが新しく作ると、前の Room から外れる
        // given (前提条件):
        let (usecase, _users, rooms) = create_usecase().await;
        let first = usecase
            .execute(&username("alice"), "first".to_string(), 2)
            .await
            .unwrap();

        // when (操作):
        let second = usecase
            .execute(&username("alice"), "second".to_string(), 2)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(rooms.get_by_id(&first.id).await.is_none());
        assert_eq!(rooms.list().await, vec![second]);
    }

    #[tokio::test]
    async fn test_create_room_unknown_host() {
        // テスト項目: 存在しないユーザーは Room を作成できない
        // given (前提条件):
        let (usecase, _users, rooms) = create_usecase().await;

        // when (操作):
        let result = usecase
            .execute(&username("ghost"), "duel".to_string(), 2)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CreateRoomError::UnknownUser(_))));
        assert!(rooms.list().await.is_empty());
    }
}

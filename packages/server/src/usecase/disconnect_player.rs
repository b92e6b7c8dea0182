//! UseCase: 切断されたプレイヤーの後始末
//!
//! Hub が接続を破棄するたびに（正常切断・溢れ・心拍タイムアウト・ログアウト）
//! [`PlayerPresence`] 経由で 1 回だけ呼ばれる。
//!
//! - User をオフラインにし、所属 Room をクリアする
//! - 参加していた Room から外す（ホストは次のプレイヤーへ、空になった Room は削除）

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{PlayerPresence, RepositoryError, RoomRepository, UserRepository, Username};

use super::membership::{RoomLock, sign_out_player};

/// プレイヤー切断のユースケース
pub struct DisconnectPlayerUseCase {
    users: Arc<dyn UserRepository>,
    rooms: Arc<dyn RoomRepository>,
    room_lock: RoomLock,
}

impl DisconnectPlayerUseCase {
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

    /// ユーザーが存在すれば `true`
    pub async fn execute(&self, username: &Username) -> Result<bool, RepositoryError> {
        let _guard = self.room_lock.lock().await;
        sign_out_player(&self.users, &self.rooms, username).await
    }
}

#[async_trait]
impl PlayerPresence for DisconnectPlayerUseCase {
    async fn player_disconnected(&self, username: &Username) {
        match self.execute(username).await {
            Ok(true) => tracing::info!("Player '{}' is now offline", username),
            Ok(false) => tracing::debug!("Disconnected player '{}' has no account", username),
            Err(e) => tracing::warn!("Failed to release player '{}': {}", username, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, Room, RoomId, RoomStatus, Timestamp, User},
        infrastructure::repository::{JsonRoomRepository, JsonUserRepository},
        usecase::membership::new_room_lock,
    };

    fn username(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    fn room_id(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    async fn seed() -> (
        DisconnectPlayerUseCase,
        Arc<JsonUserRepository>,
        Arc<JsonRoomRepository>,
    ) {
        let users = Arc::new(JsonUserRepository::in_memory());
        let rooms = Arc::new(JsonRoomRepository::in_memory());
        for name in ["alice", "bob"] {
            let mut user = User::new(username(name), "secret1".into(), format!("{name}@x"));
            user.online = true;
            user.room_id = Some(room_id("room_1"));
            users.add(user).await.unwrap();
        }
        let mut room = Room::new(
            room_id("room_1"),
            "duel".to_string(),
            username("alice"),
            2,
            Timestamp::new(0),
        );
        room.admit(username("bob")).unwrap();
        rooms.add(room).await.unwrap();

        let usecase = DisconnectPlayerUseCase::new(users.clone(), rooms.clone(), new_room_lock());
        (usecase, users, rooms)
    }

    #[tokio::test]
    async fn test_disconnect_host_hands_over_room() {
        // テスト項目: ホストが切断されるとオフラインになり、ホストが移って Waiting に戻る
        // given (前提条件):
        let (usecase, users, rooms) = seed().await;

        // when (操作):
        usecase.player_disconnected(&username("alice")).await;

        // then (期待する結果):
        let alice = users.find_by_username(&username("alice")).await.unwrap();
        assert!(!alice.online);
        assert_eq!(alice.room_id, None);
        let room = rooms.get_by_id(&room_id("room_1")).await.unwrap();
        assert_eq!(room.host_id, username("bob"));
        assert_eq!(room.players, vec![username("bob")]);
        assert_eq!(room.status, RoomStatus::Waiting);
    }

    #[tokio::test]
    async fn test_disconnect_last_player_removes_room() {
        // テスト項目: 最後のプレイヤーが切断されると Room は削除される
        // given (前提条件):
        let (usecase, _users, rooms) = seed().await;
        usecase.execute(&username("alice")).await.unwrap();

        // when (操作):
        let result = usecase.execute(&username("bob")).await;

        // then (期待する結果):
        assert!(result.unwrap());
        assert!(rooms.get_by_id(&room_id("room_1")).await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_unknown_player_is_noop() {
        // テスト項目: アカウントの無いプレイヤーの切断は何も変更しない
        // given (前提条件):
        let (usecase, _users, rooms) = seed().await;

        // when (操作):
        let result = usecase.execute(&username("mallory")).await;

        // then (期待する結果):
        assert!(!result.unwrap());
        assert_eq!(
            rooms.get_by_id(&room_id("room_1")).await.unwrap().players.len(),
            2
        );
    }

    #[tokio::test]
    async fn test_presence_swallows_store_failure() {
        // テスト項目: 永続化に失敗しても presence フックはパニックしない
        // given (前提条件):
        let users = Arc::new(JsonUserRepository::in_memory());
        let mut rooms = MockRoomRepository::new();
        rooms.expect_list().returning(|| {
            let mut room = Room::new(
                RoomId::new("room_1".to_string()).unwrap(),
                "duel".to_string(),
                Username::new("alice".to_string()).unwrap(),
                2,
                Timestamp::new(0),
            );
            room.admit(Username::new("bob".to_string()).unwrap()).unwrap();
            vec![room]
        });
        rooms.expect_get_by_id().returning(|id| {
            let mut room = Room::new(
                id.clone(),
                "duel".to_string(),
                Username::new("alice".to_string()).unwrap(),
                2,
                Timestamp::new(0),
            );
            room.admit(Username::new("bob".to_string()).unwrap()).unwrap();
            Some(room)
        });
        rooms.expect_update().returning(|_| {
            Err(RepositoryError::Persistence {
                collection: "rooms",
                reason: "read-only filesystem".to_string(),
            })
        });
        let usecase = DisconnectPlayerUseCase::new(users, Arc::new(rooms), new_room_lock());

        // when (操作):
        usecase.player_disconnected(&username("alice")).await;
        let result = usecase.execute(&username("alice")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::Persistence { .. })));
    }
}

//! UseCase: WebSocket 接続時のプレイヤー確認
//!
//! Hub への登録（重複チェック）は UI 層が行う。ここではログイン済みかどうかだけを
//! 確認し、接続にキャッシュする所属 Room を返す。

use std::sync::Arc;

use crate::domain::{RoomId, UserRepository, Username};

use super::error::ConnectError;

/// プレイヤー接続のユースケース
pub struct ConnectPlayerUseCase {
    users: Arc<dyn UserRepository>,
}

impl ConnectPlayerUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// # Returns
    ///
    /// * `Ok(Option<RoomId>)` - ログイン済み（所属 Room があれば返す）
    /// * `Err(ConnectError::NotLoggedIn)` - ユーザーが存在しないかオフライン
    pub async fn execute(&self, username: &Username) -> Result<Option<RoomId>, ConnectError> {
        match self.users.find_by_username(username).await {
            Some(user) if user.online => Ok(user.room_id),
            _ => Err(ConnectError::NotLoggedIn(username.as_str().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::User, infrastructure::repository::JsonUserRepository};

    fn username(value: &str) -> Username {
        Username::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_connect_requires_login() {
        // テスト項目: 存在しない・オフラインのユーザーは接続できず、オンラインなら所属 Room が返る
        // given (前提条件):
        let users = Arc::new(JsonUserRepository::in_memory());
        let mut alice = User::new(username("alice"), "secret1".into(), "a@x".into());
        alice.online = true;
        alice.room_id = Some(RoomId::new("room_1".to_string()).unwrap());
        users.add(alice).await.unwrap();
        users
            .add(User::new(username("bob"), "secret1".into(), "b@x".into()))
            .await
            .unwrap();
        let usecase = ConnectPlayerUseCase::new(users);

        // when (操作):
        let online = usecase.execute(&username("alice")).await;
        let offline = usecase.execute(&username("bob")).await;
        let unknown = usecase.execute(&username("carol")).await;

        // then (期待する結果):
        assert_eq!(online, Ok(Some(RoomId::new("room_1".to_string()).unwrap())));
        assert_eq!(offline, Err(ConnectError::NotLoggedIn("bob".to_string())));
        assert_eq!(unknown, Err(ConnectError::NotLoggedIn("carol".to_string())));
    }
}

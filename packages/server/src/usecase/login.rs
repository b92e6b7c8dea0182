//! UseCase: ログイン

use std::sync::Arc;

use duelhub_shared::time::{Clock, timestamp_to_rfc3339};

use crate::domain::{Timestamp, UserRepository, Username};

use super::error::LoginError;

/// ログインのユースケース
pub struct LoginUseCase {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl LoginUseCase {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// ユーザー存在 → パスワード一致 → 未ログイン の順に確認し、オンラインにする。
    ///
    /// 成功時はログインしたユーザー名を返す。
    pub async fn execute(&self, username: &str, password: &str) -> Result<Username, LoginError> {
        let username = Username::new(username.to_string()).map_err(|_| LoginError::UnknownUser)?;
        let mut user = self
            .users
            .find_by_username(&username)
            .await
            .ok_or(LoginError::UnknownUser)?;

        if user.password != password {
            return Err(LoginError::WrongPassword);
        }
        if user.online {
            return Err(LoginError::AlreadyOnline);
        }

        let now = self.clock.now_millis();
        user.sign_in(Timestamp::new(now));
        self.users.update(user).await?;
        tracing::info!(
            "User '{}' logged in at {}",
            username,
            timestamp_to_rfc3339(now)
        );
        Ok(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::User, infrastructure::repository::JsonUserRepository};
    use duelhub_shared::time::ManualClock;

    async fn create_usecase() -> (LoginUseCase, Arc<JsonUserRepository>) {
        let users = Arc::new(JsonUserRepository::in_memory());
        users
            .add(User::new(
                Username::new("alice".to_string()).unwrap(),
                "secret1".to_string(),
                "alice@example.com".to_string(),
            ))
            .await
            .unwrap();
        let clock = Arc::new(ManualClock::new(42_000));
        (LoginUseCase::new(users.clone(), clock), users)
    }

    #[tokio::test]
    async fn test_login_success_marks_user_online() {
        // テスト項目: ログインに成功するとオンラインになりログイン時刻が記録される
        // given (前提条件):
        let (usecase, users) = create_usecase().await;

        // when (操作):
        let result = usecase.execute("alice", "secret1").await;

        // then (期待する結果):
        let username = result.unwrap();
        let stored = users.find_by_username(&username).await.unwrap();
        assert!(stored.online);
        assert_eq!(stored.login_time, Some(Timestamp::new(42_000)));
    }

    #[tokio::test]
    async fn test_login_failures() {
        // テスト項目: 存在しないユーザー・パスワード違い・二重ログインは拒否される
        // given (前提条件):
        let (usecase, _users) = create_usecase().await;

        // when (操作):
        let unknown = usecase.execute("bob", "secret1").await;
        let wrong = usecase.execute("alice", "nope").await;
        usecase.execute("alice", "secret1").await.unwrap();
        let twice = usecase.execute("alice", "secret1").await;

        // then (期待する結果):
        assert!(matches!(unknown, Err(LoginError::UnknownUser)));
        assert!(matches!(wrong, Err(LoginError::WrongPassword)));
        assert!(matches!(twice, Err(LoginError::AlreadyOnline)));
    }
}

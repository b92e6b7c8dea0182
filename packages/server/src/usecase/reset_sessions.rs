//! UseCase: 起動時のセッションリセット
//!
//! 前回のプロセスが残した Room とオンライン状態を破棄する。起動直後は接続が
//! 1 つも無いので、すべての Room を削除し、全ユーザーをオフライン・Room 未所属にする。

use std::sync::Arc;

use crate::domain::{RepositoryError, RoomRepository, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSummary {
    pub rooms_cleared: usize,
    pub users_signed_out: usize,
}

pub struct ResetSessionsUseCase {
    users: Arc<dyn UserRepository>,
    rooms: Arc<dyn RoomRepository>,
}

impl ResetSessionsUseCase {
    pub fn new(users: Arc<dyn UserRepository>, rooms: Arc<dyn RoomRepository>) -> Self {
        Self { users, rooms }
    }

    pub async fn execute(&self) -> Result<ResetSummary, RepositoryError> {
        let rooms_cleared = self.rooms.list().await.len();
        self.rooms.clear().await?;

        let mut users_signed_out = 0;
        for mut user in self.users.list().await {
            if !user.online && user.room_id.is_none() {
                continue;
            }
            user.sign_out();
            self.users.update(user).await?;
            users_signed_out += 1;
        }

        tracing::info!(
            "Session reset: cleared {} room(s), signed out {} user(s)",
            rooms_cleared,
            users_signed_out
        );
        Ok(ResetSummary {
            rooms_cleared,
            users_signed_out,
        })
    }
}

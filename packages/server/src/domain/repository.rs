//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `find_*` / `get_*` の `None` は「存在しない」を意味し、エラーではない
//! - `update` / `remove` は対象が存在しない場合 `Ok(false)` を返す
//! - 変更系のメソッドは永続化が完了してから返る

use async_trait::async_trait;

use super::{GameResult, RepositoryError, Room, RoomId, User, Username};

/// User Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを追加
    ///
    /// 同じユーザー名が既に存在する場合は何もせず `Ok(false)` を返す。
    async fn add(&self, user: User) -> Result<bool, RepositoryError>;

    /// ユーザー名で検索
    async fn find_by_username(&self, username: &Username) -> Option<User>;

    /// メールアドレスで検索
    async fn find_by_email(&self, email: &str) -> Option<User>;

    /// ユーザーを更新（キーは `user.username`）
    async fn update(&self, user: User) -> Result<bool, RepositoryError>;

    /// 全ユーザーのスナップショット
    async fn list(&self) -> Vec<User>;
}

/// Room Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を追加
    async fn add(&self, room: Room) -> Result<(), RepositoryError>;

    /// ID で取得
    async fn get_by_id(&self, id: &RoomId) -> Option<Room>;

    /// 全 Room のスナップショット
    async fn list(&self) -> Vec<Room>;

    /// Room を更新（キーは `room.id`）
    async fn update(&self, room: Room) -> Result<bool, RepositoryError>;

    /// Room を削除
    async fn remove(&self, id: &RoomId) -> Result<bool, RepositoryError>;

    /// 全 Room を削除（起動時のリセット用）
    async fn clear(&self) -> Result<(), RepositoryError>;
}

/// GameResult Repository trait（追記のみ）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// 結果を追記
    async fn add(&self, result: GameResult) -> Result<(), RepositoryError>;

    /// 全結果のスナップショット
    async fn list(&self) -> Vec<GameResult>;
}

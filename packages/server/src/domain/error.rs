//! Domain errors.

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("username must not be empty")]
    UsernameEmpty,

    #[error("username must be at most {0} characters")]
    UsernameTooLong(usize),

    #[error("room id must not be empty")]
    RoomIdEmpty,
}

/// Room への参加ルール違反
///
/// 判定順は「ゲーム中 → 満員 → 参加済み」。Room が存在しないケースは
/// Repository 側で判定する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomRuleError {
    #[error("game in progress, cannot join")]
    GameInProgress,

    #[error("room is full")]
    RoomFull,

    #[error("already in this room")]
    AlreadyMember,
}

/// Repository のエラー
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 永続化（ファイル書き込み / シリアライズ）に失敗
    #[error("failed to persist {collection}: {reason}")]
    Persistence {
        collection: &'static str,
        reason: String,
    },
}

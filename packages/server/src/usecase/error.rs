//! UseCase layer errors.

use thiserror::Error;

use crate::domain::{RepositoryError, RoomRuleError, ValueObjectError};

/// ユーザー登録のエラー（判定順に並んでいる）
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("username must not contain spaces")]
    UsernameHasSpace,

    #[error("username must be between 3 and 20 characters")]
    UsernameLength,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("email address is invalid")]
    InvalidEmail,

    #[error("username already exists")]
    UsernameTaken,

    #[error("email is already registered")]
    EmailTaken,

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("user does not exist")]
    UnknownUser,

    #[error("wrong password")]
    WrongPassword,

    #[error("user is already logged in")]
    AlreadyOnline,

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// WebSocket 接続時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// ユーザーが存在しないか、ログインしていない
    #[error("player '{0}' is not logged in")]
    NotLoggedIn(String),
}

#[derive(Debug, Error)]
pub enum CreateRoomError {
    #[error("player '{0}' does not exist")]
    UnknownUser(String),

    #[error(transparent)]
    Identifier(#[from] ValueObjectError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

#[derive(Debug, Error)]
pub enum JoinRoomError {
    #[error("room does not exist")]
    RoomNotFound,

    #[error(transparent)]
    Rule(#[from] RoomRuleError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

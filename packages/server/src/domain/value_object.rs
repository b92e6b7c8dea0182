//! Value Objects
//!
//! 不変で、値によって同一性が決まるオブジェクト。
//! 生成時にバリデーションを行い、不正な値を持つインスタンスを作らない。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// ユーザー名（User の一意キー）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// 最大長（バイト数ではなく文字数）
    pub const MAX_LEN: usize = 64;

    /// 新しい Username を作成
    ///
    /// 空文字列、空白のみ、または長すぎる値は拒否する。
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        if value.chars().count() > Self::MAX_LEN {
            return Err(ValueObjectError::UsernameTooLong(Self::MAX_LEN));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Username {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix タイムスタンプ（ミリ秒, UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `earlier` からの経過秒数（負にはならない）
    pub fn seconds_since(&self, earlier: Timestamp) -> i64 {
        ((self.0 - earlier.0) / 1000).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_accepts_regular_name() {
        // テスト項目: 通常のユーザー名は受け付けられる
        // given (前提条件):
        let raw = "alice".to_string();

        // when (操作):
        let result = Username::new(raw);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_username_rejects_blank() {
        // テスト項目: 空文字列・空白のみのユーザー名は拒否される
        // given (前提条件):
        let empty = String::new();
        let blank = "   ".to_string();

        // when (操作):
        let empty_result = Username::new(empty);
        let blank_result = Username::new(blank);

        // then (期待する結果):
        assert_eq!(empty_result, Err(ValueObjectError::UsernameEmpty));
        assert_eq!(blank_result, Err(ValueObjectError::UsernameEmpty));
    }

    #[test]
    fn test_username_rejects_too_long() {
        // テスト項目: 最大長を超えるユーザー名は拒否される
        // given (前提条件):
        let raw = "a".repeat(Username::MAX_LEN + 1);

        // when (操作):
        let result = Username::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::UsernameTooLong(Username::MAX_LEN))
        );
    }

    #[test]
    fn test_room_id_rejects_empty() {
        // テスト項目: 空の RoomId は作成できない
        // given (前提条件):
        let raw = String::new();

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::RoomIdEmpty));
    }

    #[test]
    fn test_timestamp_seconds_since_never_negative() {
        // テスト項目: 経過秒数は負にならない
        // given (前提条件):
        let start = Timestamp::new(10_000);
        let end = Timestamp::new(75_500);

        // when (操作):
        let forward = end.seconds_since(start);
        let backward = start.seconds_since(end);

        // then (期待する結果):
        assert_eq!(forward, 65);
        assert_eq!(backward, 0);
    }
}

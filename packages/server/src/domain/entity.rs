//! Entities
//!
//! 識別子によって同一性が決まるオブジェクト。Room の状態遷移ルールはここに閉じ込める。

use serde::{Deserialize, Serialize};

use super::{
    error::RoomRuleError,
    value_object::{RoomId, Timestamp, Username},
};

/// 登録済みユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: Username,
    /// 認証情報（不透明な値としてそのまま比較する）
    pub password: String,
    pub email: String,
    pub online: bool,
    #[serde(default)]
    pub login_time: Option<Timestamp>,
    #[serde(default)]
    pub room_id: Option<RoomId>,
}

impl User {
    /// 新規登録時のユーザー（オフライン、Room 未所属）
    pub fn new(username: Username, password: String, email: String) -> Self {
        Self {
            username,
            password,
            email,
            online: false,
            login_time: None,
            room_id: None,
        }
    }

    /// ログイン状態にする。所属 Room はリセットされる。
    pub fn sign_in(&mut self, at: Timestamp) {
        self.online = true;
        self.login_time = Some(at);
        self.room_id = None;
    }

    /// オフラインにし、所属 Room をクリアする
    pub fn sign_out(&mut self) {
        self.online = false;
        self.room_id = None;
    }
}

/// Room の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Ready,
    Playing,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Ready => "ready",
            RoomStatus::Playing => "playing",
        }
    }
}

/// 対戦 Room
///
/// Invariants:
///
/// - `players.len() <= max_players`
/// - `host_id` は `players` に含まれる
/// - 2 人以上で `Ready`、ホストの操作でのみ `Playing`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub host_id: Username,
    pub players: Vec<Username>,
    pub max_players: usize,
    pub status: RoomStatus,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
}

impl Room {
    /// max_players が指定されない（または 1 未満の）場合の定員
    pub const DEFAULT_MAX_PLAYERS: usize = 2;

    /// ホストだけが参加している `Waiting` 状態の Room を作成
    pub fn new(
        id: RoomId,
        name: String,
        host: Username,
        max_players: usize,
        created_at: Timestamp,
    ) -> Self {
        let max_players = if max_players == 0 {
            Self::DEFAULT_MAX_PLAYERS
        } else {
            max_players
        };

        Self {
            id,
            name,
            host_id: host.clone(),
            players: vec![host],
            max_players,
            status: RoomStatus::Waiting,
            created_at,
            started_at: None,
        }
    }

    pub fn is_member(&self, username: &Username) -> bool {
        self.players.contains(username)
    }

    pub fn is_host(&self, username: &Username) -> bool {
        &self.host_id == username
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// ロビーの一覧に表示するか（ゲーム中の Room は表示しない）
    pub fn is_listed(&self) -> bool {
        self.status != RoomStatus::Playing
    }

    /// プレイヤーを参加させる
    ///
    /// ゲーム中 → 満員 → 参加済み の順に判定し、最初に該当したものを返す。
    pub fn admit(&mut self, username: Username) -> Result<(), RoomRuleError> {
        if self.status == RoomStatus::Playing {
            return Err(RoomRuleError::GameInProgress);
        }
        if self.is_full() {
            return Err(RoomRuleError::RoomFull);
        }
        if self.is_member(&username) {
            return Err(RoomRuleError::AlreadyMember);
        }

        self.players.push(username);
        if self.players.len() >= 2 {
            self.status = RoomStatus::Ready;
        }
        Ok(())
    }

    /// ゲームを開始する。ホスト以外からの要求は `false`。
    pub fn start(&mut self, requested_by: &Username, at: Timestamp) -> bool {
        if !self.is_host(requested_by) {
            return false;
        }
        self.status = RoomStatus::Playing;
        self.started_at = Some(at);
        true
    }

    /// ゲーム終了。Room は削除せず `Waiting` に戻して再利用する。
    pub fn finish(&mut self) {
        self.status = RoomStatus::Waiting;
        self.started_at = None;
    }

    /// `player_id` 以外で最初のプレイヤー
    pub fn opponent_of(&self, player_id: &str) -> Option<&Username> {
        self.players.iter().find(|p| p.as_str() != player_id)
    }

    /// プレイヤーを退出させる
    ///
    /// ホストが抜けた場合は次のプレイヤーにホストを移す。2 人未満になったら
    /// `Waiting` に戻す。退出したら `true`。
    pub fn release(&mut self, username: &Username) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p != username);
        if self.players.len() == before {
            return false;
        }

        if self.is_host(username) {
            if let Some(next) = self.players.first() {
                self.host_id = next.clone();
            }
        }
        if self.players.len() < 2 {
            self.finish();
        }
        true
    }
}

/// 対戦結果（追記のみ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub id: String,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    pub winner: String,
    pub loser: String,
    pub play_time: Timestamp,
    /// 対戦時間（秒）
    pub duration: i64,
}

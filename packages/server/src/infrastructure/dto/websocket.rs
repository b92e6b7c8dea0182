//! WebSocket message DTOs
//!
//! すべてのメッセージは `{"type": <string>, "payload": <object>}` のエンベロープで運ばれる。
//!
//! - Client → Server: [`ClientMessage`]（既知の type ごとの直和型。中継 type のペイロードは生の JSON のまま）
//! - Server → Client: [`ServerMessage`]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::http::ErrorResponse;

// ========================================
// Envelope
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("invalid '{kind}' payload: {reason}")]
    InvalidPayload { kind: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<Value>,
}

// ========================================
// Payloads
// ========================================

/// Room の公開情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: String,
    pub name: String,
    pub host: String,
    pub players: Vec<String>,
    pub max_players: usize,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateRoomRequest {
    pub name: String,
    pub max_players: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinRoomRequest {
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomInfo>,
}

/// ゲーム中にそのまま中継する type
///
/// ペイロードは検証も変換もせず、クライアントが送った JSON をそのまま相手に届ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    PlayerAction,
    Fire,
    Hit,
    GameState,
}

impl RelayKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "player_action" => Some(Self::PlayerAction),
            "fire" => Some(Self::Fire),
            "hit" => Some(Self::Hit),
            "game_state" => Some(Self::GameState),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerAction => "player_action",
            Self::Fire => "fire",
            Self::Hit => "hit",
            Self::GameState => "game_state",
        }
    }

    /// 中継するエンベロープ JSON。ペイロードが無ければ `payload` キーも付けない。
    pub fn envelope(&self, payload: Option<&Value>) -> Result<String, serde_json::Error> {
        serde_json::to_string(&RelayEnvelope {
            kind: self.as_str(),
            payload,
        })
    }
}

#[derive(Serialize)]
struct RelayEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathPayload {
    pub player_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOverPayload {
    pub winner: String,
    pub loser: String,
    /// 秒
    pub duration: i64,
}

// ========================================
// Client -> Server
// ========================================

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Heartbeat,
    CreateRoom(CreateRoomRequest),
    RoomList,
    JoinRoom(JoinRoomRequest),
    StartGame,
    /// 中継メッセージ（ペイロードは受け取ったまま）
    Relay {
        kind: RelayKind,
        payload: Option<Value>,
    },
    Death(DeathPayload),
    GameOver(GameOverPayload),
    Logout,
    /// 未知の type（無視される）
    Unrecognized(String),
}

impl ClientMessage {
    /// エンベロープ JSON をデコードする
    ///
    /// ペイロードを持たない type はペイロードの中身を見ない。未知の type は
    /// エラーではなく `Unrecognized` になる。
    pub fn decode(text: &str) -> Result<Self, EnvelopeError> {
        let envelope: RawEnvelope =
            serde_json::from_str(text).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
        let RawEnvelope { kind, payload } = envelope;

        let message = match kind.as_str() {
            "heartbeat" => Self::Heartbeat,
            "room_list" => Self::RoomList,
            "start_game" => Self::StartGame,
            "logout" => Self::Logout,
            "create_room" => Self::CreateRoom(typed_payload(&kind, payload)?),
            "join_room" => Self::JoinRoom(typed_payload(&kind, payload)?),
            "death" => Self::Death(typed_payload(&kind, payload)?),
            "game_over" => Self::GameOver(typed_payload(&kind, payload)?),
            other => match RelayKind::parse(other) {
                Some(relay) => Self::Relay {
                    kind: relay,
                    payload,
                },
                None => Self::Unrecognized(kind),
            },
        };
        Ok(message)
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::CreateRoom(_) => "create_room",
            Self::RoomList => "room_list",
            Self::JoinRoom(_) => "join_room",
            Self::StartGame => "start_game",
            Self::Relay { kind, .. } => kind.as_str(),
            Self::Death(_) => "death",
            Self::GameOver(_) => "game_over",
            Self::Logout => "logout",
            Self::Unrecognized(kind) => kind,
        }
    }
}

fn typed_payload<T: serde::de::DeserializeOwned>(
    kind: &str,
    payload: Option<Value>,
) -> Result<T, EnvelopeError> {
    let payload = payload.ok_or_else(|| EnvelopeError::InvalidPayload {
        kind: kind.to_string(),
        reason: "missing payload".to_string(),
    })?;
    serde_json::from_value(payload).map_err(|e| EnvelopeError::InvalidPayload {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

// ========================================
// Server -> Client
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    HeartbeatReply,
    JoinRoomResult(JoinRoomResponse),
    RoomList(RoomListResponse),
    GameStart(RoomInfo),
    GameOver(GameOverPayload),
    Error(ErrorResponse),
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

//! Message router
//!
//! デコード済みのエンベロープを type ごとにユースケースへ振り分け、応答を Hub 経由で
//! メールボックスに積む。1 接続のメッセージはその接続の Reader タスク上で順に処理される。
//!
//! | type | 処理 |
//! |---|---|
//! | heartbeat | 心拍を記録し、送信者に heartbeat_reply |
//! | create_room / join_room | Room を変更し、送信者に join_room_result |
//! | room_list | 送信者に room_list |
//! | start_game | ホストのみ。Room の全員に game_start |
//! | player_action / fire / hit / game_state | 同じ Room の他のメンバーに中継 |
//! | death / game_over | 結果を記録し、全員に game_over（保存に失敗したら送信者に error） |
//! | logout | 接続を切ってオフラインにする |
//!
//! 不正なメッセージや未知の type は黙って捨て、接続は維持する。

use std::sync::Arc;

use serde_json::Value;

use crate::{
    domain::{Room, Username},
    infrastructure::{
        dto::{
            http::ErrorResponse,
            websocket::{
                ClientMessage, CreateRoomRequest, GameOverPayload, JoinRoomRequest,
                JoinRoomResponse, RelayKind, RoomInfo, RoomListResponse, ServerMessage,
            },
        },
        hub::ConnectionId,
    },
    usecase::{CreateRoomError, GameOutcome, JoinRoomError},
};

use super::state::AppState;

/// Reader タスクが保持する接続の識別情報
#[derive(Debug, Clone)]
pub struct Session {
    pub username: Username,
    pub connection_id: ConnectionId,
}

/// メッセージ処理後に接続をどうするか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Continue,
    Close,
}

pub struct MessageRouter {
    state: Arc<AppState>,
}

impl MessageRouter {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// エンベロープ JSON を 1 つ処理する
    pub async fn route(&self, session: &Session, text: &str) -> RouteOutcome {
        let message = match ClientMessage::decode(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropping frame from '{}': {}", session.username, e);
                return RouteOutcome::Continue;
            }
        };
        tracing::debug!("'{}' -> {}", session.username, message.kind());

        let username = &session.username;
        match message {
            ClientMessage::Heartbeat => {
                self.state.hub.touch(username).await;
                self.reply(username, &ServerMessage::HeartbeatReply).await;
            }
            ClientMessage::CreateRoom(request) => self.create_room(username, request).await,
            ClientMessage::RoomList => self.room_list(username).await,
            ClientMessage::JoinRoom(request) => self.join_room(username, request).await,
            ClientMessage::StartGame => self.start_game(username).await,
            ClientMessage::Relay { kind, payload } => {
                self.relay(username, kind, payload.as_ref()).await
            }
            ClientMessage::Death(payload) => self.death(username, &payload.player_id).await,
            ClientMessage::GameOver(payload) => self.game_over(username, payload).await,
            ClientMessage::Logout => {
                tracing::info!("Player '{}' logged out over WebSocket", username);
                self.state.hub.disconnect(username).await;
                return RouteOutcome::Close;
            }
            ClientMessage::Unrecognized(kind) => {
                tracing::debug!("Ignoring unrecognized message type '{}'", kind);
            }
        }
        RouteOutcome::Continue
    }

    async fn create_room(&self, username: &Username, request: CreateRoomRequest) {
        let response = match self
            .state
            .create_room_usecase
            .execute(username, request.name, request.max_players)
            .await
        {
            Ok(room) => {
                self.state
                    .hub
                    .set_room(username, Some(room.id.clone()))
                    .await;
                JoinRoomResponse {
                    success: true,
                    message: "room created".to_string(),
                    room: Some(RoomInfo::from(&room)),
                }
            }
            Err(e) => {
                if let CreateRoomError::Store(_) | CreateRoomError::Identifier(_) = e {
                    tracing::error!("Failed to create room for '{}': {}", username, e);
                }
                JoinRoomResponse {
                    success: false,
                    message: e.to_string(),
                    room: None,
                }
            }
        };
        self.reply(username, &ServerMessage::JoinRoomResult(response))
            .await;
    }

    async fn room_list(&self, username: &Username) {
        let rooms = self
            .state
            .list_rooms_usecase
            .execute()
            .await
            .iter()
            .map(RoomInfo::from)
            .collect();
        self.reply(
            username,
            &ServerMessage::RoomList(RoomListResponse { rooms }),
        )
        .await;
    }

    async fn join_room(&self, username: &Username, request: JoinRoomRequest) {
        let response = join_room(&self.state, username, &request.room_id).await;
        self.reply(username, &ServerMessage::JoinRoomResult(response))
            .await;
    }

    async fn start_game(&self, username: &Username) {
        let Some(room_id) = self.state.hub.room_of(username).await else {
            tracing::debug!("Ignoring start_game from '{}': not in a room", username);
            return;
        };
        match self
            .state
            .start_game_usecase
            .execute(username, &room_id)
            .await
        {
            Ok(Some(room)) => {
                if let Some(json) = encode(&ServerMessage::GameStart(RoomInfo::from(&room))) {
                    self.state.hub.broadcast_to_members(&room_id, &json).await;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to start game in '{}': {}", room_id, e);
                self.reply_error(username, "failed to start game").await;
            }
        }
    }

    /// ペイロードは受け取ったまま相手に届ける
    async fn relay(&self, username: &Username, kind: RelayKind, payload: Option<&Value>) {
        match kind.envelope(payload) {
            Ok(json) => {
                self.state.hub.broadcast_to_room(username, &json).await;
            }
            Err(e) => tracing::error!("Failed to encode '{}' relay: {}", kind.as_str(), e),
        }
    }

    async fn death(&self, username: &Username, loser: &str) {
        let Some(room_id) = self.state.hub.room_of(username).await else {
            tracing::debug!("Ignoring death from '{}': not in a room", username);
            return;
        };
        match self.state.finish_game_usecase.death(&room_id, loser).await {
            Ok(Some((outcome, _result))) => self.announce_game_over(outcome).await,
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to record death in '{}': {}", room_id, e);
                self.reply_error(username, "failed to record game result").await;
            }
        }
    }

    async fn game_over(&self, username: &Username, payload: GameOverPayload) {
        let room_id = self.state.hub.room_of(username).await;
        let outcome = GameOutcome {
            winner: payload.winner,
            loser: payload.loser,
            duration: payload.duration,
        };
        match self
            .state
            .finish_game_usecase
            .game_over(room_id.as_ref(), outcome.clone())
            .await
        {
            Ok(_result) => self.announce_game_over(outcome).await,
            Err(e) => {
                tracing::error!("Failed to record game over from '{}': {}", username, e);
                self.reply_error(username, "failed to record game result").await;
            }
        }
    }

    async fn announce_game_over(&self, outcome: GameOutcome) {
        let message = ServerMessage::GameOver(GameOverPayload {
            winner: outcome.winner,
            loser: outcome.loser,
            duration: outcome.duration,
        });
        if let Some(json) = encode(&message) {
            self.state.hub.broadcast_global(&json).await;
        }
    }

    async fn reply(&self, username: &Username, message: &ServerMessage) {
        if let Some(json) = encode(message) {
            self.state.hub.send_to(username, &json).await;
        }
    }

    /// 保存に失敗したことを送信者に知らせる
    async fn reply_error(&self, username: &Username, message: &str) {
        let error = ServerMessage::Error(ErrorResponse {
            code: 500,
            message: message.to_string(),
        });
        self.reply(username, &error).await;
    }
}

/// Room に参加し、既存のメンバーに参加を知らせる（WebSocket / HTTP 共通）
///
/// 送信者への応答は呼び出し側が返す。
pub(crate) async fn join_room(
    state: &AppState,
    username: &Username,
    room_id: &str,
) -> JoinRoomResponse {
    match state.join_room_usecase.execute(username, room_id).await {
        Ok(room) => {
            state.hub.set_room(username, Some(room.id.clone())).await;
            announce_join(state, username, &room).await;
            JoinRoomResponse {
                success: true,
                message: "joined room".to_string(),
                room: Some(RoomInfo::from(&room)),
            }
        }
        Err(e) => {
            if let JoinRoomError::Store(_) = e {
                tracing::error!("Failed to join '{}' for '{}': {}", room_id, username, e);
            } else {
                tracing::info!("Player '{}' cannot join '{}': {}", username, room_id, e);
            }
            JoinRoomResponse {
                success: false,
                message: e.to_string(),
                room: None,
            }
        }
    }
}

async fn announce_join(state: &AppState, username: &Username, room: &Room) {
    let notice = ServerMessage::JoinRoomResult(JoinRoomResponse {
        success: true,
        message: format!("{} joined the room", username),
        room: Some(RoomInfo::from(room)),
    });
    if let Some(json) = encode(&notice) {
        state.hub.broadcast_to_room(username, &json).await;
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    match message.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to encode server message: {}", e);
            None
        }
    }
}

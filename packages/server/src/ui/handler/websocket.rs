//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{
    domain::{RoomId, Username},
    infrastructure::{
        dto::http::ErrorResponse,
        hub::{HubError, MailboxInbox},
    },
    ui::{
        router::{MessageRouter, RouteOutcome, Session},
        state::AppState,
    },
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub username: String,
}

/// `GET /ws?username=<name>`
///
/// 空のユーザー名は 400、接続済みなら 409、ログインしていなければ 401。
/// Hub への登録はアップグレードが完了してから行うので、途中で切れたハンドシェイクは
/// 何も残さない。
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Response {
    let username = match Username::new(query.username) {
        Ok(username) => username,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket connection: {}", e);
            return refuse(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if state.hub.is_connected(&username).await {
        tracing::warn!(
            "Player '{}' is already connected. Rejecting connection.",
            username
        );
        return refuse(StatusCode::CONFLICT, "user already connected".to_string());
    }

    let room_id = match state.connect_player_usecase.execute(&username).await {
        Ok(room_id) => room_id,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket connection: {}", e);
            return refuse(StatusCode::UNAUTHORIZED, e.to_string());
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, username, room_id))
}

fn refuse(status: StatusCode, message: String) -> Response {
    let body = ErrorResponse {
        code: status.as_u16(),
        message,
    };
    (status, Json(body)).into_response()
}

async fn handle_socket(
    mut socket: WebSocket,
    state: Arc<AppState>,
    username: Username,
    room_id: Option<RoomId>,
) {
    let (mailbox, inbox) = state.hub.mailbox();
    let connection_id = match state.hub.register(username.clone(), room_id, mailbox).await {
        Ok(id) => id,
        Err(HubError::DuplicateSession(name)) => {
            // ハンドシェイク中に同じユーザーの別の接続が登録された
            tracing::warn!(
                "Player '{}' connected concurrently. Closing connection.",
                name
            );
            let frame = CloseFrame {
                code: close_code::POLICY,
                reason: "user already connected".into(),
            };
            let _ = socket.send(Message::Close(Some(frame))).await;
            return;
        }
    };
    let session = Session {
        username,
        connection_id,
    };

    tracing::info!(
        "Player '{}' connected ({})",
        session.username,
        session.connection_id
    );
    let (sender, receiver) = socket.split();

    let mut recv_task = reader_loop(receiver, state.clone(), session.clone());
    let mut send_task = writer_loop(inbox, sender, state.clone());

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .hub
        .unregister(&session.username, session.connection_id)
        .await;
    tracing::info!(
        "Player '{}' connection closed ({})",
        session.username,
        session.connection_id
    );
}

/// Spawns a task that decodes inbound frames and routes them in arrival order.
fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    session: Session,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let router = MessageRouter::new(state.clone());
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error from '{}': {}", session.username, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let envelope = match state.codec.decode(text.as_str()) {
                        Ok(envelope) => envelope,
                        Err(e) => {
                            tracing::warn!("Dropping frame from '{}': {}", session.username, e);
                            continue;
                        }
                    };
                    if router.route(&session, &envelope).await == RouteOutcome::Close {
                        break;
                    }
                }
                Message::Pong(_) => {
                    state.hub.touch(&session.username).await;
                }
                Message::Close(_) => {
                    tracing::info!("Player '{}' requested close", session.username);
                    break;
                }
                _ => {}
            }
        }
    })
}

/// Spawns a task that drains the mailbox to the socket and pings for liveness.
///
/// A closed mailbox means the Hub dropped this connection: send `Close` and stop.
fn writer_loop(
    mut inbox: MailboxInbox,
    mut sender: SplitSink<WebSocket, Message>,
    state: Arc<AppState>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ping = tokio::time::interval(state.hub.config().ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ping.tick().await;

        loop {
            tokio::select! {
                item = inbox.recv() => {
                    let Some(message) = item else {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    };
                    let frame = state.codec.encode(&message);
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

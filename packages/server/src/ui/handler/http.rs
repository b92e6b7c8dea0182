//! HTTP API endpoint handlers.
//!
//! Room 操作は WebSocket と同じユースケースを通し、接続中のプレイヤーについては
//! Hub にキャッシュされた Room も更新する。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    domain::Username,
    infrastructure::dto::{
        http::{
            CreateRoomResponse, ErrorResponse, HealthResponse, LoginRequest, LoginResponse,
            LogoutRequest, MessageResponse, RegisterRequest, RegisterResponse, UsernameQuery,
        },
        websocket::{
            CreateRoomRequest, JoinRoomRequest, JoinRoomResponse, RoomInfo, RoomListResponse,
        },
    },
    ui::{router, state::AppState},
    usecase::{CreateRoomError, LoginError, RegisterError},
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            message: message.into(),
        }),
    )
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(e) => {
            tracing::warn!("Malformed request body: {}", e);
            Err(api_error(StatusCode::BAD_REQUEST, "malformed request body"))
        }
    }
}

fn username_param(query: UsernameQuery) -> Result<Username, ApiError> {
    Username::new(query.username)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "username must not be empty"))
}

/// `POST /user/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let request = body(payload)?;
    match state
        .register_user_usecase
        .execute(&request.username, &request.password, &request.email)
        .await
    {
        Ok(_) => Ok(Json(RegisterResponse {
            success: true,
            message: "registration successful".to_string(),
        })),
        Err(RegisterError::Store(e)) => {
            tracing::error!("Failed to register '{}': {}", request.username, e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to save user",
            ))
        }
        Err(e) => Ok(Json(RegisterResponse {
            success: false,
            message: e.to_string(),
        })),
    }
}

/// `POST /user/login`
///
/// token はユーザー名そのもの。
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = body(payload)?;
    match state
        .login_usecase
        .execute(&request.username, &request.password)
        .await
    {
        Ok(username) => Ok(Json(LoginResponse {
            success: true,
            message: "login successful".to_string(),
            token: Some(username.into_string()),
        })),
        Err(LoginError::Store(e)) => {
            tracing::error!("Failed to log in '{}': {}", request.username, e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to save user",
            ))
        }
        Err(e) => Ok(Json(LoginResponse {
            success: false,
            message: e.to_string(),
            token: None,
        })),
    }
}

/// `POST /user/logout`
///
/// 接続中なら接続を切る（切断時の後始末でオフラインになる）。
pub async fn logout(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = body(payload)?;

    let disconnected = match Username::new(request.username.clone()) {
        Ok(username) => state.hub.disconnect(&username).await,
        Err(_) => false,
    };
    if !disconnected {
        if let Err(e) = state.logout_usecase.execute(&request.username).await {
            tracing::error!("Failed to log out '{}': {}", request.username, e);
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to save user",
            ));
        }
    }

    Ok(Json(MessageResponse {
        message: "logged out".to_string(),
    }))
}

/// `GET /user/test`
pub async fn test() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "server is running".to_string(),
    })
}

/// `POST /room/create?username=`
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<Json<CreateRoomResponse>, ApiError> {
    let request = body(payload)?;
    let username = username_param(query)?;

    match state
        .create_room_usecase
        .execute(&username, request.name, request.max_players)
        .await
    {
        Ok(room) => {
            state.hub.set_room(&username, Some(room.id.clone())).await;
            Ok(Json(CreateRoomResponse {
                success: true,
                message: "room created".to_string(),
                room_id: room.id.into_string(),
            }))
        }
        Err(e @ CreateRoomError::UnknownUser(_)) => {
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            tracing::error!("Failed to create room for '{}': {}", username, e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to create room: {e}"),
            ))
        }
    }
}

/// `POST /room/join?username=`
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
    payload: Result<Json<JoinRoomRequest>, JsonRejection>,
) -> Result<Json<JoinRoomResponse>, ApiError> {
    let request = body(payload)?;
    let username = username_param(query)?;
    Ok(Json(
        router::join_room(&state, &username, &request.room_id).await,
    ))
}

/// `GET /room/list`
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<RoomListResponse> {
    let rooms = state
        .list_rooms_usecase
        .execute()
        .await
        .iter()
        .map(RoomInfo::from)
        .collect();
    Json(RoomListResponse { rooms })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

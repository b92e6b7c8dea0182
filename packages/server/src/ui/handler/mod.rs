//! Axum request handlers.

mod http;
mod websocket;

pub use http::{
    create_room, health_check, join_room, list_rooms, login, logout, register, test,
};
pub use websocket::websocket_handler;

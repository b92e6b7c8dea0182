//! Game session server: HTTP API, WebSocket endpoint and message routing.

mod handler;
mod router;
mod server;
mod signal;
pub mod state;

pub use router::{MessageRouter, RouteOutcome, Session};
pub use server::Server;

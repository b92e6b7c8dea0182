//! Realtime two-player game session server.
//!
//! Players register and log in over HTTP, then hold one WebSocket connection each.
//! The hub keeps track of who is connected, relays in-game traffic between the
//! members of a room and drops connections whose heartbeat stops.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

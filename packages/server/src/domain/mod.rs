//! Domain layer
//!
//! Entities, value objects and the interfaces (repositories, presence hook)
//! the other layers depend on.

pub mod entity;
pub mod error;
pub mod factory;
pub mod presence;
pub mod repository;
pub mod value_object;

pub use entity::{GameResult, Room, RoomStatus, User};
pub use error::{RepositoryError, RoomRuleError, ValueObjectError};
pub use factory::{ResultIdFactory, RoomIdFactory};
pub use presence::PlayerPresence;
pub use repository::{ResultRepository, RoomRepository, UserRepository};
pub use value_object::{RoomId, Timestamp, Username};

#[cfg(test)]
pub use repository::{MockResultRepository, MockRoomRepository, MockUserRepository};

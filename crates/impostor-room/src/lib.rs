//! Rooms for Impostor: membership, admin election, and rounds.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! players, its connection registry, and its own random generator.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates, resolves, and drops rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Room`]: the synchronous state a room actor owns
//! - [`RoundEngine`]: item, impostor, first-turn, and admin draws
//! - [`ConnectionRegistry`]: per-room name → outbound channel
//! - [`RoomConfig`]: quota and character pool

mod config;
mod connections;
mod error;
mod manager;
mod player;
mod room;
mod round;

pub use config::RoomConfig;
pub use connections::{ConnectionRegistry, PlayerSender};
pub use error::RoomError;
pub use manager::RoomManager;
pub use player::{Player, Role};
pub use room::{NextRound, Room, RoomHandle};
pub use round::RoundEngine;

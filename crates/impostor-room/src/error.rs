//! Error types for the room layer.
//!
//! Room full, duplicate names and incomplete rooms are not errors: those
//! come back as `bool`s from [`Room`](crate::Room). What remains here is
//! infrastructure failure.

use impostor_protocol::{PlayerName, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room's actor has shut down (the room was removed).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// A [`RoomConfig`](crate::RoomConfig) failed validation.
    #[error("invalid room config: {0}")]
    InvalidConfig(String),

    /// No transport is bound for this player.
    #[error("player {0} is not connected")]
    NotConnected(PlayerName),

    /// The player's outbound channel is closed.
    #[error("delivery to {0} failed: connection is gone")]
    DeliveryFailed(PlayerName),
}

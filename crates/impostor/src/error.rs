//! Unified error type for the Impostor server.

use std::path::PathBuf;

use impostor_protocol::ProtocolError;
use impostor_room::RoomError;
use impostor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each layer's variant lets `?` convert
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ImpostorError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad player name).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (room shut down, invalid config).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The character pool file could not be read or parsed.
    #[error("failed to load characters from {path}: {reason}")]
    Characters { path: PathBuf, reason: String },
}

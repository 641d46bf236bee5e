//! # Impostor
//!
//! WebSocket server for the Impostor party game.
//!
//! Players join a room by name. Once the room reaches its quota, the
//! admin deals a round: everyone sees the same secret item except one
//! randomly drawn impostor, and one player is drawn to speak first.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use impostor::prelude::*;
//!
//! # async fn run() -> Result<(), ImpostorError> {
//! let server = ImpostorServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod characters;
mod error;
mod handler;
mod route;
mod server;

pub use characters::load_characters;
pub use error::ImpostorError;
pub use server::{ImpostorServer, ImpostorServerBuilder, UPGRADE_TIMEOUT};

/// Everything needed to start a server or talk to one.
pub mod prelude {
    pub use crate::{ImpostorError, ImpostorServer, ImpostorServerBuilder};
    pub use impostor_protocol::{
        ClientCommand, MessageKind, PlayerName, PublicPlayerView, RoomId, RoomSummary,
        RoundView, ServerMessage, StatusReport, StatusResponse, WaitingState,
    };
    pub use impostor_room::RoomConfig;
}

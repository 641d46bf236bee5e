//! Wire protocol for Impostor.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ServerMessage`], [`WaitingState`], [`RoundView`],
//!   [`ClientCommand`], ...): the structures on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong along the way.
//!
//! It knows nothing about connections or rooms.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientCommand, Envelope, MessageKind, PlayerName, PublicPlayerView, RoomId,
    RoomSummary, RoundView, ServerMessage, StatusReport, StatusResponse,
    UNSET_PLAYER_NAME, WaitingState,
};

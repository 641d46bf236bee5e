//! Transport abstraction layer for Impostor.
//!
//! Accepting a peer happens in two steps. [`Transport::accept`] only takes
//! the raw socket off the listener, so the accept loop never waits on a
//! client. [`Pending::upgrade`] then runs the protocol handshake, meant to
//! be awaited inside the peer's own task. Rooms never see a socket: they
//! only hand bytes to a [`Connection`] and get bytes back.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique tag for one peer, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next id. Ids are never reused.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Hands out peers that have connected but not yet finished a handshake.
pub trait Transport: Send + Sync + 'static {
    /// A peer awaiting its handshake.
    type Pending: Pending;
    /// The error type for accepting.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer. Must not wait on the peer itself.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// An accepted peer whose handshake has not run yet.
///
/// A peer can stall its handshake forever; callers put their own deadline
/// on [`upgrade`](Pending::upgrade).
pub trait Pending: Send + 'static {
    /// The connection produced by a successful handshake.
    type Connection: Connection;
    /// The error type for the handshake.
    type Error: std::error::Error + Send + Sync;

    fn id(&self) -> ConnectionId;

    /// Runs the handshake.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
///
/// Sending and receiving may run concurrently: a handler can be parked
/// in [`recv`](Connection::recv) while it pushes outbound messages.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Same id as the [`Pending`] this connection came from.
    fn id(&self) -> ConnectionId;
}

//! `ImpostorServer` builder and server loop.
//!
//! This is the entry point for running an Impostor server. It ties the
//! layers together: transport → protocol → room.

use std::sync::Arc;
use std::time::Duration;

use impostor_protocol::{Codec, JsonCodec, RoomId, RoomSummary, StatusReport, StatusResponse};
use impostor_room::{RoomConfig, RoomManager};
use impostor_transport::{Pending, Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::ImpostorError;
use crate::handler::handle_connection;

/// How long a peer may take to finish its WebSocket handshake.
pub const UPGRADE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
}

impl<C: Codec> ServerState<C> {
    /// Summaries of every live room, ordered by id.
    ///
    /// Handles are copied out under the lock; the rooms are queried after
    /// it is released. Rooms shut down in between are skipped.
    pub(crate) async fn status_report(&self) -> StatusReport {
        let snapshot = self.rooms.lock().await.snapshot();

        let mut rooms = Vec::with_capacity(snapshot.len());
        for handle in snapshot.values() {
            if let Ok(summary) = handle.summary().await {
                rooms.push(summary);
            }
        }
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));

        StatusReport {
            total_rooms: rooms.len(),
            rooms,
        }
    }

    pub(crate) async fn room_summary(&self, room_id: &RoomId) -> Option<RoomSummary> {
        let handle = self.rooms.lock().await.resolve(room_id)?;
        handle.summary().await.ok()
    }

    /// Body for a `/status` or `/status/<room_id>` request.
    pub(crate) async fn status(&self, room_id: Option<&RoomId>) -> StatusResponse {
        match room_id {
            None => StatusResponse::All(self.status_report().await),
            Some(id) => match self.room_summary(id).await {
                Some(summary) => StatusResponse::Room(summary),
                None => StatusResponse::NotFound {
                    error: format!("room {id} not found"),
                },
            },
        }
    }
}

/// Builder for configuring and starting an Impostor server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), impostor::ImpostorError> {
/// use impostor::prelude::*;
///
/// let server = ImpostorServer::builder()
///     .bind("0.0.0.0:8080")
///     .room_config(RoomConfig { quota: 4, ..RoomConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ImpostorServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    seed: Option<u64>,
}

impl ImpostorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            seed: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the quota and character pool every new room gets.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Makes room ids and every draw reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the room config, binds the listener, and returns the
    /// server ready to [`run`](ImpostorServer::run).
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<ImpostorServer<JsonCodec>, ImpostorError> {
        let rooms = match self.seed {
            Some(seed) => RoomManager::with_seed(self.room_config, seed)?,
            None => RoomManager::new(self.room_config)?,
        };
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(rooms),
            codec: JsonCodec,
        });

        Ok(ImpostorServer { transport, state })
    }
}

impl Default for ImpostorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Impostor server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ImpostorServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ImpostorServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ImpostorServerBuilder {
        ImpostorServerBuilder::new()
    }
}

impl<C: Codec> ImpostorServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Every peer is handed to its own task straight away; the WebSocket
    /// handshake runs there, bounded by [`UPGRADE_TIMEOUT`]. Runs until
    /// the process is terminated; a failed accept is logged and skipped.
    pub async fn run(mut self) -> Result<(), ImpostorError> {
        tracing::info!("Impostor server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let conn_id = pending.id();
                        let upgrade = tokio::time::timeout(UPGRADE_TIMEOUT, pending.upgrade());
                        let conn = match upgrade.await {
                            Ok(Ok(conn)) => conn,
                            Ok(Err(e)) => {
                                tracing::debug!(%conn_id, error = %e, "upgrade failed");
                                return;
                            }
                            Err(_) => {
                                tracing::debug!(%conn_id, "upgrade timed out");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(%conn_id, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

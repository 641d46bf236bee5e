//! Per-connection handler: routing, join, and the command loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Route on the upgrade URI (status requests are answered and closed)
//!   2. Validate the player name and join the room
//!   3. Broadcast the lobby to the room
//!   4. Loop: forward outbound room messages, handle `next_round` commands
//!
//! Once joined, a [`RoomGuard`] owns cleanup for every exit path.

use std::sync::Arc;

use impostor_protocol::{ClientCommand, Codec, PlayerName, RoomId, ServerMessage};
use impostor_room::{NextRound, PlayerSender, RoomHandle};
use impostor_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ImpostorError;
use crate::route::{self, Route};
use crate::server::ServerState;

/// Drop guard that takes a player out of its room when the handler exits.
///
/// Since `Drop` is synchronous, the cleanup runs in a fire-and-forget
/// task: disconnect, tell the rest of the room, then drop the room if it
/// ended up empty.
struct RoomGuard<C: Codec> {
    room: RoomHandle,
    player: PlayerName,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for RoomGuard<C> {
    fn drop(&mut self) {
        let room = self.room.clone();
        let player = self.player.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let room_id = room.room_id().clone();
            if let Err(e) = room.disconnect(player.clone()).await {
                tracing::debug!(%room_id, %player, error = %e, "disconnect failed");
                return;
            }
            let _ = room.broadcast_waiting().await;
            state.rooms.lock().await.remove(&room_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ImpostorError> {
    let conn_id = conn.id();
    let uri = conn.request_uri();
    tracing::debug!(%conn_id, %uri, "handling new connection");

    let (room_id, player_name) = match route::parse(uri.path(), uri.query()) {
        Route::Join { room, player_name } => (room, player_name),
        Route::Status(room_id) => {
            let body = state.codec.encode(&state.status(room_id.as_ref()).await)?;
            conn.send(&body).await?;
            conn.close().await?;
            return Ok(());
        }
        Route::Unknown => {
            tracing::debug!(%conn_id, %uri, "unknown route, closing");
            conn.close().await?;
            return Ok(());
        }
    };

    let player = match PlayerName::parse(player_name) {
        Ok(name) => name,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "rejected player name");
            conn.close().await?;
            return Ok(());
        }
    };

    // --- Join ---
    let (sender, mut outbound) = mpsc::unbounded_channel();
    let Some(room) = join(&state, room_id, player.clone(), sender).await? else {
        conn.close().await?;
        return Ok(());
    };
    let room_id = room.room_id().clone();
    tracing::info!(%conn_id, %room_id, %player, "player connected");

    let _guard = RoomGuard {
        room: room.clone(),
        player: player.clone(),
        state: Arc::clone(&state),
    };

    room.broadcast_waiting().await?;

    // --- Message loop ---
    loop {
        tokio::select! {
            incoming = conn.recv() => match incoming {
                Ok(Some(data)) => handle_command(&state, &room, &player, &data).await?,
                Ok(None) => {
                    tracing::info!(%room_id, %player, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%room_id, %player, error = %e, "recv error");
                    break;
                }
            },
            msg = outbound.recv() => match msg {
                Some(msg) => send_message(&conn, &state.codec, &msg).await?,
                None => break,
            },
        }
    }

    // _guard drops here → cleanup fires.
    Ok(())
}

/// Resolves (or creates) the room and connects the player, all under the
/// manager lock so a concurrent `remove` cannot slip in between.
///
/// Returns `None` when the room is unknown, full, or the name is taken.
async fn join<C: Codec>(
    state: &ServerState<C>,
    room_id: Option<RoomId>,
    player: PlayerName,
    sender: PlayerSender,
) -> Result<Option<RoomHandle>, ImpostorError> {
    let mut rooms = state.rooms.lock().await;

    let room = match room_id {
        None => rooms.get_or_create(None).1,
        Some(id) => match rooms.resolve(&id) {
            Some(room) => room,
            None => {
                tracing::debug!(room_id = %id, %player, "unknown room");
                return Ok(None);
            }
        },
    };

    if room.connect(player.clone(), sender).await? {
        return Ok(Some(room));
    }

    tracing::debug!(room_id = %room.room_id(), %player, "join refused");
    // Drop a room created for this connection that never got a player.
    rooms.remove(room.room_id()).await;
    Ok(None)
}

/// Decodes a client command and applies it. Undecodable input is ignored.
async fn handle_command<C: Codec>(
    state: &ServerState<C>,
    room: &RoomHandle,
    player: &PlayerName,
    data: &[u8],
) -> Result<(), ImpostorError> {
    let command: ClientCommand = match state.codec.decode(data) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(
                room_id = %room.room_id(),
                %player,
                error = %e,
                "ignoring client message"
            );
            return Ok(());
        }
    };

    match command {
        ClientCommand::NextRound => {
            let outcome = room.request_next_round(player.clone()).await?;
            if outcome == NextRound::Ignored {
                tracing::debug!(room_id = %room.room_id(), %player, "next_round from non-admin");
            }
        }
    }
    Ok(())
}

async fn send_message(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), ImpostorError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

//! A room: membership, admin election, and the round state machine.
//!
//! [`Room`] is plain synchronous state. At runtime each room is owned by
//! its own Tokio task (actor model) and reached only through a
//! [`RoomHandle`], so every operation on one room runs to completion
//! before the next starts, while independent rooms run fully in parallel.

use std::sync::Arc;

use impostor_protocol::{PlayerName, RoomId, RoomSummary, ServerMessage, WaitingState};
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::{ConnectionRegistry, Player, PlayerSender, RoomError, RoundEngine};

/// What a `next_round` request from a client ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRound {
    /// The room was full: a round started and views went out.
    Started,
    /// The room was not full: the lobby snapshot was re-broadcast.
    Waiting,
    /// The requester is not the admin (or not in the room).
    Ignored,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// One session's state.
///
/// Two logical phases, told apart only by [`current_item`](Self::current_item):
/// waiting (`None`) and round-active (`Some`).
pub struct Room {
    room_id: RoomId,
    quota: usize,
    /// Join order is kept so lobby snapshots list players stably.
    players: Vec<Player>,
    connections: ConnectionRegistry,
    engine: RoundEngine,
}

impl Room {
    /// An empty room in the waiting phase.
    pub fn new(
        room_id: RoomId,
        quota: usize,
        characters: Arc<[String]>,
        rng: StdRng,
    ) -> Self {
        Self {
            connections: ConnectionRegistry::new(room_id.clone()),
            room_id,
            quota,
            players: Vec::new(),
            engine: RoundEngine::new(characters, rng),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Seated players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn connected_count(&self) -> usize {
        self.players.len()
    }

    /// Whether every seat is taken. Rounds only start in a complete room.
    pub fn is_complete(&self) -> bool {
        self.connected_count() == self.quota
    }

    /// The item of the round in progress; `None` while waiting.
    pub fn current_item(&self) -> Option<&str> {
        self.engine.current_item()
    }

    /// Whether `name` is seated here and holds admin rights.
    pub fn is_admin(&self, name: &str) -> bool {
        self.players
            .iter()
            .any(|p| p.name().as_str() == name && p.is_admin())
    }

    /// Seats a new player.
    ///
    /// Returns `false`, changing nothing, when the room is full or the
    /// name is already connected. On success an admin is elected if the
    /// room has none.
    pub fn connect(&mut self, name: PlayerName, sender: PlayerSender) -> bool {
        if self.connected_count() >= self.quota {
            tracing::debug!(room_id = %self.room_id, player = %name, "room full");
            return false;
        }
        if !self.connections.connect(name.clone(), sender) {
            tracing::debug!(room_id = %self.room_id, player = %name, "name already taken");
            return false;
        }

        self.players.push(Player::new(name));
        if let Some(idx) = self.engine.elect_admin(&mut self.players) {
            let admin = self.players[idx].name();
            tracing::info!(room_id = %self.room_id, %admin, "admin elected");
        }
        tracing::info!(
            room_id = %self.room_id,
            players = self.players.len(),
            quota = self.quota,
            "player joined"
        );
        true
    }

    /// Removes a player. If they were admin, another one is elected among
    /// those left. Returns whether the player was connected.
    pub fn disconnect(&mut self, name: &str) -> bool {
        self.connections.disconnect(name);
        let Some(pos) = self.players.iter().position(|p| p.name().as_str() == name) else {
            return false;
        };
        let departed = self.players.remove(pos);
        tracing::info!(
            room_id = %self.room_id,
            player = %departed.name(),
            players = self.players.len(),
            "player left"
        );

        if departed.is_admin() {
            if let Some(idx) = self.engine.elect_admin(&mut self.players) {
                let admin = self.players[idx].name();
                tracing::info!(room_id = %self.room_id, %admin, "admin re-elected");
            }
        }
        true
    }

    /// Starts a round: reset, draw item, impostor and first-turn, then
    /// send each player its private view.
    ///
    /// Only valid on a complete room; otherwise returns `false` and leaves
    /// the room untouched.
    pub fn start_round(&mut self) -> bool {
        if !self.is_complete() {
            tracing::debug!(room_id = %self.room_id, "start_round on incomplete room ignored");
            return false;
        }

        self.engine.reset(&mut self.players);
        if self.engine.assign(&mut self.players).is_none() {
            return false;
        }

        let item = self.engine.current_item();
        for player in &self.players {
            self.connections
                .unicast(player.name(), ServerMessage::Round(player.round_view(item)));
        }
        tracing::info!(room_id = %self.room_id, players = self.players.len(), "round started");
        true
    }

    /// Handles a client's `next_round`: only the admin is heard; a full
    /// room starts a round, otherwise everyone gets the lobby again.
    pub fn request_next_round(&mut self, requester: &str) -> NextRound {
        if !self.is_admin(requester) {
            tracing::debug!(
                room_id = %self.room_id,
                requester,
                "next_round from non-admin ignored"
            );
            return NextRound::Ignored;
        }
        if self.is_complete() && self.start_round() {
            NextRound::Started
        } else {
            self.broadcast_waiting();
            NextRound::Waiting
        }
    }

    pub fn waiting_state(&self) -> WaitingState {
        WaitingState {
            room_id: self.room_id.clone(),
            quota: self.quota,
            active_count: self.connected_count(),
            players: self.players.iter().map(Player::public_room_view).collect(),
        }
    }

    /// Sends the lobby snapshot to everyone. Returns how many received it.
    pub fn broadcast_waiting(&self) -> usize {
        self.connections
            .broadcast(&ServerMessage::Waiting(self.waiting_state()))
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.room_id.clone(),
            quota: self.quota,
            active_players: self.connected_count(),
            players: self.players.iter().map(|p| p.name().clone()).collect(),
            admins: self
                .players
                .iter()
                .filter(|p| p.is_admin())
                .map(|p| p.name().clone())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Actor plumbing
// ---------------------------------------------------------------------------

/// Commands sent to a room actor through its channel.
///
/// Variants with a `reply` are request/response: the caller awaits the
/// `oneshot` for the result.
enum RoomCommand {
    Connect {
        name: PlayerName,
        sender: PlayerSender,
        reply: oneshot::Sender<bool>,
    },
    Disconnect {
        name: PlayerName,
        reply: oneshot::Sender<bool>,
    },
    IsComplete {
        reply: oneshot::Sender<bool>,
    },
    StartRound {
        reply: oneshot::Sender<bool>,
    },
    NextRound {
        requester: PlayerName,
        reply: oneshot::Sender<NextRound>,
    },
    WaitingState {
        reply: oneshot::Sender<WaitingState>,
    },
    BroadcastWaiting {
        reply: oneshot::Sender<usize>,
    },
    Summary {
        reply: oneshot::Sender<RoomSummary>,
    },
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone. Every method fails only with
/// [`RoomError::Unavailable`], once the room has been shut down.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// See [`Room::connect`].
    pub async fn connect(
        &self,
        name: PlayerName,
        sender: PlayerSender,
    ) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::Connect { name, sender, reply })
            .await
    }

    /// See [`Room::disconnect`].
    pub async fn disconnect(&self, name: PlayerName) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::Disconnect { name, reply })
            .await
    }

    pub async fn is_complete(&self) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::IsComplete { reply }).await
    }

    /// See [`Room::start_round`].
    pub async fn start_round(&self) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::StartRound { reply }).await
    }

    /// See [`Room::request_next_round`].
    pub async fn request_next_round(
        &self,
        requester: PlayerName,
    ) -> Result<NextRound, RoomError> {
        self.request(|reply| RoomCommand::NextRound { requester, reply })
            .await
    }

    pub async fn waiting_state(&self) -> Result<WaitingState, RoomError> {
        self.request(|reply| RoomCommand::WaitingState { reply }).await
    }

    pub async fn broadcast_waiting(&self) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::BroadcastWaiting { reply })
            .await
    }

    pub async fn summary(&self) -> Result<RoomSummary, RoomError> {
        self.request(|reply| RoomCommand::Summary { reply }).await
    }

    /// Number of connected players.
    pub async fn player_count(&self) -> Result<usize, RoomError> {
        Ok(self.summary().await?.active_players)
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// Runs the actor loop, processing commands until shutdown.
async fn run(mut room: Room, mut receiver: mpsc::Receiver<RoomCommand>) {
    tracing::info!(room_id = %room.room_id, "room actor started");

    while let Some(cmd) = receiver.recv().await {
        match cmd {
            RoomCommand::Connect { name, sender, reply } => {
                let _ = reply.send(room.connect(name, sender));
            }
            RoomCommand::Disconnect { name, reply } => {
                let _ = reply.send(room.disconnect(name.as_str()));
            }
            RoomCommand::IsComplete { reply } => {
                let _ = reply.send(room.is_complete());
            }
            RoomCommand::StartRound { reply } => {
                let _ = reply.send(room.start_round());
            }
            RoomCommand::NextRound { requester, reply } => {
                let _ = reply.send(room.request_next_round(requester.as_str()));
            }
            RoomCommand::WaitingState { reply } => {
                let _ = reply.send(room.waiting_state());
            }
            RoomCommand::BroadcastWaiting { reply } => {
                let _ = reply.send(room.broadcast_waiting());
            }
            RoomCommand::Summary { reply } => {
                let _ = reply.send(room.summary());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %room.room_id, "room shutting down");
                break;
            }
        }
    }

    tracing::info!(room_id = %room.room_id, "room actor stopped");
}

/// Spawns a room actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; callers wait when it is full.
pub(crate) fn spawn_room(room: Room, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let room_id = room.room_id.clone();
    tokio::spawn(run(room, rx));
    RoomHandle { room_id, sender: tx }
}

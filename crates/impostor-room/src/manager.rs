//! Room manager: the process-wide table of live rooms.

use std::collections::HashMap;
use std::sync::Arc;

use impostor_protocol::RoomId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::room::{Room, spawn_room};
use crate::{RoomConfig, RoomError, RoomHandle};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Length of a generated room id.
const ROOM_ID_LEN: usize = 8;

const ROOM_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Creates, looks up, and drops rooms.
///
/// Not internally synchronized: the server keeps it behind a
/// `tokio::sync::Mutex` so that lookup-then-connect and
/// check-empty-then-remove each run under one lock.
pub struct RoomManager {
    rooms: HashMap<RoomId, RoomHandle>,
    quota: usize,
    characters: Arc<[String]>,
    /// Source for room ids and for seeding each room's own generator.
    rng: StdRng,
}

impl RoomManager {
    /// Creates an empty manager seeded from the OS.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: RoomConfig) -> Result<Self, RoomError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Like [`new`](Self::new) but fully deterministic: room ids and every
    /// room's draws derive from `seed`.
    pub fn with_seed(config: RoomConfig, seed: u64) -> Result<Self, RoomError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: RoomConfig, rng: StdRng) -> Result<Self, RoomError> {
        config.validate()?;
        Ok(Self {
            rooms: HashMap::new(),
            quota: config.quota,
            characters: config.characters.into(),
            rng,
        })
    }

    /// Returns the room for `id`, creating it if needed.
    ///
    /// With `None` a fresh, unused id is generated. With an id nobody has
    /// used yet, a room is created under that id. An existing id yields the
    /// same room every time.
    pub fn get_or_create(&mut self, id: Option<RoomId>) -> (RoomId, RoomHandle) {
        if let Some(handle) = id.as_ref().and_then(|id| self.rooms.get(id)) {
            return (handle.room_id().clone(), handle.clone());
        }

        let room_id = match id {
            Some(id) => id,
            None => self.fresh_id(),
        };
        let room = Room::new(
            room_id.clone(),
            self.quota,
            Arc::clone(&self.characters),
            StdRng::from_rng(&mut self.rng),
        );
        let handle = spawn_room(room, DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, quota = self.quota, "room created");
        (room_id, handle)
    }

    /// Returns the existing room for `id`. Never creates.
    pub fn resolve(&self, id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(id).cloned()
    }

    /// Drops the room if nobody is connected to it, shutting its actor down.
    ///
    /// The player count is read while the caller holds the manager, so a
    /// connect that got in first keeps the room alive. A room whose actor
    /// already stopped is dropped too. Returns whether the room was removed.
    pub async fn remove(&mut self, id: &RoomId) -> bool {
        let Some(handle) = self.rooms.get(id) else {
            return false;
        };

        match handle.player_count().await {
            Ok(0) | Err(RoomError::Unavailable(_)) => {}
            Ok(count) => {
                tracing::debug!(room_id = %id, count, "room still occupied, kept");
                return false;
            }
            Err(e) => {
                tracing::warn!(room_id = %id, error = %e, "room count unavailable, kept");
                return false;
            }
        }

        if let Some(handle) = self.rooms.remove(id) {
            let _ = handle.shutdown().await;
        }
        tracing::info!(room_id = %id, "room removed");
        true
    }

    /// A copy of the room table, safe to read while the manager changes.
    pub fn snapshot(&self) -> HashMap<RoomId, RoomHandle> {
        self.rooms.clone()
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn fresh_id(&mut self) -> RoomId {
        loop {
            let raw: String = (0..ROOM_ID_LEN)
                .filter_map(|_| ROOM_ID_ALPHABET.choose(&mut self.rng))
                .map(|b| char::from(*b))
                .collect();
            let id = RoomId::new(raw);
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

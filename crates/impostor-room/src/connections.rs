//! Per-room connection registry: name → outbound channel.
//!
//! Every delivery is attempted on its own. A closed channel means the
//! player's connection task is gone; the failure is logged and dropped,
//! never bubbled up, so one dead socket cannot stall a broadcast.

use std::collections::HashMap;

use impostor_protocol::{PlayerName, RoomId, ServerMessage};
use tokio::sync::mpsc;

use crate::RoomError;

/// Channel sender for delivering outbound messages to one player's
/// connection handler.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Maps each connected player to its live transport handle.
pub struct ConnectionRegistry {
    room_id: RoomId,
    senders: HashMap<PlayerName, PlayerSender>,
}

impl ConnectionRegistry {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            senders: HashMap::new(),
        }
    }

    /// Binds `name` to `sender`. Returns `false` if the name is taken.
    pub fn connect(&mut self, name: PlayerName, sender: PlayerSender) -> bool {
        if self.senders.contains_key(&name) {
            return false;
        }
        self.senders.insert(name, sender);
        true
    }

    /// Drops the binding for `name`. Idempotent.
    pub fn disconnect(&mut self, name: &str) -> bool {
        self.senders.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Sends `msg` to one player. Returns whether it was handed off.
    pub fn unicast(&self, name: &PlayerName, msg: ServerMessage) -> bool {
        let result = match self.senders.get(name) {
            Some(sender) => deliver(name, sender, msg),
            None => Err(RoomError::NotConnected(name.clone())),
        };
        self.report(&result)
    }

    /// Sends `msg` to every bound player. Returns how many deliveries
    /// succeeded.
    pub fn broadcast(&self, msg: &ServerMessage) -> usize {
        self.senders
            .iter()
            .map(|(name, sender)| deliver(name, sender, msg.clone()))
            .filter(|result| self.report(result))
            .count()
    }

    /// Logs a failed delivery. Returns whether the delivery succeeded.
    fn report(&self, result: &Result<(), RoomError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(room_id = %self.room_id, error = %e, "delivery failed");
                false
            }
        }
    }
}

fn deliver(
    name: &PlayerName,
    sender: &PlayerSender,
    msg: ServerMessage,
) -> Result<(), RoomError> {
    sender
        .send(msg)
        .map_err(|_| RoomError::DeliveryFailed(name.clone()))
}

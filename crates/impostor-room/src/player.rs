//! A single participant and its per-round flags.

use impostor_protocol::{PlayerName, PublicPlayerView, RoundView};

/// A participant's role in the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Normal,
    Impostor,
}

/// One connected participant.
///
/// Lives exactly as long as its connection: a player who reconnects under
/// the same name gets a fresh `Player` with default flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: PlayerName,
    role: Role,
    is_first: bool,
    is_admin: bool,
}

impl Player {
    /// A fresh player: normal role, not first, not admin.
    pub fn new(name: PlayerName) -> Self {
        Self {
            name,
            role: Role::Normal,
            is_first: false,
            is_admin: false,
        }
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Shorthand for `role() == Role::Impostor`.
    pub fn is_impostor(&self) -> bool {
        self.role == Role::Impostor
    }

    /// Whether this player speaks first in the current round.
    pub fn is_first(&self) -> bool {
        self.is_first
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Marks this player as the round's impostor.
    pub fn set_as_impostor(&mut self) {
        self.role = Role::Impostor;
    }

    /// Gives this player the first turn.
    pub fn set_as_first(&mut self) {
        self.is_first = true;
    }

    /// Grants or revokes admin rights. The room keeps at most one admin.
    pub fn set_admin(&mut self, is_admin: bool) {
        self.is_admin = is_admin;
    }

    /// Back to [`Role::Normal`].
    pub fn clear_role(&mut self) {
        self.role = Role::Normal;
    }

    pub fn clear_first(&mut self) {
        self.is_first = false;
    }

    /// Resets role and first-turn flag. Runs at the top of every round.
    pub fn clear_state(&mut self) {
        self.clear_first();
        self.clear_role();
    }

    /// What the lobby shows about this player.
    pub fn public_room_view(&self) -> PublicPlayerView {
        PublicPlayerView {
            name: self.name.clone(),
            is_admin: self.is_admin,
        }
    }

    /// This player's private view of the round.
    ///
    /// The impostor never receives the item, whatever `current_item` is.
    pub fn round_view(&self, current_item: Option<&str>) -> RoundView {
        let item = if self.is_impostor() {
            None
        } else {
            current_item.map(str::to_owned)
        };
        RoundView {
            name: self.name.clone(),
            item,
            is_impostor: self.is_impostor(),
            is_first: self.is_first,
            is_admin: self.is_admin,
        }
    }
}

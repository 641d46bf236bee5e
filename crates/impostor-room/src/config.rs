//! Room configuration.

use serde::{Deserialize, Serialize};

use crate::RoomError;

/// Built-in character pool used when none is configured.
const DEFAULT_CHARACTERS: &[&str] = &[
    "Cat", "Dog", "Horse", "Cow", "Pig", "Sheep", "Rabbit", "Lion", "Tiger",
    "Elephant", "Giraffe", "Zebra", "Monkey", "Bear", "Wolf", "Fox", "Owl",
    "Eagle", "Penguin", "Dolphin", "Shark", "Whale", "Octopus", "Turtle",
    "Frog", "Snake", "Crocodile", "Kangaroo", "Koala", "Panda",
];

/// Configuration shared by every room the registry creates.
///
/// Both fields are fixed for a room's lifetime: a room keeps the quota and
/// pool that were current when it was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Exact number of players a round needs. Also the room's capacity.
    pub quota: usize,

    /// Items a round can reveal. Repeats across rounds are allowed.
    pub characters: Vec<String>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            quota: 2,
            characters: DEFAULT_CHARACTERS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl RoomConfig {
    /// Checks the config can actually run a round.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] when `quota` is zero or the pool is empty.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.quota == 0 {
            return Err(RoomError::InvalidConfig("quota must be at least 1".into()));
        }
        if self.characters.is_empty() {
            return Err(RoomError::InvalidConfig(
                "character pool must not be empty".into(),
            ));
        }
        Ok(())
    }
}

//! Loading a character pool from disk.

use std::path::Path;

use crate::ImpostorError;

/// Reads a JSON array of strings, e.g. `["Cat", "Dog", "Owl"]`.
///
/// Emptiness is not checked here; [`RoomConfig::validate`] rejects an
/// empty pool when the server is built.
///
/// [`RoomConfig::validate`]: impostor_room::RoomConfig::validate
pub fn load_characters(path: &Path) -> Result<Vec<String>, ImpostorError> {
    let failed = |reason: String| ImpostorError::Characters {
        path: path.to_path_buf(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| failed(e.to_string()))
}

//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// Decoding failures of client commands are not fatal to a connection:
/// the handler logs them and keeps reading.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `action`, or a missing
    /// field.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A player name was empty or equal to the unset sentinel.
    #[error("invalid player name: {0:?}")]
    InvalidPlayerName(String),

    /// An envelope carried a `kind` outside the known set.
    #[error("unknown message kind: {0}")]
    UnknownKind(u8),
}

//! Core protocol types for Impostor's wire format.
//!
//! Everything here travels over the connection as JSON. Server → client
//! traffic is wrapped in a `{ "kind": 1 | 2, "data": ... }` envelope;
//! client → server traffic is a bare `{ "action": ... }` command.

use std::borrow::Borrow;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ProtocolError;

/// The name clients send when they have not picked one yet.
///
/// Browsers stringify an unset variable as `"null"`, so this value is
/// rejected like the empty string.
pub const UNSET_PLAYER_NAME: &str = "null";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for a room.
///
/// Serialized as a plain string (`#[serde(transparent)]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A participant's display name, unique within its room.
///
/// Case-sensitive. Construct through [`PlayerName::parse`], which rejects
/// the empty string and [`UNSET_PLAYER_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    /// Validates a client-supplied name.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidPlayerName`] for `""` or `"null"`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ProtocolError> {
        let raw = raw.into();
        if raw.is_empty() || raw == UNSET_PLAYER_NAME {
            return Err(ProtocolError::InvalidPlayerName(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PlayerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Discriminates the payload of a server → client [`Envelope`].
///
/// Serialized as a bare number: `1` for the lobby snapshot, `2` for a
/// personalized round view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MessageKind {
    Waiting,
    Round,
}

impl From<MessageKind> for u8 {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Waiting => 1,
            MessageKind::Round => 2,
        }
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Waiting),
            2 => Ok(Self::Round),
            other => Err(ProtocolError::UnknownKind(other)),
        }
    }
}

/// The wrapper every server → client message travels in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub kind: MessageKind,
    pub data: T,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// What everyone in the lobby may know about a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPlayerView {
    pub name: PlayerName,
    pub is_admin: bool,
}

/// Lobby snapshot broadcast while a room waits for its next round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingState {
    /// Lets a client that created the room through `/ws` share its id.
    pub room_id: RoomId,
    pub quota: usize,
    pub active_count: usize,
    /// Connected players in join order.
    pub players: Vec<PublicPlayerView>,
}

/// One participant's private view of a freshly started round.
///
/// `item` is always `None` for the impostor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub name: PlayerName,
    pub item: Option<String>,
    pub is_impostor: bool,
    pub is_first: bool,
    pub is_admin: bool,
}

/// A server → client message.
///
/// On the wire this is an [`Envelope`] whose `kind` follows the variant:
///
/// ```text
/// { "kind": 1, "data": { "room_id": ..., "quota": 2, ... } }
/// { "kind": 2, "data": { "name": "Ana", "item": "Cat", ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Waiting(WaitingState),
    Round(RoundView),
}

impl ServerMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Waiting(_) => MessageKind::Waiting,
            Self::Round(_) => MessageKind::Round,
        }
    }
}

impl Serialize for ServerMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Waiting(data) => Envelope {
                kind: MessageKind::Waiting,
                data,
            }
            .serialize(serializer),
            Self::Round(data) => Envelope {
                kind: MessageKind::Round,
                data,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ServerMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The two payloads share no required fields, so the shape alone
        // picks the variant; `kind` must then agree with it.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Data {
            Waiting(WaitingState),
            Round(RoundView),
        }

        let envelope = Envelope::<Data>::deserialize(deserializer)?;
        match (envelope.kind, envelope.data) {
            (MessageKind::Waiting, Data::Waiting(w)) => Ok(Self::Waiting(w)),
            (MessageKind::Round, Data::Round(r)) => Ok(Self::Round(r)),
            (kind, _) => Err(D::Error::custom(format!(
                "payload does not match kind {}",
                u8::from(kind)
            ))),
        }
    }
}

/// A client → server command.
///
/// Internally tagged on `action`: `{ "action": "next_round" }`. Anything
/// else fails to decode and is ignored by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Admin asks for a new round (or a fresh lobby snapshot if the room
    /// is not full yet).
    NextRound,
}

// ---------------------------------------------------------------------------
// Status reporting
// ---------------------------------------------------------------------------

/// Monitoring view of one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub quota: usize,
    pub active_players: usize,
    pub players: Vec<PlayerName>,
    pub admins: Vec<PlayerName>,
}

/// Monitoring view of every live room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub total_rooms: usize,
    pub rooms: Vec<RoomSummary>,
}

/// Body sent on the `/status` routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusResponse {
    All(StatusReport),
    Room(RoomSummary),
    NotFound { error: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> PlayerName {
        PlayerName::parse(raw).unwrap()
    }

    #[test]
    fn test_player_name_parse_rejects_empty_and_sentinel() {
        assert!(matches!(
            PlayerName::parse(""),
            Err(ProtocolError::InvalidPlayerName(_))
        ));
        assert!(matches!(
            PlayerName::parse("null"),
            Err(ProtocolError::InvalidPlayerName(_))
        ));
    }

    #[test]
    fn test_player_name_is_case_sensitive() {
        assert_ne!(name("Ana"), name("ana"));
        assert_eq!(name("NULL").as_str(), "NULL");
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::new("ab12cd34")).unwrap();
        assert_eq!(json, "\"ab12cd34\"");
    }

    #[test]
    fn test_message_kind_rejects_unknown_number() {
        let result: Result<MessageKind, _> = serde_json::from_str("3");
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_waiting_json_format() {
        let msg = ServerMessage::Waiting(WaitingState {
            room_id: RoomId::new("r1"),
            quota: 2,
            active_count: 1,
            players: vec![PublicPlayerView {
                name: name("Ana"),
                is_admin: true,
            }],
        });
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["kind"], 1);
        assert_eq!(json["data"]["room_id"], "r1");
        assert_eq!(json["data"]["quota"], 2);
        assert_eq!(json["data"]["active_count"], 1);
        assert_eq!(json["data"]["players"][0]["name"], "Ana");
        assert_eq!(json["data"]["players"][0]["is_admin"], true);
    }

    #[test]
    fn test_server_message_round_json_format_for_impostor() {
        let msg = ServerMessage::Round(RoundView {
            name: name("Beto"),
            item: None,
            is_impostor: true,
            is_first: false,
            is_admin: false,
        });
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["kind"], 2);
        assert!(json["data"]["item"].is_null());
        assert_eq!(json["data"]["is_impostor"], true);
    }

    #[test]
    fn test_server_message_decodes_by_kind() {
        let json = r#"{"kind":2,"data":{"name":"Ana","item":"Cat","is_impostor":false,"is_first":true,"is_admin":true}}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind(), MessageKind::Round);
        match msg {
            ServerMessage::Round(view) => assert_eq!(view.item.as_deref(), Some("Cat")),
            other => panic!("expected round view, got {other:?}"),
        }
    }

    #[test]
    fn test_server_message_rejects_kind_payload_mismatch() {
        let json = r#"{"kind":1,"data":{"name":"Ana","item":null,"is_impostor":true,"is_first":false,"is_admin":false}}"#;
        let result: Result<ServerMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_command_ignores_extra_fields() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"action":"next_round","extra":1}"#).unwrap();
        assert_eq!(cmd, ClientCommand::NextRound);
    }

    #[test]
    fn test_client_command_unknown_action_fails() {
        let result: Result<ClientCommand, _> =
            serde_json::from_str(r#"{"action":"kick"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_response_not_found_shape() {
        let resp = StatusResponse::NotFound {
            error: "room zz not found".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "room zz not found" }));
    }
}

//! Routing on the WebSocket upgrade URI.
//!
//! ```text
//! /ws?player_name=Ana            create a room and join it
//! /ws/<room_id>?player_name=Ana  join an existing room
//! /status                        every room
//! /status/<room_id>              one room
//! ```

use impostor_protocol::RoomId;
use serde::Deserialize;

/// Where an incoming connection asked to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    /// Join `room`, or a freshly created room when `None`.
    ///
    /// `player_name` is raw: an absent parameter is the empty string,
    /// which name validation rejects.
    Join {
        room: Option<RoomId>,
        player_name: String,
    },
    /// Monitoring, for one room or all of them.
    Status(Option<RoomId>),
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
struct JoinQuery {
    #[serde(default)]
    player_name: String,
}

pub(crate) fn parse(path: &str, query: Option<&str>) -> Route {
    let mut segments = path.trim_matches('/').split('/');
    let head = segments.next().unwrap_or_default();
    let room = segments.next().filter(|s| !s.is_empty()).map(RoomId::from);
    if segments.next().is_some() {
        return Route::Unknown;
    }

    match head {
        "ws" => Route::Join {
            room,
            player_name: player_name(query),
        },
        "status" => Route::Status(room),
        _ => Route::Unknown,
    }
}

fn player_name(query: Option<&str>) -> String {
    query
        .and_then(|q| serde_urlencoded::from_str::<JoinQuery>(q).ok())
        .unwrap_or_default()
        .player_name
}

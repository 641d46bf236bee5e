//! Integration tests for the room system, driven through the manager and
//! room handles the way a connection handler drives them.

use impostor_protocol::{PlayerName, RoomId, RoundView, ServerMessage, WaitingState};
use impostor_room::{NextRound, RoomConfig, RoomError, RoomHandle, RoomManager};
use tokio::sync::mpsc::{self, UnboundedReceiver};

// =========================================================================
// Helpers
// =========================================================================

fn name(raw: &str) -> PlayerName {
    PlayerName::parse(raw).unwrap()
}

fn manager(quota: usize) -> RoomManager {
    let config = RoomConfig {
        quota,
        characters: vec!["Cat".into(), "Dog".into(), "Owl".into()],
    };
    RoomManager::with_seed(config, 2024).unwrap()
}

/// Joins `raw` to the room, returning its outbound receiver on success.
async fn join(handle: &RoomHandle, raw: &str) -> Option<UnboundedReceiver<ServerMessage>> {
    let (tx, rx) = mpsc::unbounded_channel();
    handle
        .connect(name(raw), tx)
        .await
        .unwrap()
        .then_some(rx)
}

fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn last_waiting(rx: &mut UnboundedReceiver<ServerMessage>) -> WaitingState {
    drain(rx)
        .into_iter()
        .rev()
        .find_map(|m| match m {
            ServerMessage::Waiting(state) => Some(state),
            ServerMessage::Round(_) => None,
        })
        .expect("a waiting message should have been delivered")
}

fn only_round(rx: &mut UnboundedReceiver<ServerMessage>) -> RoundView {
    let rounds: Vec<_> = drain(rx)
        .into_iter()
        .filter_map(|m| match m {
            ServerMessage::Round(view) => Some(view),
            ServerMessage::Waiting(_) => None,
        })
        .collect();
    assert_eq!(rounds.len(), 1, "exactly one round view per round");
    rounds.into_iter().next().unwrap()
}

// =========================================================================
// Lobby flow
// =========================================================================

#[tokio::test]
async fn test_two_players_join_and_see_lobby() {
    let mut mgr = manager(2);
    let (id, room) = mgr.get_or_create(None);

    let mut ana = join(&room, "Ana").await.unwrap();
    let mut beto = join(&room, "Beto").await.unwrap();
    assert_eq!(room.broadcast_waiting().await.unwrap(), 2);

    for rx in [&mut ana, &mut beto] {
        let state = last_waiting(rx);
        assert_eq!(state.room_id, id);
        assert_eq!(state.quota, 2);
        assert_eq!(state.active_count, 2);
        let admins: Vec<_> = state
            .players
            .iter()
            .filter(|p| p.is_admin)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(admins, ["Ana"]);
    }
    assert!(room.is_complete().await.unwrap());
}

#[tokio::test]
async fn test_third_player_rejected_from_full_room() {
    let mut mgr = manager(2);
    let (_, room) = mgr.get_or_create(None);
    let _ana = join(&room, "Ana").await.unwrap();
    let _beto = join(&room, "Beto").await.unwrap();

    assert!(join(&room, "Caro").await.is_none());
    assert_eq!(room.player_count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let mut mgr = manager(3);
    let (_, room) = mgr.get_or_create(None);
    let _ana = join(&room, "Ana").await.unwrap();

    assert!(join(&room, "Ana").await.is_none());
    assert_eq!(room.player_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_names_are_case_sensitive() {
    let mut mgr = manager(3);
    let (_, room) = mgr.get_or_create(None);
    let _ana = join(&room, "Ana").await.unwrap();

    assert!(join(&room, "ana").await.is_some());
}

// =========================================================================
// Rounds
// =========================================================================

#[tokio::test]
async fn test_admin_next_round_deals_private_views() {
    let mut mgr = manager(3);
    let (_, room) = mgr.get_or_create(None);
    let mut rxs = Vec::new();
    for n in ["Ana", "Beto", "Caro"] {
        rxs.push(join(&room, n).await.unwrap());
    }

    for _ in 0..5 {
        assert_eq!(
            room.request_next_round(name("Ana")).await.unwrap(),
            NextRound::Started
        );

        let views: Vec<_> = rxs.iter_mut().map(only_round).collect();
        assert_eq!(views.iter().filter(|v| v.is_impostor).count(), 1);
        assert_eq!(views.iter().filter(|v| v.is_first).count(), 1);

        let crew_items: Vec<_> = views
            .iter()
            .filter(|v| !v.is_impostor)
            .map(|v| v.item.clone().expect("crew sees the item"))
            .collect();
        assert!(crew_items.windows(2).all(|w| w[0] == w[1]));
        assert!(views.iter().filter(|v| v.is_impostor).all(|v| v.item.is_none()));
    }
}

#[tokio::test]
async fn test_non_admin_next_round_changes_nothing() {
    let mut mgr = manager(2);
    let (_, room) = mgr.get_or_create(None);
    let mut ana = join(&room, "Ana").await.unwrap();
    let mut beto = join(&room, "Beto").await.unwrap();

    assert_eq!(
        room.request_next_round(name("Beto")).await.unwrap(),
        NextRound::Ignored
    );
    assert!(drain(&mut ana).is_empty());
    assert!(drain(&mut beto).is_empty());
}

#[tokio::test]
async fn test_next_round_on_incomplete_room_rebroadcasts_lobby() {
    let mut mgr = manager(3);
    let (_, room) = mgr.get_or_create(None);
    let mut ana = join(&room, "Ana").await.unwrap();
    let _beto = join(&room, "Beto").await.unwrap();

    assert_eq!(
        room.request_next_round(name("Ana")).await.unwrap(),
        NextRound::Waiting
    );
    assert_eq!(last_waiting(&mut ana).active_count, 2);
    assert!(!room.start_round().await.unwrap());
}

#[tokio::test]
async fn test_round_survives_a_dead_connection() {
    let mut mgr = manager(3);
    let (_, room) = mgr.get_or_create(None);
    let mut ana = join(&room, "Ana").await.unwrap();
    let beto = join(&room, "Beto").await.unwrap();
    let mut caro = join(&room, "Caro").await.unwrap();
    drop(beto);

    assert!(room.start_round().await.unwrap());
    only_round(&mut ana);
    only_round(&mut caro);
}

// =========================================================================
// Departures and cleanup
// =========================================================================

#[tokio::test]
async fn test_departures_then_room_removed() {
    let mut mgr = manager(2);
    let (id, room) = mgr.get_or_create(None);
    let mut ana = join(&room, "Ana").await.unwrap();
    let _beto = join(&room, "Beto").await.unwrap();

    // Non-admin leaves: admin unchanged, room kept.
    assert!(room.disconnect(name("Beto")).await.unwrap());
    room.broadcast_waiting().await.unwrap();
    let state = last_waiting(&mut ana);
    assert_eq!(state.active_count, 1);
    assert!(state.players[0].is_admin);
    assert!(!mgr.remove(&id).await);

    // Admin leaves: room empty, remove succeeds.
    assert!(room.disconnect(name("Ana")).await.unwrap());
    assert!(mgr.remove(&id).await);
    assert!(mgr.resolve(&id).is_none());
}

#[tokio::test]
async fn test_admin_departure_hands_over_admin() {
    let mut mgr = manager(3);
    let (_, room) = mgr.get_or_create(None);
    let _ana = join(&room, "Ana").await.unwrap();
    let mut beto = join(&room, "Beto").await.unwrap();
    let _caro = join(&room, "Caro").await.unwrap();

    room.disconnect(name("Ana")).await.unwrap();
    room.broadcast_waiting().await.unwrap();

    let state = last_waiting(&mut beto);
    assert_eq!(state.players.iter().filter(|p| p.is_admin).count(), 1);
    assert!(state.players.iter().all(|p| p.name.as_str() != "Ana"));
}

#[tokio::test]
async fn test_disconnect_unknown_player_is_noop() {
    let mut mgr = manager(2);
    let (_, room) = mgr.get_or_create(None);
    let _ana = join(&room, "Ana").await.unwrap();

    assert!(!room.disconnect(name("Ghost")).await.unwrap());
    assert_eq!(room.player_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_connect_racing_remove_keeps_room() {
    let mut mgr = manager(2);
    let (id, room) = mgr.get_or_create(None);
    let ana = join(&room, "Ana").await.unwrap();
    room.disconnect(name("Ana")).await.unwrap();
    drop(ana);

    // A newcomer lands before the departing handler calls remove.
    let _beto = join(&room, "Beto").await.unwrap();

    assert!(!mgr.remove(&id).await);
    assert!(mgr.resolve(&id).is_some());
}

#[tokio::test]
async fn test_handle_unavailable_after_remove() {
    let mut mgr = manager(2);
    let (id, room) = mgr.get_or_create(None);
    assert!(mgr.remove(&id).await);

    let (tx, _rx) = mpsc::unbounded_channel();
    let result = room.connect(name("Ana"), tx).await;
    assert!(matches!(result, Err(RoomError::Unavailable(r)) if r == id));
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_rooms_are_independent() {
    let mut mgr = manager(2);
    let (a, room_a) = mgr.get_or_create(None);
    let (b, room_b) = mgr.get_or_create(None);
    assert_ne!(a, b);

    let _ana = join(&room_a, "Ana").await.unwrap();
    let _ana_b = join(&room_b, "Ana").await.unwrap();

    assert_eq!(room_a.player_count().await.unwrap(), 1);
    assert_eq!(room_b.player_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_snapshot_summaries() {
    let mut mgr = manager(2);
    let (id, room) = mgr.get_or_create(Some(RoomId::new("lobby")));
    let _ana = join(&room, "Ana").await.unwrap();

    let snapshot = mgr.snapshot();
    assert_eq!(snapshot.len(), 1);

    let summary = snapshot[&id].summary().await.unwrap();
    assert_eq!(summary.room_id, RoomId::new("lobby"));
    assert_eq!(summary.quota, 2);
    assert_eq!(summary.players, vec![name("Ana")]);
    assert_eq!(summary.admins, vec![name("Ana")]);
}

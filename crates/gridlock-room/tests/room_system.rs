//! Integration tests for room allocation and lifecycle.

use gridlock_protocol::{RoomStatus, MAX_ROOM_PLAYERS};
use gridlock_room::{RoomError, RoomManager};
use gridlock_store::{
    GameStore, MemoryStatsStore, MemoryStore,
};
use gridlock_sim::SimulationHub;

fn manager() -> RoomManager<MemoryStore, MemoryStatsStore> {
    let store = GameStore::new(MemoryStore::new());
    let hub = SimulationHub::new(store.clone(), MemoryStatsStore::new());
    RoomManager::new(store, hub)
}

// =========================================================================
// Creation and allocation
// =========================================================================

#[tokio::test]
async fn test_create_room_mints_waiting_room_with_seed() {
    let mgr = manager();
    let room = mgr.create_room().await.unwrap();

    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.max_players, MAX_ROOM_PLAYERS);
    assert_eq!(room.current_players, 0);
    assert!(room.room_seed >= 0);
    assert!(room.id.as_str().starts_with("room_"));
    // room_{epoch_ms}_{rand9}
    let suffix = room.id.as_str().rsplit('_').next().unwrap();
    assert_eq!(suffix.len(), 9);

    let listed = mgr.get_all_rooms().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, room.id);
}

#[tokio::test]
async fn test_room_seed_is_stable_for_room_lifetime() {
    let mgr = manager();
    let room = mgr.create_room().await.unwrap();
    let seed = room.room_seed;

    let (joined, _) = mgr.join_auto("ada").await.unwrap();
    assert_eq!(joined.id, room.id);
    assert_eq!(joined.room_seed, seed);

    let started = mgr.start_room_game(&room.id).await.unwrap();
    assert_eq!(started.room_seed, seed);
}

#[tokio::test]
async fn test_find_available_prefers_playing_rooms() {
    let mgr = manager();
    // One PLAYING room with a member, one empty WAITING room.
    let (occupied, _) = mgr.join_auto("ada").await.unwrap();
    mgr.start_room_game(&occupied.id).await.unwrap();
    let waiting = mgr.create_room().await.unwrap();

    let found = mgr.find_available_room().await.unwrap().unwrap();
    assert_eq!(found.id, occupied.id);
    assert_eq!(found.status, RoomStatus::Playing);

    // A joiner is routed into the live game, not the empty lobby.
    let (joined, _) = mgr.join_auto("bob").await.unwrap();
    assert_eq!(joined.id, occupied.id);
    assert_ne!(joined.id, waiting.id);
}

#[tokio::test]
async fn test_join_auto_validation_rejects_blank_name() {
    let mgr = manager();
    let result = mgr.join_auto("   ").await;
    assert!(matches!(
        result,
        Err(RoomError::Validation { .. })
    ));
    // No half-created room may remain behind.
    assert!(mgr.get_all_rooms().await.unwrap().is_empty());
}

// =========================================================================
// The 99-player cap
// =========================================================================

#[tokio::test]
async fn test_room_cap_spills_hundredth_player_into_new_room() {
    let mgr = manager();

    let mut first_room = None;
    for i in 0..MAX_ROOM_PLAYERS {
        let (room, _) =
            mgr.join_auto(&format!("p{i}")).await.unwrap();
        match &first_room {
            None => first_room = Some(room.id.clone()),
            Some(id) => assert_eq!(
                &room.id, id,
                "players below the cap share one room"
            ),
        }
    }
    let first_room = first_room.unwrap();

    let full = mgr.get_room(&first_room).await.unwrap();
    assert_eq!(full.current_players, MAX_ROOM_PLAYERS);
    assert!(!full.has_capacity());

    // Player 100 lands somewhere else.
    let (overflow_room, _) = mgr.join_auto("p99").await.unwrap();
    assert_ne!(overflow_room.id, first_room);
    assert_eq!(overflow_room.current_players, 1);

    // Both rooms are listed.
    let all = mgr.get_all_rooms().await.unwrap();
    assert_eq!(all.len(), 2);
    let ids: Vec<_> = all.iter().map(|r| r.id.clone()).collect();
    assert!(ids.contains(&first_room));
    assert!(ids.contains(&overflow_room.id));
}

// =========================================================================
// Leave and cleanup
// =========================================================================

#[tokio::test]
async fn test_leave_decrements_and_deletes_empty_room() {
    let mgr = manager();
    let (room, ada) = mgr.join_auto("ada").await.unwrap();
    let (_, bob) = mgr.join_auto("bob").await.unwrap();
    assert_eq!(
        mgr.get_room(&room.id).await.unwrap().current_players,
        2
    );

    mgr.leave_auto(&room.id, &ada.id).await.unwrap();
    let remaining = mgr.get_room(&room.id).await.unwrap();
    assert_eq!(remaining.current_players, 1);

    mgr.leave_auto(&room.id, &bob.id).await.unwrap();
    // currentPlayers hit zero: the room is gone immediately.
    assert!(matches!(
        mgr.get_room(&room.id).await,
        Err(RoomError::NotFound(_))
    ));
    assert!(mgr.get_all_rooms().await.unwrap().is_empty());
    assert_eq!(mgr.hub().live_count().await, 0);
}

#[tokio::test]
async fn test_leave_unknown_room_is_not_found() {
    let mgr = manager();
    let (_, player) = mgr.join_auto("ada").await.unwrap();
    let result = mgr
        .leave_auto(
            &gridlock_protocol::RoomId::new("room_0_missing"),
            &player.id,
        )
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_leave_clears_player_and_game_state_records() {
    let mgr = manager();
    let (room, player) = mgr.join_auto("ada").await.unwrap();

    assert!(mgr.hub().state_of(&player.id).await.is_ok());
    mgr.leave_auto(&room.id, &player.id).await.unwrap();
    assert!(mgr.hub().state_of(&player.id).await.is_err());
}

// =========================================================================
// Starting games
// =========================================================================

#[tokio::test]
async fn test_start_room_game_flips_status_and_starts_players() {
    let mgr = manager();
    let (room, ada) = mgr.join_auto("ada").await.unwrap();
    let (_, bob) = mgr.join_auto("bob").await.unwrap();

    let started = mgr.start_room_game(&room.id).await.unwrap();
    assert_eq!(started.status, RoomStatus::Playing);

    for player in [&ada, &bob] {
        let state =
            mgr.hub().state_of(&player.id).await.unwrap();
        assert!(state.game_started, "{} should be live", player.name);
        assert!(state.current_piece.is_some());
    }
}

#[tokio::test]
async fn test_start_room_game_twice_cannot_start() {
    let mgr = manager();
    let (room, _) = mgr.join_auto("ada").await.unwrap();
    mgr.start_room_game(&room.id).await.unwrap();

    let result = mgr.start_room_game(&room.id).await;
    assert!(matches!(
        result,
        Err(RoomError::CannotStart {
            status: RoomStatus::Playing,
            ..
        })
    ));
}

#[tokio::test]
async fn test_start_unknown_room_not_found() {
    let mgr = manager();
    let result = mgr
        .start_room_game(&gridlock_protocol::RoomId::new(
            "room_0_missing",
        ))
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

// =========================================================================
// Queries
// =========================================================================

#[tokio::test]
async fn test_room_players_returns_roster() {
    let mgr = manager();
    let (room, _) = mgr.join_auto("ada").await.unwrap();
    mgr.join_auto("bob").await.unwrap();

    let mut names: Vec<_> = mgr
        .room_players(&room.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["ada", "bob"]);
}

#[tokio::test]
async fn test_server_stats_aggregates_rooms() {
    let mgr = manager();
    mgr.join_auto("ada").await.unwrap();
    mgr.join_auto("bob").await.unwrap();

    let stats = mgr.server_stats().await.unwrap();
    assert_eq!(stats.total_rooms, 1);
    assert_eq!(stats.total_players, 2);
    assert_eq!(stats.rooms.len(), 1);
}

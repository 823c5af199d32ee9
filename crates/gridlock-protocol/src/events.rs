//! Broadcast event payloads.
//!
//! These are the messages published on the state store's pub/sub
//! channels and forwarded unchanged by the gateway fan-out to the
//! matching transport room or per-player channel.

use serde::{Deserialize, Serialize};

use crate::entities::{Player, PlayerGameState, Room, RoomStats};
use crate::ids::{PlayerId, RoomId};

/// Everything the server broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum BroadcastEvent {
    /// Per-player state delta, published on
    /// `game_state_update:{playerId}` after every mutation.
    GameStateUpdate {
        player_id: PlayerId,
        game_state: PlayerGameState,
    },

    /// Terminal per-player update: the game is over and the state
    /// record has been cleared.
    PlayerGameOver {
        player_id: PlayerId,
        game_over: bool,
        score: u64,
        level: u32,
        lines_cleared: u32,
    },

    /// Explicit start signal on `game_started:{playerId}`.
    GameStarted {
        player_id: PlayerId,
        game_state: PlayerGameState,
    },

    /// Roster or score change on `player_state_changed:{roomId}`.
    PlayerStateChanged {
        room_id: RoomId,
        players: Vec<Player>,
    },

    /// Room shape change on `room_state_update:{roomId}`.
    RoomStateUpdate {
        room_id: RoomId,
        players: Vec<Player>,
        room_info: Room,
        player_count: u32,
        timestamp: u64,
    },

    RoomStatsUpdate {
        room_id: RoomId,
        stats: RoomStats,
    },

    PlayerJoined {
        room_id: RoomId,
        player: Player,
    },

    PlayerLeft {
        room_id: RoomId,
        player_id: PlayerId,
    },

    RoomGameStarted {
        room_id: RoomId,
        game_seed: i32,
        timestamp: u64,
    },
}

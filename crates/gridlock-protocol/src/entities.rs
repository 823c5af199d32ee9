//! The server-owned records: rooms, players, and per-player game state.
//!
//! These are the shapes that live in the state store (JSON-encoded,
//! 1-hour TTL) and travel to clients in replies and broadcasts. Field
//! names are camelCase on the wire.

use gridlock_core::{Board, Piece, PieceType};
use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, RoomId};

/// Hard cap on players per room. The cap is 99 everywhere; the
/// `max_players` field on [`Room`] is stored for clients but always
/// written with this value.
pub const MAX_ROOM_PLAYERS: u32 = 99;

/// Room lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

impl RoomStatus {
    /// Whether new players may still be routed into the room. Both
    /// waiting and in-progress rooms accept joins (late joiners get
    /// their own fresh simulation).
    pub fn accepts_players(self) -> bool {
        matches!(self, RoomStatus::Waiting | RoomStatus::Playing)
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomStatus::Waiting => f.write_str("WAITING"),
            RoomStatus::Playing => f.write_str("PLAYING"),
            RoomStatus::Finished => f.write_str("FINISHED"),
        }
    }
}

/// Aggregate counters kept on the room record.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub games_finished: u32,
    pub total_score: u64,
    pub total_lines_cleared: u64,
}

/// A multiplayer lobby of up to 99 players sharing a seed but running
/// independent per-player simulations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub status: RoomStatus,
    pub max_players: u32,
    pub current_players: u32,
    /// Assigned at creation, never mutated afterwards.
    pub room_seed: i32,
    /// Epoch milliseconds.
    pub created_at: u64,
    pub last_activity: u64,
    #[serde(default)]
    pub stats: RoomStats,
}

impl Room {
    /// Whether another player fits under the cap.
    pub fn has_capacity(&self) -> bool {
        self.current_players < MAX_ROOM_PLAYERS
    }
}

/// Player lifecycle status within a room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    Alive,
    Eliminated,
    Spectating,
}

/// A connected player. Created on join, deleted on leave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
    pub room_id: RoomId,
    pub status: PlayerStatus,
    pub score: u64,
    pub lines_cleared: u32,
    pub level: u32,
}

/// The authoritative per-player simulation state.
///
/// Exists iff its [`Player`] exists. Everything here is produced by
/// the server's own simulation — the client only ever contributed
/// [`Action`](crate::Action)s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGameState {
    pub player_id: PlayerId,
    pub room_id: RoomId,
    pub board: Board,
    pub current_piece: Option<Piece>,
    /// `None` only in the terminal cleared state after game-over.
    pub next_piece: Option<PieceType>,
    pub held_piece: Option<PieceType>,
    pub can_hold: bool,
    pub ghost_piece: Option<Piece>,
    pub score: u64,
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
    pub paused: bool,
    pub game_started: bool,
    /// Always a permutation of the seven types.
    pub tetromino_bag: Vec<PieceType>,
    /// Next index to draw from the bag; `0..=7`.
    pub bag_index: u32,
    /// Monotonic, starts at 1; `(game_seed, bag_number)` determines
    /// the bag contents.
    pub bag_number: u32,
    pub game_seed: i32,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Server-wide aggregate returned by `getRoomStats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    pub total_rooms: u32,
    pub total_players: u32,
    pub rooms: Vec<Room>,
}

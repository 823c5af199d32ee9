//! The per-connection sync ledger.

use std::time::Instant;

use gridlock_protocol::{PlayerId, RoomId};

/// Server-side record of one connected client.
///
/// Lives for the duration of a connection; discarded on disconnect.
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub player_id: PlayerId,
    pub room_id: Option<RoomId>,
    /// Highest `seq` accepted from an `input_event`. Zero until the
    /// first input arrives.
    pub last_seq: u64,
    /// When the last ping was handled.
    pub last_ping: Option<Instant>,
    /// Round-trip estimate in milliseconds, from ping timestamps.
    pub latency_ms: Option<u64>,
    /// Client-clock minus server-clock estimate in milliseconds.
    pub clock_offset_ms: Option<i64>,
    /// Number of desync reports this connection has filed.
    pub desync_reports: u32,
}

impl ClientSession {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            room_id: None,
            last_seq: 0,
            last_ping: None,
            latency_ms: None,
            clock_offset_ms: None,
            desync_reports: 0,
        }
    }
}

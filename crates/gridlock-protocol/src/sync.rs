//! The network-sync protocol.
//!
//! Kept for clients that negotiate it: a seq-stamped side channel for
//! input ordering, latency probes, snapshots, and desync reporting.
//! Tags are snake_case, which keeps this vocabulary disjoint from the
//! camelCase request set.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::entities::PlayerGameState;
use crate::ids::PlayerId;

/// Sync messages sent by the client. Every variant carries a
/// monotonic `seq`; the session layer rejects duplicates and
/// regressions on `input_event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum SyncMessage {
    JoinGame { seq: u64, player_id: PlayerId },
    MatchReady { seq: u64, player_id: PlayerId },
    InputEvent {
        seq: u64,
        player_id: PlayerId,
        action: Action,
    },
    Ping { seq: u64, client_time: u64 },
    SnapshotRequest { seq: u64, player_id: PlayerId },
    Ack { seq: u64 },
    Keepalive { seq: u64 },
    DesyncReport {
        seq: u64,
        player_id: PlayerId,
        details: String,
    },
}

impl SyncMessage {
    /// The sequence number carried by every sync message.
    pub fn seq(&self) -> u64 {
        match self {
            SyncMessage::JoinGame { seq, .. }
            | SyncMessage::MatchReady { seq, .. }
            | SyncMessage::InputEvent { seq, .. }
            | SyncMessage::Ping { seq, .. }
            | SyncMessage::SnapshotRequest { seq, .. }
            | SyncMessage::Ack { seq }
            | SyncMessage::Keepalive { seq }
            | SyncMessage::DesyncReport { seq, .. } => *seq,
        }
    }
}

/// Sync replies. `pong` and `state_snapshot` carry server timestamps
/// so the client can estimate its clock offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum SyncReply {
    Pong {
        seq: u64,
        client_time: u64,
        server_time: u64,
    },
    StateSnapshot {
        seq: u64,
        server_time: u64,
        game_state: PlayerGameState,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_tags_are_snake_case() {
        let ping = SyncMessage::Ping {
            seq: 7,
            client_time: 123,
        };
        let json = serde_json::to_value(&ping).unwrap();
        assert_eq!(json["type"], "ping");
        assert_eq!(json["clientTime"], 123);

        let report: SyncMessage = serde_json::from_value(
            serde_json::json!({
                "type": "desync_report",
                "seq": 9,
                "playerId": PlayerId::random(),
                "details": "board mismatch at tick 40"
            }),
        )
        .unwrap();
        assert!(matches!(report, SyncMessage::DesyncReport { .. }));
    }

    #[test]
    fn test_every_sync_message_exposes_seq() {
        let id = PlayerId::random();
        let messages = [
            SyncMessage::JoinGame { seq: 1, player_id: id },
            SyncMessage::Ack { seq: 2 },
            SyncMessage::Keepalive { seq: 3 },
            SyncMessage::InputEvent {
                seq: 4,
                player_id: id,
                action: Action::Rotate,
            },
        ];
        let seqs: Vec<u64> =
            messages.iter().map(SyncMessage::seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_pong_carries_both_timestamps() {
        let pong = SyncReply::Pong {
            seq: 1,
            client_time: 100,
            server_time: 140,
        };
        let json = serde_json::to_value(&pong).unwrap();
        assert_eq!(json["type"], "pong");
        assert_eq!(json["clientTime"], 100);
        assert_eq!(json["serverTime"], 140);
    }
}

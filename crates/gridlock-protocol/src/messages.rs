//! Inbound requests and the reply envelopes.
//!
//! Requests are internally tagged (`{"type": "joinAutoRoom", …}`);
//! replies are plain `{success, …}` objects in the shape each request
//! documents. Every request receives exactly one terminal reply.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::entities::{Player, PlayerGameState, Room, ServerStats};
use crate::error::ErrorBody;
use crate::ids::{PlayerId, RoomId};
use crate::sync::SyncMessage;

/// The closed set of request types the gateway dispatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientRequest {
    /// Route the player into an available room, creating one if needed.
    JoinAutoRoom { name: String },

    /// Leave the room joined through `joinAutoRoom`.
    LeaveAutoRoom { room_id: RoomId, player_id: PlayerId },

    /// Submit one action for the player's own simulation. No direct
    /// reply — effects arrive through the pub/sub fan-out.
    HandlePlayerInput { player_id: PlayerId, action: Action },

    /// Fetch the player's authoritative game state.
    GetPlayerGameState { player_id: PlayerId },

    /// Fetch the roster of a room.
    GetRoomPlayers { room_id: RoomId },

    /// Re-publish the room's state on its broadcast topic.
    GetRoomInfo { room_id: RoomId },

    /// Server-wide room statistics.
    GetRoomStats,

    /// Flip the room to PLAYING and start every member's game.
    StartRoomGame { room_id: RoomId },
}

/// Anything a client can put on the wire: a request or a
/// network-sync message. The two tag vocabularies are disjoint
/// (camelCase requests, snake_case sync), so untagged resolution is
/// unambiguous.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    Request(ClientRequest),
    Sync(SyncMessage),
}

// ---------------------------------------------------------------------------
// Reply envelopes
// ---------------------------------------------------------------------------

/// Reply to `joinAutoRoom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReply {
    pub success: bool,
    pub room_id: RoomId,
    pub player: Player,
}

/// Bare acknowledgement (`leaveAutoRoom`, `getRoomInfo`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckReply {
    pub success: bool,
}

/// Reply to `getPlayerGameState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateReply {
    pub success: bool,
    pub game_state: PlayerGameState,
}

/// Reply to `getRoomPlayers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPlayersReply {
    pub success: bool,
    pub players: Vec<Player>,
}

/// Reply to `getRoomInfo`. The full room state also goes out on the
/// room's broadcast topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfoReply {
    pub success: bool,
    pub room: Room,
}

/// Reply to `getRoomStats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomStatsReply {
    pub success: bool,
    pub stats: ServerStats,
}

/// Reply to `startRoomGame`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartReply {
    pub success: bool,
    pub room_id: RoomId,
    pub game_seed: i32,
}

/// The failure envelope every handler falls back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorReply {
    pub fn new(error: ErrorBody) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_join_auto_room_wire_shape() {
        let req: ClientRequest = serde_json::from_str(
            r#"{"type": "joinAutoRoom", "name": "ada"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            ClientRequest::JoinAutoRoom { name: "ada".into() }
        );
    }

    #[test]
    fn test_handle_player_input_wire_shape() {
        let id = PlayerId::random();
        let json = format!(
            r#"{{"type": "handlePlayerInput", "playerId": "{id}", "action": "hardDrop"}}"#
        );
        let req: ClientRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(
            req,
            ClientRequest::HandlePlayerInput {
                player_id: id,
                action: Action::HardDrop
            }
        );
    }

    #[test]
    fn test_get_room_stats_has_no_body() {
        let req: ClientRequest =
            serde_json::from_str(r#"{"type": "getRoomStats"}"#).unwrap();
        assert_eq!(req, ClientRequest::GetRoomStats);
    }

    #[test]
    fn test_unknown_request_type_is_rejected() {
        let result: Result<ClientRequest, _> = serde_json::from_str(
            r#"{"type": "sendGarbageLines", "lines": 4}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_inbound_distinguishes_requests_from_sync() {
        let req: Inbound = serde_json::from_str(
            r#"{"type": "getRoomStats"}"#,
        )
        .unwrap();
        assert!(matches!(req, Inbound::Request(_)));

        let sync: Inbound = serde_json::from_str(
            r#"{"type": "ping", "seq": 3, "clientTime": 12}"#,
        )
        .unwrap();
        assert!(matches!(sync, Inbound::Sync(SyncMessage::Ping { .. })));
    }

    #[test]
    fn test_error_reply_wire_shape() {
        let reply = ErrorReply::new(ErrorBody::new(
            ErrorCode::RoomNotFound,
            "room room_1_x not found",
        ));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "ROOM_NOT_FOUND");
    }

    #[test]
    fn test_start_reply_wire_shape() {
        let reply = StartReply {
            success: true,
            room_id: RoomId::new("room_9_z"),
            game_seed: 4242,
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["roomId"], "room_9_z");
        assert_eq!(json["gameSeed"], 4242);
    }
}

//! The pub/sub channel namespace.
//!
//! Four channel families carry everything the gateway fans out, plus
//! the legacy per-game map channel. The gateway subscribes to the
//! patterns exactly once at startup and routes each delivered message
//! by parsing its channel name back into `(kind, id)`.

use gridlock_protocol::{PlayerId, RoomId};

/// Channel name builders.
pub mod channel {
    use super::*;

    /// `game_state_update:{playerId}` — per-player state deltas and
    /// the terminal game-over message.
    pub fn game_state_update(player_id: &PlayerId) -> String {
        format!("game_state_update:{player_id}")
    }

    /// `game_started:{playerId}` — explicit start signal.
    pub fn game_started(player_id: &PlayerId) -> String {
        format!("game_started:{player_id}")
    }

    /// `player_state_changed:{roomId}` — roster and score changes.
    pub fn player_state_changed(room_id: &RoomId) -> String {
        format!("player_state_changed:{room_id}")
    }

    /// `room_state_update:{roomId}` — room shape changes.
    pub fn room_state_update(room_id: &RoomId) -> String {
        format!("room_state_update:{room_id}")
    }

    /// `tetris:{gameId}` — legacy map channel.
    pub fn legacy_game(room_id: &RoomId) -> String {
        format!("tetris:{room_id}")
    }
}

/// The patterns the gateway subscribes to at startup.
pub mod patterns {
    pub const GAME_STATE_UPDATE: &str = "game_state_update:*";
    pub const GAME_STARTED: &str = "game_started:*";
    pub const PLAYER_STATE_CHANGED: &str = "player_state_changed:*";
    pub const ROOM_STATE_UPDATE: &str = "room_state_update:*";

    /// All four, in subscription order.
    pub const ALL: [&str; 4] = [
        GAME_STATE_UPDATE,
        GAME_STARTED,
        PLAYER_STATE_CHANGED,
        ROOM_STATE_UPDATE,
    ];
}

/// Which channel family a delivered message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    GameStateUpdate,
    GameStarted,
    PlayerStateChanged,
    RoomStateUpdate,
}

/// A parsed channel name: the family plus the id suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChannel {
    pub kind: ChannelKind,
    pub id: String,
}

/// Splits a concrete channel name back into `(kind, id)`.
/// Returns `None` for channels outside the four families.
pub fn parse_channel(name: &str) -> Option<ParsedChannel> {
    let (prefix, id) = name.split_once(':')?;
    let kind = match prefix {
        "game_state_update" => ChannelKind::GameStateUpdate,
        "game_started" => ChannelKind::GameStarted,
        "player_state_changed" => ChannelKind::PlayerStateChanged,
        "room_state_update" => ChannelKind::RoomStateUpdate,
        _ => return None,
    };
    Some(ParsedChannel {
        kind,
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_round_trip_through_parse() {
        let player = PlayerId::random();
        let room = RoomId::new("room_3_zzz");

        let parsed =
            parse_channel(&channel::game_state_update(&player)).unwrap();
        assert_eq!(parsed.kind, ChannelKind::GameStateUpdate);
        assert_eq!(parsed.id, player.to_string());

        let parsed =
            parse_channel(&channel::room_state_update(&room)).unwrap();
        assert_eq!(parsed.kind, ChannelKind::RoomStateUpdate);
        assert_eq!(parsed.id, "room_3_zzz");
    }

    #[test]
    fn test_parse_channel_rejects_unknown_families() {
        assert_eq!(parse_channel("tetris:room_1_a"), None);
        assert_eq!(parse_channel("no_colon"), None);
    }

    #[test]
    fn test_patterns_cover_all_four_families() {
        assert_eq!(patterns::ALL.len(), 4);
        for pattern in patterns::ALL {
            assert!(pattern.ends_with(":*"));
        }
    }
}

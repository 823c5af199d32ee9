//! The key namespace.
//!
//! Every record the server writes lives under one of these keys.
//! Builders are centralised here so a key format change cannot drift
//! between writers and readers.

/// Key builders and set names.
pub mod key {
    use gridlock_protocol::{PlayerId, RoomId};

    /// Set of active room ids.
    pub const ACTIVE_ROOMS: &str = "active_rooms";
    /// Set of all registered player ids.
    pub const PLAYERS: &str = "players";
    /// Set of rooms that have started a game.
    pub const GAMES: &str = "games";

    /// `room:{id}` — the JSON room record.
    pub fn room(id: &RoomId) -> String {
        format!("room:{id}")
    }

    /// `player:{id}` — the JSON player record.
    pub fn player(id: &PlayerId) -> String {
        format!("player:{id}")
    }

    /// `player_game:{id}` — the JSON per-player game state.
    pub fn player_game(id: &PlayerId) -> String {
        format!("player_game:{id}")
    }

    /// `socket:{sid}` — socket-to-player mapping.
    pub fn socket(socket_id: &str) -> String {
        format!("socket:{socket_id}")
    }

    /// `game:{id}:players` — member set of a room's players.
    pub fn game_players(room_id: &RoomId) -> String {
        format!("game:{room_id}:players")
    }

    /// `game:{id}` — the legacy per-game hash mirror of player records.
    pub fn game_mirror(room_id: &RoomId) -> String {
        format!("game:{room_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::key;
    use gridlock_protocol::{PlayerId, RoomId};

    #[test]
    fn test_key_formats() {
        let room = RoomId::new("room_1_abc");
        let player = PlayerId::random();
        assert_eq!(key::room(&room), "room:room_1_abc");
        assert_eq!(key::player(&player), format!("player:{player}"));
        assert_eq!(
            key::player_game(&player),
            format!("player_game:{player}")
        );
        assert_eq!(key::socket("s-9"), "socket:s-9");
        assert_eq!(
            key::game_players(&room),
            "game:room_1_abc:players"
        );
    }
}

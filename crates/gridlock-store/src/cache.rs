//! Short-TTL read cache for `player_game:*` records.
//!
//! Broadcast fan-out causes read storms on game-state records: one
//! lock pipeline can trigger a read per connected roster member. The
//! cache absorbs those within a ~5 second window. It must stay
//! correctness-transparent: every write path invalidates its entry
//! before the write lands, so a hit can never be staler than the TTL
//! and never survives a mutation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gridlock_protocol::{PlayerGameState, PlayerId};

const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct CachedState {
    state: PlayerGameState,
    cached_at: Instant,
}

/// Per-player game-state cache. Clones share one map.
#[derive(Clone)]
pub struct GameStateCache {
    entries: Arc<Mutex<HashMap<PlayerId, CachedState>>>,
    ttl: Duration,
}

impl Default for GameStateCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl GameStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// A fresh copy of the cached state, if present and young enough.
    pub fn get(&self, player_id: &PlayerId) -> Option<PlayerGameState> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(player_id) {
            Some(cached) if cached.cached_at.elapsed() < self.ttl => {
                Some(cached.state.clone())
            }
            Some(_) => {
                entries.remove(player_id);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, state: PlayerGameState) {
        self.entries.lock().unwrap().insert(
            state.player_id,
            CachedState {
                state,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, player_id: &PlayerId) {
        self.entries.lock().unwrap().remove(player_id);
    }

    /// Number of live entries (test hook; bounded by live players).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlock_core::{Board, PieceType};
    use gridlock_protocol::RoomId;

    fn state(player_id: PlayerId) -> PlayerGameState {
        PlayerGameState {
            player_id,
            room_id: RoomId::new("room_1_t"),
            board: Board::empty(),
            current_piece: None,
            next_piece: Some(PieceType::I),
            held_piece: None,
            can_hold: true,
            ghost_piece: None,
            score: 0,
            level: 0,
            lines_cleared: 0,
            game_over: false,
            paused: false,
            game_started: false,
            tetromino_bag: PieceType::ALL.to_vec(),
            bag_index: 1,
            bag_number: 1,
            game_seed: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_get_returns_inserted_entry_within_ttl() {
        let cache = GameStateCache::new();
        let id = PlayerId::random();
        cache.insert(state(id));
        assert!(cache.get(&id).is_some());
    }

    #[test]
    fn test_get_misses_after_ttl() {
        let cache = GameStateCache::with_ttl(Duration::ZERO);
        let id = PlayerId::random();
        cache.insert(state(id));
        assert!(cache.get(&id).is_none());
        // The stale entry is also evicted, not retained.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = GameStateCache::new();
        let id = PlayerId::random();
        cache.insert(state(id));
        cache.invalidate(&id);
        assert!(cache.get(&id).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = GameStateCache::new();
        let clone = cache.clone();
        let id = PlayerId::random();
        cache.insert(state(id));
        assert!(clone.get(&id).is_some());
        clone.invalidate(&id);
        assert!(cache.get(&id).is_none());
    }
}

//! The durable statistics sink.
//!
//! In-flight state lives only in the key-value store; the durable
//! store receives exactly one write per finished game — the final
//! aggregates persisted by the game-over pipeline.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use gridlock_protocol::{PlayerId, RoomId};

use crate::error::StoreError;

/// Final per-player aggregates written on game-over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalStats {
    pub player_id: PlayerId,
    pub room_id: RoomId,
    pub score: u64,
    pub lines_cleared: u32,
    pub level: u32,
    /// Epoch milliseconds when the game ended.
    pub finished_at: u64,
}

/// The durable datastore, reduced to the one write the engine makes.
pub trait StatsStore: Clone + Send + Sync + 'static {
    /// Records the final aggregates for one finished game.
    fn record_game_result(
        &self,
        stats: FinalStats,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-memory [`StatsStore`] used by tests and the default binary.
#[derive(Clone, Default)]
pub struct MemoryStatsStore {
    results: Arc<Mutex<HashMap<PlayerId, Vec<FinalStats>>>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded results for one player, oldest first (test hook).
    pub fn results_for(&self, player_id: &PlayerId) -> Vec<FinalStats> {
        self.results
            .lock()
            .unwrap()
            .get(player_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of recorded games (test hook).
    pub fn total_results(&self) -> usize {
        self.results
            .lock()
            .unwrap()
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl StatsStore for MemoryStatsStore {
    async fn record_game_result(
        &self,
        stats: FinalStats,
    ) -> Result<(), StoreError> {
        self.results
            .lock()
            .unwrap()
            .entry(stats.player_id)
            .or_default()
            .push(stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_game_result_appends_per_player() {
        let store = MemoryStatsStore::new();
        let player = PlayerId::random();
        let room = RoomId::new("room_1_st");

        for score in [100, 250] {
            store
                .record_game_result(FinalStats {
                    player_id: player,
                    room_id: room.clone(),
                    score,
                    lines_cleared: 1,
                    level: 0,
                    finished_at: 0,
                })
                .await
                .unwrap();
        }

        let results = store.results_for(&player);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, 100);
        assert_eq!(results[1].score, 250);
        assert_eq!(store.total_results(), 2);
    }

    #[tokio::test]
    async fn test_results_for_unknown_player_is_empty() {
        let store = MemoryStatsStore::new();
        assert!(store.results_for(&PlayerId::random()).is_empty());
    }
}

//! Registry of live player actors.

use std::collections::HashMap;
use std::sync::Arc;

use gridlock_protocol::{
    Action, PlayerGameState, PlayerId, RoomId,
};
use gridlock_store::{GameStore, StateStore, StatsStore};
use tokio::sync::Mutex;
use tracing::info;

use crate::actor::{spawn_player, PlayerHandle};
use crate::error::SimError;

/// Owns the `PlayerId → actor` map. One hub per server process;
/// clones share the map.
#[derive(Clone)]
pub struct SimulationHub<S: StateStore, D: StatsStore> {
    store: GameStore<S>,
    stats: D,
    players: Arc<Mutex<HashMap<PlayerId, PlayerHandle>>>,
}

impl<S: StateStore, D: StatsStore> SimulationHub<S, D> {
    pub fn new(store: GameStore<S>, stats: D) -> Self {
        Self {
            store,
            stats,
            players: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Spawns the actor for a joining player. A player has at most
    /// one live simulation.
    pub async fn spawn(
        &self,
        player_id: PlayerId,
        room_id: RoomId,
    ) -> Result<PlayerGameState, SimError> {
        let mut players = self.players.lock().await;
        if players.contains_key(&player_id) {
            return Err(SimError::InvalidGameState(format!(
                "player {player_id} already has a live simulation"
            )));
        }
        let (handle, state) = spawn_player(
            player_id,
            room_id,
            self.store.clone(),
            self.stats.clone(),
        )
        .await?;
        players.insert(player_id, handle);
        Ok(state)
    }

    /// The live handle for a player, if any.
    pub async fn handle(
        &self,
        player_id: &PlayerId,
    ) -> Option<PlayerHandle> {
        self.players.lock().await.get(player_id).cloned()
    }

    /// Starts one player's game.
    pub async fn start_player(
        &self,
        player_id: &PlayerId,
    ) -> Result<PlayerGameState, SimError> {
        self.require(player_id).await?.start().await
    }

    /// Routes one action into a player's actor.
    pub async fn input(
        &self,
        player_id: &PlayerId,
        action: Action,
    ) -> Result<(), SimError> {
        self.require(player_id).await?.input(action).await
    }

    /// The authoritative state: the live actor's copy when the actor
    /// is up, else whatever the store still holds.
    pub async fn state_of(
        &self,
        player_id: &PlayerId,
    ) -> Result<PlayerGameState, SimError> {
        if let Some(handle) = self.handle(player_id).await {
            return handle.state().await;
        }
        self.store
            .load_game_state(player_id)
            .await?
            .ok_or(SimError::PlayerNotFound(*player_id))
    }

    /// Stops a player's actor (leave, disconnect). Returns whether
    /// one was running. The game-state record is the caller's to
    /// clean up — leaving and dying are different pipelines.
    pub async fn remove(&self, player_id: &PlayerId) -> bool {
        let handle =
            self.players.lock().await.remove(player_id);
        match handle {
            Some(handle) => {
                handle.shutdown().await;
                info!(%player_id, "player simulation removed");
                true
            }
            None => false,
        }
    }

    /// Number of live simulations.
    pub async fn live_count(&self) -> usize {
        self.players.lock().await.len()
    }

    /// Stops every actor. Called on process shutdown so no gravity
    /// timer outlives the server loop.
    pub async fn shutdown_all(&self) {
        let handles: Vec<PlayerHandle> = {
            let mut players = self.players.lock().await;
            players.drain().map(|(_, handle)| handle).collect()
        };
        for handle in &handles {
            handle.shutdown().await;
        }
        if !handles.is_empty() {
            info!(count = handles.len(), "all player simulations stopped");
        }
    }

    async fn require(
        &self,
        player_id: &PlayerId,
    ) -> Result<PlayerHandle, SimError> {
        self.handle(player_id)
            .await
            .ok_or(SimError::PlayerNotFound(*player_id))
    }
}

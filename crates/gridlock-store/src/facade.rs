//! The typed facade over the raw store.
//!
//! All records are JSON with a 1-hour TTL, so an abandoned server
//! leaves nothing behind. `GameStore` is the only writer the upper
//! layers use — it funnels every mutation through cache invalidation
//! and keeps key construction in one place.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use gridlock_protocol::{
    BroadcastEvent, Player, PlayerGameState, PlayerId, Room, RoomId,
};
use tracing::trace;

use crate::cache::GameStateCache;
use crate::channels::channel;
use crate::error::StoreError;
use crate::keys::key;
use crate::store::StateStore;

/// TTL for room, player, and game-state records.
pub const RECORD_TTL: Duration = Duration::from_secs(60 * 60);

/// Epoch milliseconds now.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Typed operations over a [`StateStore`]. Cheap to clone.
#[derive(Clone)]
pub struct GameStore<S: StateStore> {
    store: S,
    cache: GameStateCache,
}

impl<S: StateStore> GameStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: GameStateCache::new(),
        }
    }

    pub fn with_cache(store: S, cache: GameStateCache) -> Self {
        Self { store, cache }
    }

    /// The underlying store handle (for subscriptions).
    pub fn raw(&self) -> &S {
        &self.store
    }

    // -- Rooms -----------------------------------------------------------

    pub async fn save_room(&self, room: &Room) -> Result<(), StoreError> {
        let json = serde_json::to_string(room)?;
        self.store
            .set(&key::room(&room.id), &json, Some(RECORD_TTL))
            .await
    }

    pub async fn load_room(
        &self,
        id: &RoomId,
    ) -> Result<Option<Room>, StoreError> {
        match self.store.get(&key::room(id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn delete_room(&self, id: &RoomId) -> Result<(), StoreError> {
        self.store.del(&key::room(id)).await?;
        self.store.del(&key::game_mirror(id)).await?;
        self.store.srem(key::ACTIVE_ROOMS, id.as_str()).await?;
        self.store.srem(key::GAMES, id.as_str()).await
    }

    pub async fn add_active_room(
        &self,
        id: &RoomId,
    ) -> Result<(), StoreError> {
        self.store.sadd(key::ACTIVE_ROOMS, id.as_str()).await
    }

    pub async fn active_room_ids(&self) -> Result<Vec<RoomId>, StoreError> {
        Ok(self
            .store
            .smembers(key::ACTIVE_ROOMS)
            .await?
            .into_iter()
            .map(RoomId::new)
            .collect())
    }

    /// Loads every room still present in the `active_rooms` set.
    /// Ids whose record has expired are skipped.
    pub async fn load_active_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let mut rooms = Vec::new();
        for id in self.active_room_ids().await? {
            if let Some(room) = self.load_room(&id).await? {
                rooms.push(room);
            } else {
                trace!(room_id = %id, "active room record missing, pruning");
                self.store.srem(key::ACTIVE_ROOMS, id.as_str()).await?;
            }
        }
        Ok(rooms)
    }

    /// Marks a room as having started a game.
    pub async fn add_started_game(
        &self,
        id: &RoomId,
    ) -> Result<(), StoreError> {
        self.store.sadd(key::GAMES, id.as_str()).await
    }

    // -- Players ---------------------------------------------------------

    pub async fn save_player(
        &self,
        player: &Player,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(player)?;
        self.store
            .set(&key::player(&player.id), &json, Some(RECORD_TTL))
            .await?;
        self.store
            .sadd(key::PLAYERS, &player.id.to_string())
            .await?;
        // Legacy per-game hash mirror, keyed by player id.
        self.store
            .hset(
                &key::game_mirror(&player.room_id),
                HashMap::from([(player.id.to_string(), json)]),
            )
            .await
    }

    pub async fn load_player(
        &self,
        id: &PlayerId,
    ) -> Result<Option<Player>, StoreError> {
        match self.store.get(&key::player(id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn delete_player(
        &self,
        id: &PlayerId,
    ) -> Result<(), StoreError> {
        self.store.del(&key::player(id)).await?;
        self.store.srem(key::PLAYERS, &id.to_string()).await
    }

    pub async fn add_room_player(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
    ) -> Result<(), StoreError> {
        self.store
            .sadd(&key::game_players(room_id), &player_id.to_string())
            .await
    }

    pub async fn remove_room_player(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
    ) -> Result<(), StoreError> {
        self.store
            .srem(&key::game_players(room_id), &player_id.to_string())
            .await
    }

    pub async fn room_player_ids(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<PlayerId>, StoreError> {
        let members =
            self.store.smembers(&key::game_players(room_id)).await?;
        let mut ids = Vec::with_capacity(members.len());
        for member in members {
            match member.parse() {
                Ok(uuid) => ids.push(PlayerId(uuid)),
                Err(_) => {
                    trace!(member, "non-uuid member in room set, skipping")
                }
            }
        }
        Ok(ids)
    }

    /// Loads every player currently in a room.
    pub async fn load_room_players(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Player>, StoreError> {
        let mut players = Vec::new();
        for id in self.room_player_ids(room_id).await? {
            if let Some(player) = self.load_player(&id).await? {
                players.push(player);
            }
        }
        Ok(players)
    }

    // -- Game states -----------------------------------------------------

    /// Persists a game state and invalidates its cache entry. The
    /// invalidation happens before the write lands so a concurrent
    /// reader can at worst refill with the value being written.
    pub async fn save_game_state(
        &self,
        state: &PlayerGameState,
    ) -> Result<(), StoreError> {
        self.cache.invalidate(&state.player_id);
        let json = serde_json::to_string(state)?;
        self.store
            .set(
                &key::player_game(&state.player_id),
                &json,
                Some(RECORD_TTL),
            )
            .await
    }

    /// Reads a game state through the short-TTL cache.
    pub async fn load_game_state(
        &self,
        id: &PlayerId,
    ) -> Result<Option<PlayerGameState>, StoreError> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(Some(cached));
        }
        match self.store.get(&key::player_game(id)).await? {
            Some(json) => {
                let state: PlayerGameState =
                    serde_json::from_str(&json)?;
                self.cache.insert(state.clone());
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_game_state(
        &self,
        id: &PlayerId,
    ) -> Result<(), StoreError> {
        self.cache.invalidate(id);
        self.store.del(&key::player_game(id)).await
    }

    // -- Sockets ---------------------------------------------------------

    pub async fn save_socket(
        &self,
        socket_id: &str,
        player_id: &PlayerId,
    ) -> Result<(), StoreError> {
        self.store
            .set(
                &key::socket(socket_id),
                &player_id.to_string(),
                Some(RECORD_TTL),
            )
            .await
    }

    pub async fn load_socket(
        &self,
        socket_id: &str,
    ) -> Result<Option<PlayerId>, StoreError> {
        Ok(self
            .store
            .get(&key::socket(socket_id))
            .await?
            .and_then(|raw| raw.parse().ok().map(PlayerId)))
    }

    pub async fn delete_socket(
        &self,
        socket_id: &str,
    ) -> Result<(), StoreError> {
        self.store.del(&key::socket(socket_id)).await
    }

    // -- Publishing ------------------------------------------------------

    /// Publishes a broadcast event on a channel. Best-effort: callers
    /// treat delivery as at-most-once.
    pub async fn publish_event(
        &self,
        channel_name: &str,
        event: &BroadcastEvent,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(event)?;
        self.store.publish(channel_name, &payload).await
    }

    /// Publishes on the legacy `tetris:{gameId}` map channel.
    pub async fn publish_legacy_game(
        &self,
        room_id: &RoomId,
        payload: &str,
    ) -> Result<(), StoreError> {
        self.store
            .publish(&channel::legacy_game(room_id), payload)
            .await
    }
}

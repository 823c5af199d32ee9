//! The room manager: find-or-create routing, caps, and lifecycle.

use std::time::{SystemTime, UNIX_EPOCH};

use gridlock_protocol::{
    BroadcastEvent, Player, PlayerId, PlayerStatus, Room, RoomId,
    RoomStats, RoomStatus, ServerStats, MAX_ROOM_PLAYERS,
};
use gridlock_store::{
    channel, GameStore, StateStore, StatsStore,
};
use gridlock_sim::SimulationHub;
use rand::Rng;
use tracing::{info, warn};

use crate::error::RoomError;

const ROOM_ID_SUFFIX_LEN: usize = 9;
const ROOM_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Coordinates rooms over the typed store and the simulation hub.
/// Stateless apart from its handles; cheap to clone.
#[derive(Clone)]
pub struct RoomManager<S: StateStore, D: StatsStore> {
    store: GameStore<S>,
    hub: SimulationHub<S, D>,
}

impl<S: StateStore, D: StatsStore> RoomManager<S, D> {
    pub fn new(store: GameStore<S>, hub: SimulationHub<S, D>) -> Self {
        Self { store, hub }
    }

    pub fn hub(&self) -> &SimulationHub<S, D> {
        &self.hub
    }

    // -- Allocation ------------------------------------------------------

    /// Picks a room for a joining player, in priority order: a
    /// PLAYING room with space, then a WAITING room with space, then
    /// any room with space.
    pub async fn find_available_room(
        &self,
    ) -> Result<Option<Room>, RoomError> {
        let rooms = self.store.load_active_rooms().await?;
        let with_space =
            |status: RoomStatus| {
                rooms.iter().find(|room| {
                    room.status == status && room.has_capacity()
                })
            };

        let chosen = with_space(RoomStatus::Playing)
            .or_else(|| with_space(RoomStatus::Waiting))
            .or_else(|| {
                rooms.iter().find(|room| room.has_capacity())
            });
        Ok(chosen.cloned())
    }

    /// Mints a new WAITING room: `room_{epoch_ms}_{rand9}` with a
    /// time-plus-random seed fixed for the room's lifetime.
    pub async fn create_room(&self) -> Result<Room, RoomError> {
        let (suffix, seed_component) = {
            let mut rng = rand::rng();
            let suffix: String = (0..ROOM_ID_SUFFIX_LEN)
                .map(|_| {
                    let i = rng.random_range(0..ROOM_ID_ALPHABET.len());
                    ROOM_ID_ALPHABET[i] as char
                })
                .collect();
            let seed_component = rng.random::<u32>();
            (suffix, seed_component)
        };
        let created_at = now_ms();
        let id = RoomId::new(format!("room_{created_at}_{suffix}"));
        let room_seed = ((created_at.wrapping_add(seed_component as u64))
            & 0x7FFF_FFFF) as i32;

        let room = Room {
            id: id.clone(),
            status: RoomStatus::Waiting,
            max_players: MAX_ROOM_PLAYERS,
            current_players: 0,
            room_seed,
            created_at,
            last_activity: created_at,
            stats: RoomStats::default(),
        };
        self.store.save_room(&room).await?;
        self.store.add_active_room(&id).await?;
        info!(room_id = %id, room_seed, "room created");
        Ok(room)
    }

    // -- Join / leave ----------------------------------------------------

    /// The canonical auto-room join: find-or-create, admit the
    /// player, spawn their simulation, and account for them.
    ///
    /// Ordering keeps failures coherent: the room's player count is
    /// only incremented after every per-player write has landed.
    pub async fn join_auto(
        &self,
        name: &str,
    ) -> Result<(Room, Player), RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::Validation {
                field: "name".into(),
                message: "player name must not be empty".into(),
            });
        }

        let mut room = match self.find_available_room().await? {
            Some(room) => room,
            None => self.create_room().await?,
        };
        if !room.status.accepts_players() {
            return Err(RoomError::NotAccepting(room.id));
        }
        if !room.has_capacity() {
            return Err(RoomError::Full(room.id));
        }

        let player = Player {
            id: PlayerId::random(),
            name: name.to_string(),
            socket_id: None,
            room_id: room.id.clone(),
            status: PlayerStatus::Alive,
            score: 0,
            lines_cleared: 0,
            level: 0,
        };
        self.store.save_player(&player).await?;
        self.store.add_room_player(&room.id, &player.id).await?;
        self.hub.spawn(player.id, room.id.clone()).await?;

        room.current_players += 1;
        room.last_activity = now_ms();
        self.store.save_room(&room).await?;

        info!(
            room_id = %room.id,
            player_id = %player.id,
            players = room.current_players,
            "player joined"
        );

        self.publish_roster(
            &room.id,
            BroadcastEvent::PlayerJoined {
                room_id: room.id.clone(),
                player: player.clone(),
            },
        )
        .await;
        self.publish_room_state(&room).await;

        Ok((room, player))
    }

    /// Removes a player: stop their simulation, drop their records,
    /// and either shrink the room or delete it once empty.
    pub async fn leave_auto(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
    ) -> Result<(), RoomError> {
        let mut room = self
            .store
            .load_room(room_id)
            .await?
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        // Simulation teardown first so no gravity tick writes a
        // record we are about to delete.
        self.hub.remove(player_id).await;
        self.store.delete_game_state(player_id).await?;
        self.store.remove_room_player(room_id, player_id).await?;
        self.store.delete_player(player_id).await?;

        room.current_players = room.current_players.saturating_sub(1);
        if room.current_players == 0 {
            self.store.delete_room(room_id).await?;
            info!(room_id = %room_id, "room emptied and deleted");
        } else {
            room.last_activity = now_ms();
            self.store.save_room(&room).await?;
        }

        info!(
            room_id = %room_id,
            %player_id,
            remaining = room.current_players,
            "player left"
        );

        self.publish_roster(
            room_id,
            BroadcastEvent::PlayerLeft {
                room_id: room_id.clone(),
                player_id: *player_id,
            },
        )
        .await;
        if room.current_players > 0 {
            self.publish_room_state(&room).await;
        }
        Ok(())
    }

    // -- Game start ------------------------------------------------------

    /// Flips a WAITING room to PLAYING and starts every member's
    /// simulation. Any other starting status is `CannotStart`.
    pub async fn start_room_game(
        &self,
        room_id: &RoomId,
    ) -> Result<Room, RoomError> {
        let mut room = self
            .store
            .load_room(room_id)
            .await?
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        if room.status != RoomStatus::Waiting {
            return Err(RoomError::CannotStart {
                room: room_id.clone(),
                status: room.status,
            });
        }

        room.status = RoomStatus::Playing;
        room.last_activity = now_ms();
        self.store.save_room(&room).await?;
        self.store.add_started_game(room_id).await?;

        for player_id in
            self.store.room_player_ids(room_id).await?
        {
            if let Err(e) = self.hub.start_player(&player_id).await {
                // One dead member must not block the rest of the room.
                warn!(
                    room_id = %room_id,
                    %player_id,
                    error = %e,
                    "failed to start player game"
                );
            }
        }

        info!(room_id = %room_id, seed = room.room_seed, "room game started");
        self.publish_room(
            &room,
            BroadcastEvent::RoomGameStarted {
                room_id: room_id.clone(),
                game_seed: room.room_seed,
                timestamp: now_ms(),
            },
        )
        .await;
        Ok(room)
    }

    // -- Queries ---------------------------------------------------------

    pub async fn get_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Room, RoomError> {
        self.store
            .load_room(room_id)
            .await?
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    pub async fn get_all_rooms(&self) -> Result<Vec<Room>, RoomError> {
        Ok(self.store.load_active_rooms().await?)
    }

    pub async fn room_players(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Player>, RoomError> {
        // Missing room = NotFound; an empty roster is legal.
        self.get_room(room_id).await?;
        Ok(self.store.load_room_players(room_id).await?)
    }

    /// Server-wide stats for `getRoomStats`.
    pub async fn server_stats(&self) -> Result<ServerStats, RoomError> {
        let rooms = self.store.load_active_rooms().await?;
        let total_players =
            rooms.iter().map(|r| r.current_players).sum();
        Ok(ServerStats {
            total_rooms: rooms.len() as u32,
            total_players,
            rooms,
        })
    }

    /// Publishes the room's current shape on its broadcast topic
    /// (also the `getRoomInfo` side-effect).
    pub async fn publish_room_state(&self, room: &Room) {
        let players = match self
            .store
            .load_room_players(&room.id)
            .await
        {
            Ok(players) => players,
            Err(e) => {
                warn!(room_id = %room.id, error = %e, "roster load failed");
                Vec::new()
            }
        };
        let event = BroadcastEvent::RoomStateUpdate {
            room_id: room.id.clone(),
            player_count: players.len() as u32,
            players,
            room_info: room.clone(),
            timestamp: now_ms(),
        };
        // Legacy map-channel clients get the same payload.
        if let Ok(payload) = serde_json::to_string(&event) {
            if let Err(e) = self
                .store
                .publish_legacy_game(&room.id, &payload)
                .await
            {
                warn!(room_id = %room.id, error = %e, "legacy publish failed");
            }
        }
        self.publish_room(room, event).await;
    }

    async fn publish_room(&self, room: &Room, event: BroadcastEvent) {
        if let Err(e) = self
            .store
            .publish_event(
                &channel::room_state_update(&room.id),
                &event,
            )
            .await
        {
            warn!(room_id = %room.id, error = %e, "room publish failed");
        }
    }

    /// Roster changes go out on the room's player-state topic.
    async fn publish_roster(
        &self,
        room_id: &RoomId,
        event: BroadcastEvent,
    ) {
        if let Err(e) = self
            .store
            .publish_event(
                &channel::player_state_changed(room_id),
                &event,
            )
            .await
        {
            warn!(room_id = %room_id, error = %e, "roster publish failed");
        }
    }
}

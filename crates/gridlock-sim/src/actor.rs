//! The player actor: one task per live player.
//!
//! The actor owns the simulation, the gravity timer, and the store
//! handles. Its `select!` loop is the serialization point the engine
//! relies on: client actions and gravity ticks interleave here, never
//! concurrently. Failures in the gravity path stop the timer and log —
//! they do not escape to the transport; the next explicit action (or a
//! repair request) recovers or finishes the game cleanly.

use gridlock_gravity::GravityTimer;
use gridlock_protocol::{
    Action, BroadcastEvent, PlayerGameState, PlayerId, PlayerStatus,
    RoomId,
};
use gridlock_store::{
    channel, FinalStats, GameStore, StateStore, StatsStore,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::error::SimError;
use crate::seed::generate_game_seed;
use crate::state::{Simulation, StepOutcome};

/// Command channel depth per player. Inputs beyond this apply
/// backpressure to the sender.
const COMMAND_BUFFER: usize = 64;

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub(crate) enum SimCommand {
    Start {
        reply: oneshot::Sender<Result<PlayerGameState, SimError>>,
    },
    Input {
        action: Action,
    },
    GetState {
        reply: oneshot::Sender<PlayerGameState>,
    },
    Repair {
        reply: oneshot::Sender<Result<PlayerGameState, SimError>>,
    },
    Pause,
    Resume,
    ForceGameOver,
    Shutdown,
}

/// Handle to a running player actor. Cheap to clone.
#[derive(Clone)]
pub struct PlayerHandle {
    player_id: PlayerId,
    sender: mpsc::Sender<SimCommand>,
}

impl PlayerHandle {
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Runs the start transition and returns the live state.
    pub async fn start(&self) -> Result<PlayerGameState, SimError> {
        let (reply, rx) = oneshot::channel();
        self.send(SimCommand::Start { reply }).await?;
        rx.await
            .map_err(|_| SimError::PlayerGone(self.player_id))?
    }

    /// Queues one action. Fire-and-forget: effects surface on the
    /// pub/sub channels.
    pub async fn input(&self, action: Action) -> Result<(), SimError> {
        self.send(SimCommand::Input { action }).await
    }

    /// The actor's current state.
    pub async fn state(&self) -> Result<PlayerGameState, SimError> {
        let (reply, rx) = oneshot::channel();
        self.send(SimCommand::GetState { reply }).await?;
        rx.await.map_err(|_| SimError::PlayerGone(self.player_id))
    }

    /// Runs the repair pass and returns the reconciled state.
    pub async fn repair(&self) -> Result<PlayerGameState, SimError> {
        let (reply, rx) = oneshot::channel();
        self.send(SimCommand::Repair { reply }).await?;
        rx.await
            .map_err(|_| SimError::PlayerGone(self.player_id))?
    }

    pub async fn pause(&self) -> Result<(), SimError> {
        self.send(SimCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), SimError> {
        self.send(SimCommand::Resume).await
    }

    /// Forces the clean terminal state and runs the game-over
    /// pipeline.
    pub async fn force_game_over(&self) -> Result<(), SimError> {
        self.send(SimCommand::ForceGameOver).await
    }

    /// Stops the actor (and with it, the gravity timer).
    pub async fn shutdown(&self) {
        let _ = self.sender.send(SimCommand::Shutdown).await;
    }

    async fn send(&self, cmd: SimCommand) -> Result<(), SimError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SimError::PlayerGone(self.player_id))
    }
}

/// Spawns the actor for a newly joined player: mixes a seed, persists
/// the initial state, and returns the handle plus that state.
pub async fn spawn_player<S: StateStore, D: StatsStore>(
    player_id: PlayerId,
    room_id: RoomId,
    store: GameStore<S>,
    stats: D,
) -> Result<(PlayerHandle, PlayerGameState), SimError> {
    let seed = generate_game_seed(&player_id, &room_id);
    let sim = Simulation::new(player_id, room_id, seed);
    let initial = sim.state().clone();
    store.save_game_state(&initial).await?;

    let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
    let actor = PlayerActor {
        gravity: GravityTimer::new(sim.level()),
        sim,
        store,
        stats,
        receiver,
    };
    tokio::spawn(actor.run());

    info!(%player_id, seed, "player simulation spawned");
    Ok((PlayerHandle { player_id, sender }, initial))
}

struct PlayerActor<S: StateStore, D: StatsStore> {
    sim: Simulation,
    gravity: GravityTimer,
    store: GameStore<S>,
    stats: D,
    receiver: mpsc::Receiver<SimCommand>,
}

impl<S: StateStore, D: StatsStore> PlayerActor<S, D> {
    async fn run(mut self) {
        let player_id = self.sim.player_id();
        debug!(%player_id, "player actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(SimCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
                tick = self.gravity.wait_for_drop() => {
                    self.handle_gravity_tick(tick.drop).await;
                }
            }
        }

        // Timer and state die with the actor.
        debug!(%player_id, "player actor stopped");
    }

    async fn handle_command(&mut self, cmd: SimCommand) {
        match cmd {
            SimCommand::Start { reply } => {
                let result = self.handle_start().await;
                let _ = reply.send(result);
            }
            SimCommand::Input { action } => {
                self.handle_input(action).await;
            }
            SimCommand::GetState { reply } => {
                let _ = reply.send(self.sim.state().clone());
            }
            SimCommand::Repair { reply } => {
                let outcome = self.sim.repair();
                self.settle(outcome).await;
                let _ = reply.send(Ok(self.sim.state().clone()));
            }
            SimCommand::Pause => {
                self.sim.set_paused(true);
                self.gravity.pause();
                self.persist_and_publish().await;
            }
            SimCommand::Resume => {
                self.sim.set_paused(false);
                self.gravity.resume();
                self.persist_and_publish().await;
            }
            SimCommand::ForceGameOver => {
                let outcome = self.sim.force_game_over();
                self.settle(outcome).await;
            }
            SimCommand::Shutdown => unreachable!("handled in run"),
        }
    }

    async fn handle_start(
        &mut self,
    ) -> Result<PlayerGameState, SimError> {
        let outcome = self.sim.start()?;
        if outcome.changed {
            self.gravity.set_level(self.sim.level());
            self.gravity.start();
            self.persist_and_publish().await;
            let event = BroadcastEvent::GameStarted {
                player_id: self.sim.player_id(),
                game_state: self.sim.state().clone(),
            };
            self.publish(
                &channel::game_started(&self.sim.player_id()),
                &event,
            )
            .await;
        }
        Ok(self.sim.state().clone())
    }

    async fn handle_input(&mut self, action: Action) {
        if self.sim.is_game_over() {
            info!(
                player_id = %self.sim.player_id(),
                %action,
                "ignoring action for finished game"
            );
            return;
        }
        match self.sim.apply(action) {
            Ok(outcome) => self.settle(outcome).await,
            Err(e) => {
                warn!(
                    player_id = %self.sim.player_id(),
                    %action,
                    error = %e,
                    "action rejected"
                );
            }
        }
    }

    async fn handle_gravity_tick(&mut self, drop: u64) {
        match self.sim.auto_drop() {
            Ok(outcome) => {
                if outcome.changed {
                    self.settle(outcome).await;
                }
            }
            Err(e) => {
                // Per policy the ticker never propagates: stop it and
                // let the next explicit action recover via repair.
                error!(
                    player_id = %self.sim.player_id(),
                    drop,
                    error = %e,
                    "gravity tick failed, stopping timer"
                );
                self.gravity.stop();
            }
        }
    }

    /// Applies an outcome's side-effects in order: gravity re-key,
    /// persistence, broadcasts, roster updates, game-over pipeline.
    async fn settle(&mut self, outcome: StepOutcome) {
        if let Some(level) = outcome.level_changed {
            self.gravity.set_level(level);
        }
        if outcome.game_over {
            self.handle_game_over().await;
            return;
        }
        if outcome.changed {
            self.persist_and_publish().await;
        }
        if outcome.locked {
            self.update_player_record().await;
        }
    }

    async fn persist_and_publish(&mut self) {
        self.sim.touch();
        let state = self.sim.state().clone();
        if let Err(e) = self.store.save_game_state(&state).await {
            error!(
                player_id = %state.player_id,
                error = %e,
                "failed to persist game state"
            );
        }
        let event = BroadcastEvent::GameStateUpdate {
            player_id: state.player_id,
            game_state: state.clone(),
        };
        self.publish(
            &channel::game_state_update(&state.player_id),
            &event,
        )
        .await;
    }

    /// Mirrors score/lines/level onto the player record and tells the
    /// room's roster topic.
    async fn update_player_record(&self) {
        let state = self.sim.state();
        let result = async {
            let Some(mut player) =
                self.store.load_player(&state.player_id).await?
            else {
                return Ok::<_, SimError>(());
            };
            player.score = state.score;
            player.lines_cleared = state.lines_cleared;
            player.level = state.level;
            self.store.save_player(&player).await?;

            let roster =
                self.store.load_room_players(&state.room_id).await?;
            self.publish(
                &channel::player_state_changed(&state.room_id),
                &BroadcastEvent::PlayerStateChanged {
                    room_id: state.room_id.clone(),
                    players: roster,
                },
            )
            .await;
            Ok(())
        }
        .await;
        if let Err(e) = result {
            warn!(
                player_id = %state.player_id,
                error = %e,
                "failed to update player record"
            );
        }
    }

    /// The game-over pipeline: stop the timer, persist final
    /// aggregates durably, mark the player eliminated, announce on
    /// the room and player topics, and clear the state record.
    async fn handle_game_over(&mut self) {
        self.gravity.stop();
        let state = self.sim.state().clone();
        let player_id = state.player_id;
        info!(
            %player_id,
            score = state.score,
            lines = state.lines_cleared,
            level = state.level,
            "game over"
        );

        if let Err(e) = self
            .stats
            .record_game_result(FinalStats {
                player_id,
                room_id: state.room_id.clone(),
                score: state.score,
                lines_cleared: state.lines_cleared,
                level: state.level,
                finished_at: now_ms(),
            })
            .await
        {
            error!(%player_id, error = %e, "failed to persist final stats");
        }

        if let Err(e) = self.mark_player_eliminated(&state).await {
            warn!(%player_id, error = %e, "failed to mark player eliminated");
        }

        let terminal = BroadcastEvent::PlayerGameOver {
            player_id,
            game_over: true,
            score: state.score,
            level: state.level,
            lines_cleared: state.lines_cleared,
        };
        self.publish(
            &channel::player_state_changed(&state.room_id),
            &terminal,
        )
        .await;
        self.publish(
            &channel::game_state_update(&player_id),
            &terminal,
        )
        .await;

        if let Err(e) =
            self.store.delete_game_state(&player_id).await
        {
            error!(%player_id, error = %e, "failed to clear game state");
        }
    }

    async fn mark_player_eliminated(
        &self,
        state: &PlayerGameState,
    ) -> Result<(), SimError> {
        let Some(mut player) =
            self.store.load_player(&state.player_id).await?
        else {
            return Ok(());
        };
        player.status = PlayerStatus::Eliminated;
        player.score = state.score;
        player.lines_cleared = state.lines_cleared;
        player.level = state.level;
        self.store.save_player(&player).await?;

        let mut room = self.store.load_room(&state.room_id).await?;
        if let Some(room) = room.as_mut() {
            room.stats.games_finished += 1;
            room.stats.total_score += state.score;
            room.stats.total_lines_cleared +=
                state.lines_cleared as u64;
            self.store.save_room(room).await?;
        }
        Ok(())
    }

    /// Best-effort publish; delivery is at-most-once by design.
    async fn publish(&self, channel_name: &str, event: &BroadcastEvent) {
        if let Err(e) =
            self.store.publish_event(channel_name, event).await
        {
            warn!(
                channel = channel_name,
                error = %e,
                "broadcast publish failed"
            );
        }
    }
}

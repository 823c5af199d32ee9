//! The pure per-player state machine.
//!
//! `Simulation` wraps one `PlayerGameState` and applies validated
//! actions to it. Nothing here performs I/O — persistence, publishing,
//! and timer control belong to the actor driving this state.

use std::time::{SystemTime, UNIX_EPOCH};

use gridlock_core::{
    bag_for_bag_number, ghost, hard_drop, hard_drop_bonus,
    level_for_lines, rotate_with_wall_kick, score_for_clear, Board,
    Piece, PieceType, Position,
};
use gridlock_protocol::{
    Action, PlayerGameState, PlayerId, RoomId,
};
use tracing::{debug, warn};

use crate::error::SimError;

/// Spawn positions tried, in order, when a freshly spawned piece
/// collides. If none fits the player is out.
const FALLBACK_SPAWNS: [(i32, i32); 6] =
    [(3, 0), (2, 0), (4, 0), (3, 1), (2, 1), (4, 1)];

/// What one step changed, for the actor to act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// The state mutated and should be persisted + published.
    pub changed: bool,
    /// A piece locked into the board during this step.
    pub locked: bool,
    /// Lines cleared by this step.
    pub lines_cleared: u32,
    /// The level changed; gravity must restart at the new level.
    pub level_changed: Option<u32>,
    /// The player is now out.
    pub game_over: bool,
}

impl StepOutcome {
    fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// One player's authoritative simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    state: PlayerGameState,
}

impl Simulation {
    /// Initial state at room-join: empty board, no active piece, the
    /// first bag drawn and its head exposed as `nextPiece`.
    pub fn new(
        player_id: PlayerId,
        room_id: RoomId,
        game_seed: i32,
    ) -> Self {
        let bag = bag_for_bag_number(game_seed, 1);
        let now = now_ms();
        Self {
            state: PlayerGameState {
                player_id,
                room_id,
                board: Board::empty(),
                current_piece: None,
                next_piece: Some(bag[0]),
                held_piece: None,
                can_hold: true,
                ghost_piece: None,
                score: 0,
                level: 0,
                lines_cleared: 0,
                game_over: false,
                paused: false,
                game_started: false,
                tetromino_bag: bag.to_vec(),
                bag_index: 1,
                bag_number: 1,
                game_seed,
                created_at: now,
                updated_at: now,
            },
        }
    }

    /// Rebuilds a simulation around a persisted state (gateway
    /// restarts, repair paths).
    pub fn from_state(state: PlayerGameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &PlayerGameState {
        &self.state
    }

    pub fn into_state(self) -> PlayerGameState {
        self.state
    }

    pub fn player_id(&self) -> PlayerId {
        self.state.player_id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.state.room_id
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn is_started(&self) -> bool {
        self.state.game_started
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    /// Stamps `updated_at`; the actor calls this before persisting.
    pub fn touch(&mut self) {
        self.state.updated_at = now_ms();
    }

    // -- Start -----------------------------------------------------------

    /// The start transition: materialize the first piece, expose the
    /// second as `next`, compute the ghost, and mark the game live.
    pub fn start(&mut self) -> Result<StepOutcome, SimError> {
        if self.state.game_over {
            return Err(SimError::InvalidGameState(
                "cannot start a finished game".into(),
            ));
        }
        if self.state.game_started {
            // Starting twice is a no-op, not an error: startRoomGame
            // may race a per-player start.
            return Ok(StepOutcome::default());
        }

        let first = self.state.tetromino_bag[0];
        let second = self.state.tetromino_bag[1];
        let piece = Piece::spawn(first);
        self.state.ghost_piece = Some(ghost(&piece, &self.state.board));
        self.state.current_piece = Some(piece);
        self.state.next_piece = Some(second);
        self.state.bag_index = 2;
        self.state.game_started = true;
        debug!(
            player_id = %self.state.player_id,
            first = %first,
            "player game started"
        );
        Ok(StepOutcome::changed())
    }

    // -- Actions ---------------------------------------------------------

    /// Applies one validated client action.
    ///
    /// Game-over states ignore actions (the caller logs); an unstarted
    /// game rejects them.
    pub fn apply(
        &mut self,
        action: Action,
    ) -> Result<StepOutcome, SimError> {
        if self.state.game_over {
            return Ok(StepOutcome::default());
        }
        if !self.state.game_started {
            return Err(SimError::InvalidGameState(
                "game has not started".into(),
            ));
        }
        match action {
            Action::MoveLeft => Ok(self.shift(-1)),
            Action::MoveRight => Ok(self.shift(1)),
            Action::MoveDown => self.move_down(),
            Action::Rotate => self.rotate(),
            Action::HardDrop => self.hard_drop(),
            Action::Hold => self.hold(),
        }
    }

    /// One gravity tick: identical to a client `moveDown`.
    pub fn auto_drop(&mut self) -> Result<StepOutcome, SimError> {
        if self.state.game_over || !self.state.game_started {
            return Ok(StepOutcome::default());
        }
        self.move_down()
    }

    fn current(&self) -> Result<Piece, SimError> {
        self.state.current_piece.ok_or_else(|| {
            SimError::InvalidGameState("no active piece".into())
        })
    }

    /// Horizontal translation; blocked moves are a no-op.
    fn shift(&mut self, dx: i32) -> StepOutcome {
        let Ok(piece) = self.current() else {
            return StepOutcome::default();
        };
        if !self.state.board.is_valid(&piece, dx, 0) {
            return StepOutcome::default();
        }
        let moved = piece.translated(dx, 0);
        self.state.ghost_piece =
            Some(ghost(&moved, &self.state.board));
        self.state.current_piece = Some(moved);
        StepOutcome::changed()
    }

    /// Downward translation; on collision the piece soft-locks.
    fn move_down(&mut self) -> Result<StepOutcome, SimError> {
        let piece = self.current()?;
        if self.state.board.is_valid(&piece, 0, 1) {
            let moved = piece.translated(0, 1);
            self.state.ghost_piece =
                Some(ghost(&moved, &self.state.board));
            self.state.current_piece = Some(moved);
            return Ok(StepOutcome::changed());
        }
        Ok(self.lock_and_respawn(piece))
    }

    fn rotate(&mut self) -> Result<StepOutcome, SimError> {
        let piece = self.current()?;
        match rotate_with_wall_kick(&piece, &self.state.board) {
            Ok(rotated) => {
                self.state.ghost_piece =
                    Some(ghost(&rotated, &self.state.board));
                self.state.current_piece = Some(rotated);
                Ok(StepOutcome::changed())
            }
            // A blocked rotation is a legal no-op for the client.
            Err(_) => Ok(StepOutcome::default()),
        }
    }

    fn hard_drop(&mut self) -> Result<StepOutcome, SimError> {
        let piece = self.current()?;
        let (dropped, distance) = hard_drop(&piece, &self.state.board);
        self.state.score += hard_drop_bonus(distance);
        Ok(self.lock_and_respawn(dropped))
    }

    fn hold(&mut self) -> Result<StepOutcome, SimError> {
        if !self.state.can_hold {
            return Ok(StepOutcome::default());
        }
        let piece = self.current()?;
        let replacement = match self.state.held_piece.take() {
            Some(held) => held,
            None => {
                // Empty hold slot: consume the queue for the swap-in.
                let next = self.state.next_piece.take().ok_or_else(
                    || {
                        SimError::InvalidGameState(
                            "queue is empty".into(),
                        )
                    },
                )?;
                self.state.next_piece = Some(self.draw_from_bag());
                next
            }
        };
        self.state.held_piece = Some(piece.kind);
        self.state.can_hold = false;

        let swapped = Piece::spawn(replacement);
        if let Some(outcome) = self.place_or_eliminate(swapped) {
            return Ok(outcome);
        }
        Ok(StepOutcome::changed())
    }

    // -- Lock pipeline ---------------------------------------------------

    /// The soft-lock pipeline shared by `moveDown`-on-collision,
    /// `hardDrop`, and the gravity tick: place, clear, score, level,
    /// respawn, and re-evaluate survival.
    fn lock_and_respawn(&mut self, piece: Piece) -> StepOutcome {
        let placed = self.state.board.place(&piece);
        let (board, lines) = placed.clear_lines();
        self.state.board = board;
        self.state.score +=
            score_for_clear(lines, self.state.level);
        self.state.lines_cleared += lines;

        let new_level = level_for_lines(self.state.lines_cleared);
        let level_changed = (new_level != self.state.level)
            .then_some(new_level);
        self.state.level = new_level;

        let mut outcome = StepOutcome {
            changed: true,
            locked: true,
            lines_cleared: lines,
            level_changed,
            game_over: false,
        };

        // Piece lock re-arms the hold slot.
        self.state.can_hold = true;

        if self.state.board.is_game_over() {
            self.eliminate();
            outcome.game_over = true;
            return outcome;
        }

        let next = match self.state.next_piece.take() {
            Some(next) => next,
            None => self.draw_from_bag(),
        };
        self.state.next_piece = Some(self.draw_from_bag());
        let spawned = Piece::spawn(next);
        if let Some(terminal) = self.place_or_eliminate(spawned) {
            outcome.game_over = terminal.game_over;
        }
        outcome
    }

    /// Installs a freshly spawned piece, walking the fallback spawn
    /// positions if the standard one collides. Returns the terminal
    /// outcome when nothing fits.
    fn place_or_eliminate(
        &mut self,
        piece: Piece,
    ) -> Option<StepOutcome> {
        let placed = self.find_spawn_position(piece);
        match placed {
            Some(piece) => {
                self.state.ghost_piece =
                    Some(ghost(&piece, &self.state.board));
                self.state.current_piece = Some(piece);
                None
            }
            None => {
                warn!(
                    player_id = %self.state.player_id,
                    kind = %piece.kind,
                    "no spawn position fits, eliminating"
                );
                self.eliminate();
                Some(StepOutcome {
                    changed: true,
                    game_over: true,
                    ..StepOutcome::default()
                })
            }
        }
    }

    fn find_spawn_position(&self, piece: Piece) -> Option<Piece> {
        if self.state.board.is_valid(&piece, 0, 0) {
            return Some(piece);
        }
        FALLBACK_SPAWNS.iter().find_map(|&(x, y)| {
            let candidate = Piece {
                position: Position { x, y },
                ..piece
            };
            self.state
                .board
                .is_valid(&candidate, 0, 0)
                .then_some(candidate)
        })
    }

    /// The game-over transition on the state itself. The actor owns
    /// the rest of the pipeline (timer stop, stats, publishes).
    fn eliminate(&mut self) {
        self.state.game_over = true;
        self.state.current_piece = None;
        self.state.ghost_piece = None;
    }

    // -- Bag -------------------------------------------------------------

    /// Draws the next piece, regenerating the bag from
    /// `(game_seed, bag_number + 1)` when the current one is spent.
    fn draw_from_bag(&mut self) -> PieceType {
        if self.state.bag_index >= 7
            || self.state.tetromino_bag.is_empty()
        {
            self.state.bag_number += 1;
            self.state.tetromino_bag = bag_for_bag_number(
                self.state.game_seed,
                self.state.bag_number,
            )
            .to_vec();
            self.state.bag_index = 0;
        }
        let piece =
            self.state.tetromino_bag[self.state.bag_index as usize];
        self.state.bag_index += 1;
        piece
    }

    // -- Repair operations (server-initiated) ----------------------------

    /// Reconciles derived piece state after a suspicious read:
    /// rebuilds a missing ghost, drops a stray one, relocates a
    /// colliding active piece through the fallback spawns (or
    /// eliminates), and regenerates an out-of-range bag. Returns true
    /// when anything was fixed.
    pub fn repair(&mut self) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        if self.state.bag_index > 7
            || self.state.tetromino_bag.len() != 7
        {
            warn!(
                player_id = %self.state.player_id,
                bag_index = self.state.bag_index,
                "bag out of range, regenerating"
            );
            self.state.tetromino_bag = bag_for_bag_number(
                self.state.game_seed,
                self.state.bag_number,
            )
            .to_vec();
            self.state.bag_index = 0;
            outcome.changed = true;
        }

        match (self.state.current_piece, self.state.ghost_piece) {
            (Some(piece), _)
                if !self.state.board.is_valid(&piece, 0, 0) =>
            {
                match self.find_spawn_position(piece) {
                    Some(fixed) => {
                        self.state.ghost_piece =
                            Some(ghost(&fixed, &self.state.board));
                        self.state.current_piece = Some(fixed);
                    }
                    None => {
                        self.eliminate();
                        outcome.game_over = true;
                    }
                }
                outcome.changed = true;
            }
            (Some(piece), None) => {
                self.state.ghost_piece =
                    Some(ghost(&piece, &self.state.board));
                outcome.changed = true;
            }
            (None, Some(_)) => {
                // Stray ghost with no active piece.
                self.state.ghost_piece = None;
                outcome.changed = true;
            }
            _ => {}
        }

        outcome
    }

    /// Forces a clean terminal state: no pieces, no queue head, out.
    pub fn force_game_over(&mut self) -> StepOutcome {
        self.eliminate();
        self.state.next_piece = None;
        StepOutcome {
            changed: true,
            game_over: true,
            ..StepOutcome::default()
        }
    }

    /// Flips the pause flag (gravity handling is the actor's side).
    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }
}

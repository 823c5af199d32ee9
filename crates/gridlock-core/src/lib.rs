//! Pure tetris rules for Gridlock.
//!
//! Everything in this crate is a pure function over `Board` + `Piece`:
//! rotation (SRS with wall kicks), collision, placement, line clears,
//! ghost projection, scoring, level progression, gravity intervals, and
//! the spawn-test game-over check. No I/O, no shared state, no async —
//! the simulation layer calls these from its owner task and the same
//! rules can be replayed by clients.
//!
//! The seeded piece generator lives in [`rng`]: a fixed LCG plus a
//! Fisher-Yates 7-bag shuffle keyed by `(game_seed, bag_number)`, so two
//! nodes (or a client and the server) derive bit-identical queues.

mod board;
mod error;
mod piece;
mod rng;
mod rotation;
mod rules;

pub use board::{Board, BOARD_HEIGHT, BOARD_WIDTH};
pub use error::CoreError;
pub use piece::{Piece, PieceType, Position};
pub use rng::{bag_for_bag_number, shuffle_bag, SeededRandom};
pub use rotation::{rotate, rotate_with_wall_kick};
pub use rules::{
    drop_interval, ghost, hard_drop, hard_drop_bonus, level_for_lines,
    score_for_clear, LINE_BASE_SCORES,
};

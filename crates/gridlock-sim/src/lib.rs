//! Per-player simulation for Gridlock.
//!
//! Every live player is one actor task owning one `PlayerGameState`.
//! The actor consumes an ordered stream of client actions, gravity
//! ticks, and repair requests through a single `select!` loop, so all
//! mutations to a player's state are serialized — score, level, bag
//! progression, and game-over can never race. Across players there is
//! no ordering, and none is needed: simulations are independent.
//!
//! The gravity timer lives inside the actor, so "state dies ⇒ timer
//! dies" holds by ownership rather than by bookkeeping.

mod actor;
mod error;
mod hub;
mod seed;
mod state;

pub use actor::{spawn_player, PlayerHandle};
pub use error::SimError;
pub use hub::SimulationHub;
pub use seed::generate_game_seed;
pub use state::{Simulation, StepOutcome};

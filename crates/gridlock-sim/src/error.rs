//! Error types for the simulation layer.

use gridlock_protocol::{ErrorBody, ErrorCode, PlayerId};

/// Errors that can occur while driving a player simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The action cannot be applied in the current state (e.g. input
    /// before the game started).
    #[error("invalid game state: {0}")]
    InvalidGameState(String),

    /// No live simulation exists for this player.
    #[error("no simulation for player {0}")]
    PlayerNotFound(PlayerId),

    /// The player's actor has shut down and can no longer be reached.
    #[error("simulation for player {0} is gone")]
    PlayerGone(PlayerId),

    /// A rules-layer failure.
    #[error("tetris logic error: {0}")]
    Tetris(#[from] gridlock_core::CoreError),

    /// A state-store failure.
    #[error(transparent)]
    Store(#[from] gridlock_store::StoreError),
}

impl SimError {
    /// The wire error body for this failure.
    pub fn to_error_body(&self) -> ErrorBody {
        let code = match self {
            SimError::InvalidGameState(_) => ErrorCode::InvalidGameState,
            SimError::PlayerNotFound(_) | SimError::PlayerGone(_) => {
                ErrorCode::PlayerNotFound
            }
            SimError::Tetris(_) => ErrorCode::TetrisLogic,
            SimError::Store(_) => ErrorCode::StoreError,
        };
        ErrorBody::new(code, self.to_string())
    }
}

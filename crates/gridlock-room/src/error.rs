//! Error types for the room layer.

use gridlock_protocol::{
    ErrorBody, ErrorCode, PlayerId, RoomId, RoomStatus,
};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A request field failed validation.
    #[error("validation failed: {message}")]
    Validation { field: String, message: String },

    /// The room does not exist (or its record expired).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room's status does not admit new players.
    #[error("room {0} is not accepting players")]
    NotAccepting(RoomId),

    /// The room is at the 99-player cap.
    #[error("room {0} is full")]
    Full(RoomId),

    /// The room is in the wrong status to start a game.
    #[error("room {room} cannot start from status {status}")]
    CannotStart { room: RoomId, status: RoomStatus },

    /// The player does not exist in this room.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// The player already has a live game.
    #[error("player {0} is already in a game")]
    PlayerAlreadyInGame(PlayerId),

    /// A simulation-layer failure.
    #[error(transparent)]
    Sim(#[from] gridlock_sim::SimError),

    /// A store failure. The caller's room state is left coherent —
    /// no partial player-count increments.
    #[error(transparent)]
    Store(#[from] gridlock_store::StoreError),
}

impl RoomError {
    /// The wire error body for this failure.
    pub fn to_error_body(&self) -> ErrorBody {
        match self {
            RoomError::Validation { field, message } => {
                ErrorBody::new(ErrorCode::Validation, message.clone())
                    .with_details(serde_json::json!({ "field": field }))
            }
            RoomError::NotFound(_) => {
                ErrorBody::new(ErrorCode::RoomNotFound, self.to_string())
            }
            RoomError::NotAccepting(_) => ErrorBody::new(
                ErrorCode::RoomNotAcceptingPlayers,
                self.to_string(),
            ),
            RoomError::Full(_) => {
                ErrorBody::new(ErrorCode::RoomFull, self.to_string())
            }
            RoomError::CannotStart { .. } => {
                ErrorBody::new(ErrorCode::CannotStart, self.to_string())
            }
            RoomError::PlayerNotFound(_) => ErrorBody::new(
                ErrorCode::PlayerNotFound,
                self.to_string(),
            ),
            RoomError::PlayerAlreadyInGame(_) => ErrorBody::new(
                ErrorCode::PlayerAlreadyInGame,
                self.to_string(),
            ),
            RoomError::Sim(e) => e.to_error_body(),
            RoomError::Store(_) => {
                ErrorBody::new(ErrorCode::StoreError, self.to_string())
            }
        }
    }
}

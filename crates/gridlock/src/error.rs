//! Unified error type for the server crate.

use gridlock_protocol::{ErrorBody, ErrorCode, ProtocolError};
use gridlock_room::RoomError;
use gridlock_sim::SimError;
use gridlock_store::StoreError;
use gridlock_transport::TransportError;

/// Top-level error wrapping every layer's failures.
#[derive(Debug, thiserror::Error)]
pub enum GridlockError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("session error: {0}")]
    Session(#[from] gridlock_session::SessionError),
}

impl GridlockError {
    /// The wire error body sent back in a `{success: false}` reply.
    /// Anything outside the request-level taxonomy maps to an
    /// internal code (and is logged with detail server-side).
    pub fn to_error_body(&self) -> ErrorBody {
        match self {
            GridlockError::Room(e) => e.to_error_body(),
            GridlockError::Sim(e) => e.to_error_body(),
            GridlockError::Store(_) => {
                ErrorBody::new(ErrorCode::StoreError, self.to_string())
            }
            GridlockError::Protocol(_) => {
                ErrorBody::new(ErrorCode::Validation, self.to_string())
            }
            GridlockError::Session(_) => {
                ErrorBody::new(ErrorCode::Validation, self.to_string())
            }
            GridlockError::Transport(_) => ErrorBody::new(
                ErrorCode::Internal,
                "internal transport error",
            ),
        }
    }
}

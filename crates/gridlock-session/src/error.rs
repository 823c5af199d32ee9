//! Error types for the session layer.

use gridlock_protocol::PlayerId;

/// Errors that can occur during session bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session is registered for this socket.
    #[error("no session for socket {0}")]
    SocketNotFound(String),

    /// No session is registered for this player.
    #[error("no session for player {0}")]
    PlayerNotFound(PlayerId),

    /// An `input_event` arrived with a `seq` at or below the last
    /// accepted one — a duplicate or an out-of-order delivery.
    #[error(
        "stale input seq {received} for player {player} (last accepted {last})"
    )]
    StaleSeq {
        player: PlayerId,
        received: u64,
        last: u64,
    },
}

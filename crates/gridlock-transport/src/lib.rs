//! Transport abstraction for Gridlock.
//!
//! The gateway speaks to clients through the [`Listener`] and
//! [`Connection`] traits; the shipped implementation is WebSocket over
//! `tokio-tungstenite`. Frames are JSON text end to end — the same
//! encoding the store's pub/sub payloads use, so fan-out forwards
//! payloads without re-encoding.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{WsConnection, WsListener};

use std::fmt;
use std::future::Future;

/// Opaque per-connection identifier; doubles as the `socketId` in
/// session bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(u64);

impl SocketId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sock-{}", self.0)
    }
}

/// Accepts inbound client connections.
pub trait Listener: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send;

    /// The bound local address (for tests and logs).
    fn local_addr(&self) -> std::io::Result<std::net::SocketAddr>;
}

/// One bidirectional message stream.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one text frame.
    fn send(
        &self,
        frame: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next text frame. `Ok(None)` is a clean close.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// This connection's id.
    fn id(&self) -> SocketId;
}

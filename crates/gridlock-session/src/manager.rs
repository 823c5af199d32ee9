//! The session manager: socket→player resolution and sync accounting.

use std::collections::HashMap;
use std::time::Instant;

use gridlock_protocol::{PlayerId, RoomId};
use tracing::{info, warn};

use crate::error::SessionError;
use crate::session::ClientSession;

/// Tracks every connected client, keyed by socket id.
///
/// Each connected socket maps to at most one player, and each player
/// to at most one socket; registering a player on a second socket
/// evicts the first mapping.
#[derive(Default)]
pub struct SessionManager {
    sessions: HashMap<String, ClientSession>,
    /// Reverse index, kept in sync with `sessions`.
    by_player: HashMap<PlayerId, String>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a socket to a player, creating the session ledger.
    pub fn register(
        &mut self,
        socket_id: &str,
        player_id: PlayerId,
    ) -> &ClientSession {
        if let Some(old_socket) = self.by_player.remove(&player_id) {
            self.sessions.remove(&old_socket);
            warn!(
                %player_id,
                old_socket,
                "player re-registered on a new socket"
            );
        }
        self.by_player.insert(player_id, socket_id.to_string());
        self.sessions
            .insert(socket_id.to_string(), ClientSession::new(player_id));
        info!(%player_id, socket_id, "session registered");
        self.sessions.get(socket_id).expect("just inserted")
    }

    /// Records which room the socket's player joined.
    pub fn set_room(
        &mut self,
        socket_id: &str,
        room_id: RoomId,
    ) -> Result<(), SessionError> {
        let session = self.session_mut(socket_id)?;
        session.room_id = Some(room_id);
        Ok(())
    }

    /// Resolves a socket to its player.
    pub fn resolve(&self, socket_id: &str) -> Option<&ClientSession> {
        self.sessions.get(socket_id)
    }

    /// Resolves a player to its socket id.
    pub fn socket_for(&self, player_id: &PlayerId) -> Option<&str> {
        self.by_player.get(player_id).map(String::as_str)
    }

    /// Drops the session for a disconnected socket, returning it so
    /// the gateway can run leave cleanup.
    pub fn remove(&mut self, socket_id: &str) -> Option<ClientSession> {
        let session = self.sessions.remove(socket_id)?;
        self.by_player.remove(&session.player_id);
        info!(player_id = %session.player_id, socket_id, "session removed");
        Some(session)
    }

    /// Validates and records an `input_event` seq.
    ///
    /// Accepts strictly increasing values; duplicates and regressions
    /// are rejected so replayed inputs cannot double-apply.
    pub fn accept_input_seq(
        &mut self,
        socket_id: &str,
        seq: u64,
    ) -> Result<(), SessionError> {
        let session = self.session_mut(socket_id)?;
        if seq <= session.last_seq {
            return Err(SessionError::StaleSeq {
                player: session.player_id,
                received: seq,
                last: session.last_seq,
            });
        }
        session.last_seq = seq;
        Ok(())
    }

    /// Records a ping and updates the latency / clock-offset
    /// estimates: `rtt = now − client_send`, assumed symmetric, so
    /// `offset = client_time − (server_time − rtt/2)`.
    pub fn record_ping(
        &mut self,
        socket_id: &str,
        client_time: u64,
        server_time: u64,
    ) -> Result<(), SessionError> {
        let session = self.session_mut(socket_id)?;
        session.last_ping = Some(Instant::now());
        let rtt = server_time.saturating_sub(client_time);
        session.latency_ms = Some(rtt);
        session.clock_offset_ms = Some(
            client_time as i64 - (server_time as i64 - rtt as i64 / 2),
        );
        Ok(())
    }

    /// Records a desync report. Reports are counted and surfaced as
    /// warnings; the authoritative state is not rolled back.
    pub fn record_desync(
        &mut self,
        socket_id: &str,
        details: &str,
    ) -> Result<u32, SessionError> {
        let session = self.session_mut(socket_id)?;
        session.desync_reports += 1;
        warn!(
            player_id = %session.player_id,
            reports = session.desync_reports,
            details,
            "client reported desync"
        );
        Ok(session.desync_reports)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn session_mut(
        &mut self,
        socket_id: &str,
    ) -> Result<&mut ClientSession, SessionError> {
        self.sessions.get_mut(socket_id).ok_or_else(|| {
            SessionError::SocketNotFound(socket_id.to_string())
        })
    }
}

// =========================================================================
// Tests
// =========================================================================

//! The connection registry: who is reachable where.
//!
//! This is the transport side of fan-out — the per-player and
//! per-room broadcast primitives the pub/sub forwarder writes into.
//! Lookups happen under a plain mutex; the async sends happen after
//! the lock is released.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use gridlock_protocol::{PlayerId, RoomId};
use gridlock_transport::{Connection, SocketId};
use tracing::{debug, warn};

struct Inner<C> {
    connections: HashMap<SocketId, C>,
    players: HashMap<PlayerId, SocketId>,
    rooms: HashMap<RoomId, HashSet<SocketId>>,
}

/// Shared registry of live connections. Clones share state.
pub struct ConnectionRegistry<C> {
    inner: Arc<Mutex<Inner<C>>>,
}

impl<C> Clone for ConnectionRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                connections: HashMap::new(),
                players: HashMap::new(),
                rooms: HashMap::new(),
            })),
        }
    }
}

impl<C: Connection + Clone> ConnectionRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly accepted connection.
    pub fn insert(&self, conn: C) {
        let mut inner = self.inner.lock().unwrap();
        inner.connections.insert(conn.id(), conn);
    }

    /// Binds a socket to its player after a successful join.
    pub fn bind_player(&self, socket: SocketId, player: PlayerId) {
        let mut inner = self.inner.lock().unwrap();
        inner.players.insert(player, socket);
    }

    /// Adds a socket to a room's broadcast group.
    pub fn join_room(&self, socket: SocketId, room: &RoomId) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .rooms
            .entry(room.clone())
            .or_default()
            .insert(socket);
    }

    /// Removes a socket from a room's broadcast group.
    pub fn leave_room(&self, socket: SocketId, room: &RoomId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(members) = inner.rooms.get_mut(room) {
            members.remove(&socket);
            if members.is_empty() {
                inner.rooms.remove(room);
            }
        }
    }

    /// Drops every trace of a socket (disconnect path).
    pub fn remove(&self, socket: SocketId) {
        let mut inner = self.inner.lock().unwrap();
        inner.connections.remove(&socket);
        inner.players.retain(|_, s| *s != socket);
        inner.rooms.retain(|_, members| {
            members.remove(&socket);
            !members.is_empty()
        });
        debug!(%socket, "connection unregistered");
    }

    /// Sends a frame to one player's socket, if connected.
    pub async fn send_to_player(&self, player: &PlayerId, frame: &str) {
        let conn = {
            let inner = self.inner.lock().unwrap();
            inner
                .players
                .get(player)
                .and_then(|socket| {
                    inner.connections.get(socket).cloned()
                })
        };
        if let Some(conn) = conn {
            if let Err(e) = conn.send(frame).await {
                // Dead peer: the gateway's recv loop will clean up.
                warn!(%player, error = %e, "player send failed");
            }
        }
    }

    /// Broadcasts a frame to every socket in a room.
    pub async fn send_to_room(&self, room: &RoomId, frame: &str) {
        let targets: Vec<C> = {
            let inner = self.inner.lock().unwrap();
            inner
                .rooms
                .get(room)
                .map(|members| {
                    members
                        .iter()
                        .filter_map(|socket| {
                            inner.connections.get(socket).cloned()
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        for conn in targets {
            if let Err(e) = conn.send(frame).await {
                warn!(room_id = %room, error = %e, "room send failed");
            }
        }
    }

    /// Live connection count (test hook).
    pub fn connection_count(&self) -> usize {
        self.inner.lock().unwrap().connections.len()
    }
}

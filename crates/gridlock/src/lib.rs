//! # Gridlock
//!
//! Server-authoritative multiplayer tetris battle server.
//!
//! Clients never submit boards, pieces, or scores — only actions. The
//! server replays each action against its own per-player simulation,
//! drives gravity on per-level timers, routes players into shared
//! rooms of up to 99, and fans state out through the store's pub/sub
//! channels.
//!
//! Layers, bottom up: `gridlock-core` (pure rules) →
//! `gridlock-protocol` (wire types) → `gridlock-store` (state store
//! contract + facade) → `gridlock-gravity` / `gridlock-sim` (player
//! actors) → `gridlock-room` (allocation) → this crate (gateway,
//! fan-out, server loop).

mod config;
mod error;
mod fanout;
mod gateway;
mod registry;
mod server;

pub use config::ServerConfig;
pub use error::GridlockError;
pub use registry::ConnectionRegistry;
pub use server::{GridlockServer, GridlockServerBuilder};

/// Re-exports everything an embedding binary needs.
pub mod prelude {
    pub use crate::{
        ConnectionRegistry, GridlockError, GridlockServer,
        GridlockServerBuilder, ServerConfig,
    };

    pub use gridlock_protocol::{
        Action, BroadcastEvent, ClientRequest, ErrorBody, ErrorCode,
        Player, PlayerGameState, PlayerId, Room, RoomId, RoomStatus,
        SyncMessage, SyncReply,
    };

    pub use gridlock_room::{RoomError, RoomManager};
    pub use gridlock_sim::{SimError, SimulationHub};
    pub use gridlock_store::{
        GameStore, MemoryStatsStore, MemoryStore, StateStore,
        StatsStore, StoreError,
    };
    pub use gridlock_transport::{
        Connection, Listener, SocketId, TransportError, WsListener,
    };
}

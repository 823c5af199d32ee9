//! State store layer for Gridlock.
//!
//! The server treats its key-value store as an abstract contract —
//! [`StateStore`] — with string records, optional TTLs, unordered
//! sets, hash records, and fire-and-forget pub/sub with pattern
//! subscriptions. [`MemoryStore`] is the in-process implementation
//! used by tests and the default binary; a networked backend slots in
//! behind the same trait.
//!
//! On top of the raw contract sit:
//! - [`GameStore`] — the typed facade (rooms, players, game states,
//!   membership sets, 1-hour record TTLs, event publishing),
//! - [`GameStateCache`] — a short-TTL read cache fronting
//!   `player_game:*` lookups to absorb broadcast fan-out read storms;
//!   every write invalidates its entry, so it is correctness-neutral,
//! - [`StatsStore`] — the durable sink for post-game aggregates.

#![allow(async_fn_in_trait)]

mod cache;
mod channels;
mod error;
mod facade;
mod keys;
mod memory;
mod stats;
mod store;

pub use cache::GameStateCache;
pub use channels::{
    channel, parse_channel, patterns, ChannelKind, ParsedChannel,
};
pub use error::StoreError;
pub use facade::{GameStore, RECORD_TTL};
pub use keys::key;
pub use memory::MemoryStore;
pub use stats::{FinalStats, MemoryStatsStore, StatsStore};
pub use store::{PubSubMessage, StateStore, Subscription};

//! Session layer for Gridlock.
//!
//! Tracks which socket speaks for which player, and the per-client
//! network-sync ledger: the last accepted `seq`, ping timing, latency
//! and clock-offset estimates, and desync reports.
//!
//! # Concurrency note
//!
//! `SessionManager` is not thread-safe by itself — it is owned by the
//! server state and accessed behind a single async mutex. Keeping it a
//! plain `HashMap` avoids hidden locking underneath that.

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::ClientSession;

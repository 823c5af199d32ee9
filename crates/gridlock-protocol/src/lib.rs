//! Wire protocol for Gridlock.
//!
//! This crate defines everything that travels between clients, the
//! server, and the state store's pub/sub channels:
//!
//! - **Ids** ([`PlayerId`], [`RoomId`]) — newtype identifiers.
//! - **Entities** ([`Room`], [`Player`], [`PlayerGameState`]) — the
//!   records the server owns and the shapes clients receive.
//! - **Actions** ([`Action`]) — the closed set of inputs a client may
//!   submit; the server replays them against its own simulation and
//!   never trusts a client-supplied board, piece, or score.
//! - **Messages** ([`ClientRequest`], the reply envelopes,
//!   [`SyncMessage`]) and **broadcast events** ([`BroadcastEvent`]).
//! - **Codec** ([`Codec`], [`JsonCodec`]) and **errors**
//!   ([`ProtocolError`], [`ErrorBody`], [`ErrorCode`]).
//!
//! The protocol layer sits between transport (text frames) and the
//! gateway (player context): it only knows how to name and serialize
//! things.

mod action;
mod codec;
mod entities;
mod error;
mod events;
mod ids;
mod messages;
mod sync;

pub use action::Action;
pub use codec::{Codec, JsonCodec};
pub use entities::{
    Player, PlayerGameState, PlayerStatus, Room, RoomStats, RoomStatus,
    ServerStats, MAX_ROOM_PLAYERS,
};
pub use error::{ErrorBody, ErrorCode, ProtocolError};
pub use events::BroadcastEvent;
pub use ids::{PlayerId, RoomId};
pub use messages::{
    AckReply, ClientRequest, ErrorReply, GameStateReply, Inbound,
    JoinReply, RoomInfoReply, RoomPlayersReply, RoomStatsReply,
    StartReply,
};
pub use sync::{SyncMessage, SyncReply};

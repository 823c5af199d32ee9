//! The pub/sub fan-out: store channels → transport.
//!
//! One subscription per pattern, taken once at server startup. Each
//! delivered message is forwarded *unchanged* to the matching
//! transport destination: player channels to the player's socket,
//! room channels to the room's broadcast group. The loops never die —
//! a message that fails to route is logged and dropped (broadcast
//! delivery is at-most-once, best-effort).

use gridlock_protocol::{PlayerId, RoomId};
use gridlock_store::{
    parse_channel, patterns, ChannelKind, PubSubMessage, StateStore,
};
use gridlock_transport::Connection;
use tracing::{error, info, warn};

use crate::registry::ConnectionRegistry;

/// Subscribes to all four patterns and spawns one forwarding task
/// per subscription.
pub(crate) fn start_fanout<S, C>(
    store: &S,
    registry: ConnectionRegistry<C>,
) where
    S: StateStore,
    C: Connection + Clone,
{
    for pattern in patterns::ALL {
        match store.subscribe(pattern) {
            Ok(mut subscription) => {
                let registry = registry.clone();
                tokio::spawn(async move {
                    info!(pattern, "fan-out subscription active");
                    while let Some(msg) = subscription.recv().await {
                        forward(&registry, msg).await;
                    }
                    // Only reachable when the store itself is gone.
                    info!(pattern, "fan-out subscription ended");
                });
            }
            Err(e) => {
                error!(pattern, error = %e, "fan-out subscribe failed");
            }
        }
    }
}

/// Routes one delivered message. Never propagates an error.
async fn forward<C: Connection + Clone>(
    registry: &ConnectionRegistry<C>,
    msg: PubSubMessage,
) {
    let Some(parsed) = parse_channel(&msg.channel) else {
        warn!(channel = %msg.channel, "unroutable channel, dropping");
        return;
    };
    match parsed.kind {
        ChannelKind::GameStateUpdate | ChannelKind::GameStarted => {
            match parsed.id.parse() {
                Ok(uuid) => {
                    registry
                        .send_to_player(
                            &PlayerId(uuid),
                            &msg.payload,
                        )
                        .await;
                }
                Err(_) => warn!(
                    channel = %msg.channel,
                    "non-uuid player suffix, dropping"
                ),
            }
        }
        ChannelKind::PlayerStateChanged
        | ChannelKind::RoomStateUpdate => {
            registry
                .send_to_room(&RoomId::new(parsed.id), &msg.payload)
                .await;
        }
    }
}

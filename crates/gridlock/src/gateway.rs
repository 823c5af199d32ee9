//! The per-connection gateway: dispatch, replies, and disconnect
//! cleanup.
//!
//! Every request receives exactly one terminal reply — a typed
//! `{success, …}` envelope or `{success: false, error: {code,
//! message}}`. `handlePlayerInput` is the one fire-and-forget: its
//! effects surface through the pub/sub fan-out.
//!
//! Client lifecycle: CONNECTED → JOINED_ROOM → IN_GAME →
//! (GAME_OVER | LEFT). Disconnects at any point resolve the socket
//! back to its player and run a best-effort leave, so no gravity
//! timer outlives its connection unobserved.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use gridlock_protocol::{
    AckReply, Action, ClientRequest, Codec, ErrorBody, ErrorCode,
    ErrorReply, GameStateReply, Inbound, JoinReply, PlayerId,
    RoomId, RoomInfoReply, RoomPlayersReply, RoomStatsReply,
    StartReply, SyncMessage, SyncReply,
};
use gridlock_session::SessionError;
use gridlock_store::{StateStore, StatsStore};
use gridlock_transport::{Connection, SocketId, WsConnection};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::server::ServerState;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Runs one connection from accept to close.
pub(crate) async fn handle_connection<S: StateStore, D: StatsStore>(
    conn: WsConnection,
    state: Arc<ServerState<S, D>>,
) {
    let socket = conn.id();
    info!(%socket, "client connected");

    loop {
        match conn.recv().await {
            Ok(Some(frame)) => {
                dispatch(&conn, &state, socket, &frame).await;
            }
            Ok(None) => {
                info!(%socket, "client disconnected");
                break;
            }
            Err(e) => {
                debug!(%socket, error = %e, "receive error");
                break;
            }
        }
    }

    cleanup(&state, socket).await;
}

/// Decodes one inbound frame and routes it.
async fn dispatch<S: StateStore, D: StatsStore>(
    conn: &WsConnection,
    state: &Arc<ServerState<S, D>>,
    socket: SocketId,
    frame: &str,
) {
    let inbound: Inbound = match state.codec.decode(frame) {
        Ok(inbound) => inbound,
        Err(e) => {
            debug!(%socket, error = %e, "undecodable frame");
            send_reply(
                conn,
                state,
                &ErrorReply::new(ErrorBody::new(
                    ErrorCode::Validation,
                    "unrecognized message",
                )),
            )
            .await;
            return;
        }
    };

    match inbound {
        Inbound::Request(request) => {
            handle_request(conn, state, socket, request).await;
        }
        Inbound::Sync(message) => {
            handle_sync(conn, state, socket, message).await;
        }
    }
}

async fn handle_request<S: StateStore, D: StatsStore>(
    conn: &WsConnection,
    state: &Arc<ServerState<S, D>>,
    socket: SocketId,
    request: ClientRequest,
) {
    match request {
        ClientRequest::JoinAutoRoom { name } => {
            match state.rooms.join_auto(&name).await {
                Ok((room, mut player)) => {
                    let socket_key = socket.to_string();
                    {
                        let mut sessions =
                            state.sessions.lock().await;
                        sessions.register(&socket_key, player.id);
                        let _ = sessions
                            .set_room(&socket_key, room.id.clone());
                    }
                    state.registry.bind_player(socket, player.id);
                    state.registry.join_room(socket, &room.id);

                    // Mirror the socket binding into the store.
                    player.socket_id = Some(socket_key.clone());
                    if let Err(e) =
                        state.store.save_player(&player).await
                    {
                        warn!(%socket, error = %e, "socket mirror failed");
                    }
                    if let Err(e) = state
                        .store
                        .save_socket(&socket_key, &player.id)
                        .await
                    {
                        warn!(%socket, error = %e, "socket record failed");
                    }

                    send_reply(
                        conn,
                        state,
                        &JoinReply {
                            success: true,
                            room_id: room.id.clone(),
                            player,
                        },
                    )
                    .await;
                }
                Err(e) => send_error(conn, state, e.to_error_body()).await,
            }
        }

        ClientRequest::LeaveAutoRoom { room_id, player_id } => {
            match state.rooms.leave_auto(&room_id, &player_id).await {
                Ok(()) => {
                    state.registry.leave_room(socket, &room_id);
                    send_reply(
                        conn,
                        state,
                        &AckReply { success: true },
                    )
                    .await;
                }
                Err(e) => send_error(conn, state, e.to_error_body()).await,
            }
        }

        ClientRequest::HandlePlayerInput { player_id, action } => {
            // Fire-and-forget by contract; errors are logged, effects
            // are broadcast.
            route_input(state, &player_id, action).await;
        }

        ClientRequest::GetPlayerGameState { player_id } => {
            match state.rooms.hub().state_of(&player_id).await {
                Ok(game_state) => {
                    send_reply(
                        conn,
                        state,
                        &GameStateReply {
                            success: true,
                            game_state,
                        },
                    )
                    .await;
                }
                Err(e) => send_error(conn, state, e.to_error_body()).await,
            }
        }

        ClientRequest::GetRoomPlayers { room_id } => {
            match state.rooms.room_players(&room_id).await {
                Ok(players) => {
                    send_reply(
                        conn,
                        state,
                        &RoomPlayersReply {
                            success: true,
                            players,
                        },
                    )
                    .await;
                }
                Err(e) => send_error(conn, state, e.to_error_body()).await,
            }
        }

        ClientRequest::GetRoomInfo { room_id } => {
            match state.rooms.get_room(&room_id).await {
                Ok(room) => {
                    // The reply acks; the full shape goes out on the
                    // room's broadcast topic.
                    state.rooms.publish_room_state(&room).await;
                    send_reply(
                        conn,
                        state,
                        &RoomInfoReply {
                            success: true,
                            room,
                        },
                    )
                    .await;
                }
                Err(e) => send_error(conn, state, e.to_error_body()).await,
            }
        }

        ClientRequest::GetRoomStats => {
            match state.rooms.server_stats().await {
                Ok(stats) => {
                    send_reply(
                        conn,
                        state,
                        &RoomStatsReply {
                            success: true,
                            stats,
                        },
                    )
                    .await;
                }
                Err(e) => send_error(conn, state, e.to_error_body()).await,
            }
        }

        ClientRequest::StartRoomGame { room_id } => {
            match state.rooms.start_room_game(&room_id).await {
                Ok(room) => {
                    send_reply(
                        conn,
                        state,
                        &StartReply {
                            success: true,
                            room_id: room.id,
                            game_seed: room.room_seed,
                        },
                    )
                    .await;
                }
                Err(e) => send_error(conn, state, e.to_error_body()).await,
            }
        }
    }
}

/// The negotiated network-sync side channel.
async fn handle_sync<S: StateStore, D: StatsStore>(
    conn: &WsConnection,
    state: &Arc<ServerState<S, D>>,
    socket: SocketId,
    message: SyncMessage,
) {
    let socket_key = socket.to_string();
    match message {
        SyncMessage::JoinGame { seq, player_id }
        | SyncMessage::MatchReady { seq, player_id } => {
            // Sync clients bind their own player mapping.
            state
                .sessions
                .lock()
                .await
                .register(&socket_key, player_id);
            state.registry.bind_player(socket, player_id);
            trace!(%socket, seq, %player_id, "sync channel bound");
        }

        SyncMessage::InputEvent {
            seq,
            player_id,
            action,
        } => {
            let accepted = state
                .sessions
                .lock()
                .await
                .accept_input_seq(&socket_key, seq);
            match accepted {
                Ok(()) => {
                    route_input(state, &player_id, action).await;
                }
                Err(SessionError::StaleSeq {
                    received, last, ..
                }) => {
                    warn!(
                        %socket,
                        received,
                        last,
                        "stale input_event rejected"
                    );
                }
                Err(e) => {
                    debug!(%socket, error = %e, "input_event without session");
                }
            }
        }

        SyncMessage::Ping { seq, client_time } => {
            let server_time = now_ms();
            // Ledger update is best-effort; pong always goes out.
            let _ = state.sessions.lock().await.record_ping(
                &socket_key,
                client_time,
                server_time,
            );
            send_reply(
                conn,
                state,
                &SyncReply::Pong {
                    seq,
                    client_time,
                    server_time,
                },
            )
            .await;
        }

        SyncMessage::SnapshotRequest { seq, player_id } => {
            match state.rooms.hub().state_of(&player_id).await {
                Ok(game_state) => {
                    send_reply(
                        conn,
                        state,
                        &SyncReply::StateSnapshot {
                            seq,
                            server_time: now_ms(),
                            game_state,
                        },
                    )
                    .await;
                }
                Err(e) => send_error(conn, state, e.to_error_body()).await,
            }
        }

        SyncMessage::Ack { seq } | SyncMessage::Keepalive { seq } => {
            trace!(%socket, seq, "sync heartbeat");
        }

        SyncMessage::DesyncReport {
            seq,
            player_id,
            details,
        } => {
            let _ = state
                .sessions
                .lock()
                .await
                .record_desync(&socket_key, &details);
            debug!(%socket, seq, %player_id, "desync report recorded");
        }
    }
}

/// Queues one action for a player's simulation. Errors never reach
/// the client; the simulation recovers or finishes on its own.
async fn route_input<S: StateStore, D: StatsStore>(
    state: &Arc<ServerState<S, D>>,
    player_id: &PlayerId,
    action: Action,
) {
    if let Err(e) =
        state.rooms.hub().input(player_id, action).await
    {
        warn!(%player_id, %action, error = %e, "input dropped");
    }
}

/// Disconnect path: resolve socket → player, best-effort leave, and
/// unregister everywhere. Tolerates a player that already left.
async fn cleanup<S: StateStore, D: StatsStore>(
    state: &Arc<ServerState<S, D>>,
    socket: SocketId,
) {
    let socket_key = socket.to_string();
    let session = state.sessions.lock().await.remove(&socket_key);

    if let Some(session) = session {
        let room_id: Option<RoomId> = match session.room_id {
            Some(room) => Some(room),
            // Fall back to the player record for sync-bound clients.
            None => state
                .store
                .load_player(&session.player_id)
                .await
                .ok()
                .flatten()
                .map(|p| p.room_id),
        };
        if let Some(room_id) = room_id {
            if let Err(e) = state
                .rooms
                .leave_auto(&room_id, &session.player_id)
                .await
            {
                debug!(
                    %socket,
                    player_id = %session.player_id,
                    error = %e,
                    "disconnect leave was a no-op"
                );
            }
        } else {
            // No room, but a simulation may still be live.
            state.rooms.hub().remove(&session.player_id).await;
        }
    }

    state.registry.remove(socket);
    if let Err(e) = state.store.delete_socket(&socket_key).await {
        debug!(%socket, error = %e, "socket record cleanup failed");
    }
}

async fn send_error<S: StateStore, D: StatsStore>(
    conn: &WsConnection,
    state: &Arc<ServerState<S, D>>,
    body: ErrorBody,
) {
    send_reply(conn, state, &ErrorReply::new(body)).await;
}

async fn send_reply<S: StateStore, D: StatsStore, T: Serialize>(
    conn: &WsConnection,
    state: &Arc<ServerState<S, D>>,
    reply: &T,
) {
    let frame = match state.codec.encode(reply) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "reply encode failed");
            return;
        }
    };
    if let Err(e) = conn.send(&frame).await {
        debug!(socket = %conn.id(), error = %e, "reply send failed");
    }
}

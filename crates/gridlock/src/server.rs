//! Server builder and accept loop.

use std::sync::Arc;

use gridlock_protocol::JsonCodec;
use gridlock_room::RoomManager;
use gridlock_session::SessionManager;
use gridlock_sim::SimulationHub;
use gridlock_store::{GameStore, StateStore, StatsStore};
use gridlock_transport::{Listener, WsConnection, WsListener};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::fanout::start_fanout;
use crate::gateway::handle_connection;
use crate::registry::ConnectionRegistry;
use crate::GridlockError;

/// Shared server state handed to every connection task.
pub(crate) struct ServerState<S: StateStore, D: StatsStore> {
    pub(crate) rooms: RoomManager<S, D>,
    pub(crate) store: GameStore<S>,
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) registry: ConnectionRegistry<WsConnection>,
    pub(crate) codec: JsonCodec,
}

/// Builder for a [`GridlockServer`].
///
/// ```rust,ignore
/// let server = GridlockServerBuilder::new()
///     .config(ServerConfig::from_env())
///     .build(MemoryStore::new(), MemoryStatsStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct GridlockServerBuilder {
    bind_addr: String,
}

impl GridlockServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: ServerConfig::default().bind_addr(),
        }
    }

    /// Binds to an explicit address (tests use `127.0.0.1:0`).
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Takes the bind address from a config.
    pub fn config(mut self, config: &ServerConfig) -> Self {
        self.bind_addr = config.bind_addr();
        self
    }

    /// Binds the listener, wires the layers, and starts the fan-out
    /// subscriptions.
    pub async fn build<S: StateStore, D: StatsStore>(
        self,
        store: S,
        stats: D,
    ) -> Result<GridlockServer<S, D>, GridlockError> {
        let listener = WsListener::bind(&self.bind_addr).await?;

        let game_store = GameStore::new(store.clone());
        let hub = SimulationHub::new(game_store.clone(), stats);
        let rooms = RoomManager::new(game_store.clone(), hub);
        let registry = ConnectionRegistry::new();

        // One subscription per pattern, for the process lifetime.
        start_fanout(&store, registry.clone());

        let state = Arc::new(ServerState {
            rooms,
            store: game_store,
            sessions: Mutex::new(SessionManager::new()),
            registry,
            codec: JsonCodec,
        });

        Ok(GridlockServer { listener, state })
    }
}

impl Default for GridlockServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running server.
pub struct GridlockServer<S: StateStore, D: StatsStore> {
    listener: WsListener,
    state: Arc<ServerState<S, D>>,
}

impl<S: StateStore, D: StatsStore> GridlockServer<S, D> {
    /// The bound local address.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop: one gateway task per connection. Runs until the
    /// process ends.
    pub async fn run(mut self) -> Result<(), GridlockError> {
        info!("gridlock server running");
        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    self.state.registry.insert(conn.clone());
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        handle_connection(conn, state).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                }
            }
        }
    }

    /// Stops every player simulation (and with them, every gravity
    /// timer). Call on shutdown.
    pub async fn shutdown(&self) {
        self.state.rooms.hub().shutdown_all().await;
        info!("gridlock server stopped");
    }

    /// A handle for shutdown from a signal task.
    pub fn shutdown_handle(&self) -> ShutdownHandle<S, D> {
        ShutdownHandle {
            state: Arc::clone(&self.state),
        }
    }
}

/// Detached shutdown handle.
pub struct ShutdownHandle<S: StateStore, D: StatsStore> {
    state: Arc<ServerState<S, D>>,
}

impl<S: StateStore, D: StatsStore> ShutdownHandle<S, D> {
    /// Cancels every live simulation.
    pub async fn shutdown(&self) {
        self.state.rooms.hub().shutdown_all().await;
        info!("gridlock server stopped");
    }
}

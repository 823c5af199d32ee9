//! Gridlock server binary.

use gridlock::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), GridlockError> {
    let config = ServerConfig::from_env();

    let default_filter = if config.development {
        "gridlock=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Some(url) = &config.store_url {
        // Networked backends plug in behind StateStore; this binary
        // ships only the in-process one.
        tracing::warn!(
            url,
            "STORE_URL set but no external backend is compiled in, \
             using the in-process store"
        );
    }

    let server = GridlockServerBuilder::new()
        .config(&config)
        .build(MemoryStore::new(), MemoryStatsStore::new())
        .await?;
    info!(
        addr = %server.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        development = config.development,
        "gridlock listening"
    );

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            // Every gravity timer dies with its actor here.
            shutdown.shutdown().await;
            std::process::exit(0);
        }
    });

    server.run().await
}

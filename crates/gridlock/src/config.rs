//! Server configuration from the environment.

use std::env;

/// Runtime configuration. `from_env` reads:
///
/// - `PORT` — listen port (default 3000)
/// - `STORE_URL` — external state-store connection string; absent
///   means the in-process store
/// - `DEVELOPMENT` (or the bare `development` flag) — verbose logs
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub store_url: Option<String>,
    pub development: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            store_url: None,
            development: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(3000);
        let store_url = env::var("STORE_URL").ok();
        let development = flag(env::var("DEVELOPMENT").ok())
            || flag(env::var("development").ok());
        Self {
            port,
            store_url,
            development,
        }
    }

    /// The bind address derived from the port.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

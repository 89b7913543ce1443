//! Configuration module for the StaffNet backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Whether `GET /api/seed` may wipe and reseed the database
    pub allow_seed: bool,
    /// Seed on startup when the users table is empty
    pub seed_on_start: bool,
    /// Buffer size of the change-notification channel
    pub event_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let db_path = env::var("STAFFNET_DB_PATH")
            .unwrap_or_else(|_| "./data/staffnet.sqlite".to_string())
            .into();

        let bind_addr = env::var("STAFFNET_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|e| format!("Invalid STAFFNET_BIND_ADDR '{}': {}", bind_addr, e))?;

        let log_level = env::var("STAFFNET_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env_flag("STAFFNET_LOG_JSON", false);

        let allow_seed = env_flag("STAFFNET_ALLOW_SEED", true);
        let seed_on_start = env_flag("STAFFNET_SEED_ON_START", false);

        let event_capacity = match env::var("STAFFNET_EVENT_CAPACITY") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("Invalid STAFFNET_EVENT_CAPACITY '{}'", raw))?,
            Err(_) => 256,
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            allow_seed,
            seed_on_start,
            event_capacity,
        })
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

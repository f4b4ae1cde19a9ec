use clap::{ArgAction, Parser};
use std::time::Duration;

/// Alert rule service configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "alertd")]
#[command(about = "Alert rule registry and control API")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8008", env = "ALERTD_LISTEN_ADDR")]
    pub listen_addr: String,

    /// PostgreSQL connection string (rules are kept in memory if not set)
    #[arg(long, env = "ALERTD_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Minimum pooled database connections
    #[arg(long, default_value = "1", env = "ALERTD_DB_MIN_CONNECTIONS")]
    pub db_min_connections: u32,

    /// Maximum pooled database connections
    #[arg(long, default_value = "10", env = "ALERTD_DB_MAX_CONNECTIONS")]
    pub db_max_connections: u32,

    /// Apply pending migrations at startup
    #[arg(long, default_value = "true", action = ArgAction::Set, env = "ALERTD_RUN_MIGRATIONS")]
    pub run_migrations: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false", action = ArgAction::Set, env = "ALERTD_LOG_JSON")]
    pub log_json: bool,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", action = ArgAction::Set, env = "ALERTD_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,

    /// Seconds to wait for in-flight requests after a shutdown signal
    #[arg(long, default_value = "30", env = "ALERTD_SHUTDOWN_TIMEOUT_SECS")]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// True when rules should be persisted in PostgreSQL.
    pub fn uses_database(&self) -> bool {
        self.database_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Get shutdown timeout as Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8008".to_string(),
            database_url: None,
            db_min_connections: 1,
            db_max_connections: 10,
            run_migrations: true,
            log_level: "info".to_string(),
            log_json: false,
            graceful_shutdown: true,
            shutdown_timeout_secs: 30,
        }
    }
}

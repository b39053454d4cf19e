//! Command-line and environment configuration.

use clap::Parser;
use roost_db::DbConfig;
use roost_market::MarketConfig;

/// Roost marketplace core service.
#[derive(Debug, Parser)]
#[command(name = "roost", version, about)]
pub struct Cli {
    /// SurrealDB WebSocket endpoint.
    #[arg(long, env = "ROOST_DB_URL", default_value = "127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "ROOST_DB_NAMESPACE", default_value = "roost")]
    pub db_namespace: String,

    #[arg(long, env = "ROOST_DB_DATABASE", default_value = "marketplace")]
    pub db_database: String,

    #[arg(long, env = "ROOST_DB_USERNAME", default_value = "root")]
    pub db_username: String,

    #[arg(long, env = "ROOST_DB_PASSWORD", default_value = "root", hide_env_values = true)]
    pub db_password: String,

    /// Pepper prepended to passwords before hashing.
    #[arg(long, env = "ROOST_PASSWORD_PEPPER", hide_env_values = true)]
    pub pepper: Option<String>,

    /// Work queue carrying host-role requests.
    #[arg(long, env = "ROOST_HOST_REQUEST_QUEUE", default_value = "adminQueue")]
    pub host_request_queue: String,

    /// Seconds between expired-token sweeps.
    #[arg(long, env = "ROOST_SWEEP_INTERVAL_SECS", default_value_t = 300)]
    pub sweep_interval_secs: u64,

    /// Seconds between reports of open host requests. The queue itself
    /// is left to the administrative listing.
    #[arg(long, env = "ROOST_BACKLOG_INTERVAL_SECS", default_value_t = 600)]
    pub backlog_interval_secs: u64,
}

impl Cli {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn market_config(&self) -> MarketConfig {
        MarketConfig {
            pepper: self.pepper.clone(),
            host_request_queue: self.host_request_queue.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let cli = Cli::parse_from(["roost"]);
        let db = cli.db_config();
        assert_eq!(db.namespace, DbConfig::default().namespace);
        assert_eq!(db.database, DbConfig::default().database);
        assert_eq!(
            cli.market_config().host_request_queue,
            MarketConfig::default().host_request_queue
        );
        assert!(cli.pepper.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "roost",
            "--db-url",
            "db:8000",
            "--sweep-interval-secs",
            "10",
            "--backlog-interval-secs",
            "30",
        ]);
        assert_eq!(cli.db_config().url, "db:8000");
        assert_eq!(cli.sweep_interval_secs, 10);
        assert_eq!(cli.backlog_interval_secs, 30);
    }
}

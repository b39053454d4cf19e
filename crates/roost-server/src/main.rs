//! Roost server. Connects to SurrealDB, applies migrations and runs
//! the marketplace housekeeping jobs until interrupted.

mod config;

use std::time::Duration;

use clap::Parser;
use roost_core::ports::TokenStore;
use roost_db::repository::{SurrealHostRequestRepository, SurrealUserRepository};
use roost_db::{DbManager, SurrealTokenStore, SurrealWorkQueue};
use roost_market::RoleEscalation;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("roost=info".parse()?))
        .json()
        .init();

    info!("Starting Roost server...");

    let manager = DbManager::open(&cli.db_config()).await?;
    let db = manager.client().clone();

    let market = cli.market_config();
    let user_repo = match &market.pepper {
        Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
        None => SurrealUserRepository::new(db.clone()),
    };
    let escalation = RoleEscalation::new(
        user_repo,
        SurrealHostRequestRepository::new(db.clone()),
        SurrealWorkQueue::new(db.clone()),
        market,
    );
    let tokens = SurrealTokenStore::new(db.clone());

    let mut sweep = tokio::time::interval(Duration::from_secs(cli.sweep_interval_secs.max(1)));
    let mut backlog =
        tokio::time::interval(Duration::from_secs(cli.backlog_interval_secs.max(1)));

    loop {
        tokio::select! {
            _ = sweep.tick() => match tokens.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Expired tokens purged"),
                Err(e) => warn!(error = %e, "Token sweep failed"),
            },
            // Read-only: the work queue stays with the admin listing.
            _ = backlog.tick() => match escalation.open_host_requests().await {
                Ok(open) if open.is_empty() => {}
                Ok(open) => info!(
                    open = open.len(),
                    oldest = %open[0].requested_at,
                    "Host role requests awaiting review"
                ),
                Err(e) => error!(error = %e, "Host request backlog check failed"),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Roost server stopped.");
    Ok(())
}

//! The `serve` subcommand: starts the HTTP server and loads the sheets in
//! the background.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use portfolio_lib::contact::{ContactClient, Relay};
use portfolio_lib::{Aggregator, PortfolioConfig, PortfolioStore};

use crate::server::{self, AppState};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides PORT and the config file)
    #[arg(long)]
    pub port: Option<u16>,
}

pub async fn run(args: &ServeArgs, config: PortfolioConfig) -> Result<()> {
    let config = match args.port {
        Some(port) => config.with_port(port),
        None => config,
    };

    let registry = config.registry();
    let store = Arc::new(PortfolioStore::new());
    store.spawn_load(Aggregator::new(Arc::new(config.sheets_client()), registry.clone()));

    let relay = Relay::new(config.selection()?);
    tracing::info!("Contact relay provider: {}", relay.method());
    let contact = ContactClient::new(&config.relay_url(), config.formsubmit_client()?)?;

    let state = AppState::new(store, registry, relay, contact, &config.fallback_email)?;
    server::serve(state, config.port).await
}

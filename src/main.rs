// VoltGrid - Decentralized Energy Marketplace Server

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use voltgrid::api::{self, AppState};
use voltgrid::assistant::AssistantClient;
use voltgrid::config::{AssistantConfig, ServerOptions};
use voltgrid::db::{open_database, seed_energy_centers_if_empty};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = ServerOptions::parse();

    let mut conn = open_database(&options.db)?;
    if !options.no_seed {
        seed_energy_centers_if_empty(&mut conn)?;
    }

    let assistant = AssistantConfig::from_env().map(AssistantClient::new);
    if assistant.is_none() {
        info!("GEMINI_API_KEY is not set; the assistant endpoint is disabled");
    }

    let state = AppState::new(conn, assistant);
    api::serve(state, options.addr).await
}

//! dolarblue - blue-dollar exchange rate for IVR call flows
//!
//! Starts the HTTP server, then refreshes the cached voice document once in
//! the background so the first call usually gets a real quote.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dolarblue::cli::{Cli, ServiceConfig};
use dolarblue::refresh::RefreshHandle;
use dolarblue::server::{self, AppState};

/// Sets up logging from RUST_LOG, defaulting to info for this crate and
/// the request log.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dolarblue=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ServiceConfig::from_cli(&cli)?;

    if config.voice.webhook_url.is_none() {
        warn!("TWILIO_WEBHOOK_URL is not set; redirects will carry only the query string");
    }

    let state = AppState::from_config(&config)?;
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        source = %config.source_url,
        "starting dolarblue"
    );

    let refresher = Arc::clone(&state.refresher);
    tokio::spawn(async move {
        refresher.refresh().await;
    });
    let background = RefreshHandle::spawn(Arc::clone(&state.refresher), config.refresh.clone());

    let result = server::serve(listener, state).await;
    background.shutdown().await;
    result
}

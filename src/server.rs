//! HTTP surface of the service
//!
//! Two routes: `POST /update` runs a refresh and always acknowledges it,
//! `GET /dollar-blue` serves the cached voice document (or the apology
//! document when nothing has been cached yet).

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};

use crate::cache::DocumentStore;
use crate::cli::ServiceConfig;
use crate::data::RatesClient;
use crate::refresh::Refresher;
use crate::voice::{VoiceBuilder, VoiceDocument};

/// Body returned by `POST /update`
pub const UPDATE_ACK: &str = "Update completed.";

/// State shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub refresher: Arc<Refresher>,
}

impl AppState {
    /// Wires the scraper, document builder and store from a configuration
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let rates = RatesClient::new(
            config.source_url.clone(),
            config.selectors.clone(),
            config.fetch_timeout,
        )?;
        let voice = VoiceBuilder::new(config.voice.clone())?;
        Ok(Self::new(rates, voice))
    }

    pub fn new(rates: RatesClient, voice: VoiceBuilder) -> Self {
        let store = Arc::new(DocumentStore::new());
        let refresher = Arc::new(Refresher::new(rates, voice, Arc::clone(&store)));
        Self { store, refresher }
    }
}

#[derive(Debug, Serialize)]
struct UpdateAck {
    message: &'static str,
}

/// Build the axum Router with both endpoints and request logging.
pub fn router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/update", post(handle_update))
        .route("/dollar-blue", get(handle_dollar_blue))
        .layer(trace)
        .with_state(state)
}

/// Serve the router on an already-bound listener until the process exits.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    info!("Server running on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Runs a refresh; the reply does not say whether it succeeded.
///
/// The refresh runs on its own task so a caller hanging up mid-fetch cannot
/// cancel it; the reply still waits for it to finish.
async fn handle_update(State(state): State<AppState>) -> Json<UpdateAck> {
    let refresher = Arc::clone(&state.refresher);
    if let Err(err) = tokio::spawn(async move { refresher.refresh().await }).await {
        error!(error = %err, "refresh task failed");
    }
    Json(UpdateAck {
        message: UPDATE_ACK,
    })
}

async fn handle_dollar_blue(State(state): State<AppState>) -> impl IntoResponse {
    let document = match state.store.get().await {
        Some(document) => document,
        None => state.refresher.fallback_document(),
    };
    xml_response(document)
}

fn xml_response(document: VoiceDocument) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        document.into_string(),
    )
}

//! Quote refresh pipeline
//!
//! A refresh scrapes the source page, renders the spoken date, builds the
//! voice document and stores it. Failures never escape: any error along the
//! way stores the apology document instead. Refreshes run on startup, on
//! `POST /update`, and optionally on a fixed interval in the background.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cache::DocumentStore;
use crate::data::{normalize_timestamp, DateError, RatesClient, ScrapeError};
use crate::voice::{VoiceBuilder, VoiceDocument, VoiceError};

/// Anything that can stop a refresh from producing a quote document
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Voice(#[from] VoiceError),
}

/// Which document a refresh ended up storing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fresh quote document
    Updated,
    /// The apology document
    Fallback,
}

/// Runs refreshes against one source and one store
#[derive(Debug)]
pub struct Refresher {
    rates: RatesClient,
    voice: VoiceBuilder,
    store: Arc<DocumentStore>,
}

impl Refresher {
    pub fn new(rates: RatesClient, voice: VoiceBuilder, store: Arc<DocumentStore>) -> Self {
        Self {
            rates,
            voice,
            store,
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// The apology document, for callers that need one without storing it
    pub fn fallback_document(&self) -> VoiceDocument {
        self.voice.failure()
    }

    /// Refreshes the stored document
    ///
    /// Always stores something: the quote document on success, the apology
    /// document on any failure.
    pub async fn refresh(&self) -> RefreshOutcome {
        debug!(source = self.rates.source_url(), "refreshing exchange rate");

        match self.build_document().await {
            Ok(document) => {
                self.store.set(document).await;
                info!("exchange rate updated");
                RefreshOutcome::Updated
            }
            Err(err) => {
                error!(error = %err, "error fetching exchange rate, serving apology");
                self.store.set(self.voice.failure()).await;
                RefreshOutcome::Fallback
            }
        }
    }

    async fn build_document(&self) -> Result<VoiceDocument, RefreshError> {
        let quote = self.rates.fetch_quote().await?;
        let spoken = normalize_timestamp(&quote.raw_timestamp)?;
        Ok(self.voice.success(&quote, &spoken)?)
    }
}

/// Configuration for background refreshes
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between background refreshes
    pub interval: Duration,
    /// Whether background refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(900), // 15 minutes
            enabled: false,
        }
    }
}

/// Handle for the background refresh task
pub struct RefreshHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the background refresh task if `config.enabled`
    ///
    /// The first tick is skipped; the startup refresh is spawned separately.
    pub fn spawn(refresher: Arc<Refresher>, config: RefreshConfig) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            let interval = config.interval;
            info!(interval_secs = interval.as_secs(), "background refresh enabled");

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // Skip the first tick (immediate)
                ticker.tick().await;

                loop {
                    // Shutdown wins over a tick that piled up during a slow refresh
                    tokio::select! {
                        biased;
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                        _ = ticker.tick() => {
                            refresher.refresh().await;
                        }
                    }
                }
            });
        }

        Self { shutdown_tx }
    }

    /// Stops the background refresh task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

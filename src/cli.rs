//! Command-line and environment configuration
//!
//! Every flag falls back to an environment variable (a `.env` file in the
//! working directory is loaded first), then to a built-in default. Only the
//! webhook URL has no default; it is warned about at startup but not required.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::rates::{
    DEFAULT_BUY_SELECTOR, DEFAULT_SELL_SELECTOR, DEFAULT_SOURCE_URL, DEFAULT_UPDATED_SELECTOR,
};
use crate::data::{ScrapeError, Selectors};
use crate::refresh::RefreshConfig;
use crate::voice::{VoiceSettings, DEFAULT_LANGUAGE, DEFAULT_VOICE};

/// Error types for configuration parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// One of the selector flags is not valid CSS
    #[error("Invalid selector: '{0}'")]
    InvalidSelector(String),

    /// The fetch timeout must be at least one second
    #[error("Invalid fetch timeout: must be at least 1 second")]
    InvalidTimeout,

    /// The listen address does not parse
    #[error("Invalid listen address: '{0}'")]
    InvalidAddress(String),
}

/// dolarblue - Blue-dollar exchange rate as an IVR voice response
#[derive(Parser, Debug)]
#[command(name = "dolarblue")]
#[command(about = "Serves the blue-dollar exchange rate as a voice-response document")]
#[command(version)]
pub struct Cli {
    /// Call-flow webhook the voice document redirects to
    #[arg(long, env = "TWILIO_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Page the quote is scraped from
    #[arg(long, env = "SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// CSS selector for the buy price
    #[arg(long, env = "BUY_SELECTOR", default_value = DEFAULT_BUY_SELECTOR)]
    pub buy_selector: String,

    /// CSS selector for the sell price
    #[arg(long, env = "SELL_SELECTOR", default_value = DEFAULT_SELL_SELECTOR)]
    pub sell_selector: String,

    /// CSS selector for the "last updated" label
    #[arg(long, env = "UPDATED_SELECTOR", default_value = DEFAULT_UPDATED_SELECTOR)]
    pub updated_selector: String,

    /// Seconds before a fetch of the source page is abandoned
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    /// Seconds between background refreshes; 0 disables them
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 0)]
    pub refresh_interval_secs: u64,

    /// Voice used to read the message
    #[arg(long, env = "SAY_VOICE", default_value = DEFAULT_VOICE)]
    pub voice: String,

    /// Language tag of the message
    #[arg(long, env = "SAY_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,
}

/// Validated configuration the service is started with
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds
    pub listen_addr: SocketAddr,
    /// Page the quote is scraped from
    pub source_url: String,
    /// Where each field lives in the page
    pub selectors: Selectors,
    /// Timeout for each fetch of the source page
    pub fetch_timeout: Duration,
    /// Background refresh schedule
    pub refresh: RefreshConfig,
    /// Voice and redirect settings for the documents
    pub voice: VoiceSettings,
}

impl ServiceConfig {
    /// Creates a ServiceConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(ServiceConfig)` with validated settings
    /// * `Err(CliError)` if a selector, the timeout, or the address is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let listen_addr = cli
            .host
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, cli.port))
            .map_err(|_| CliError::InvalidAddress(cli.host.clone()))?;

        let selectors = Selectors {
            buy: cli.buy_selector.clone(),
            sell: cli.sell_selector.clone(),
            updated: cli.updated_selector.clone(),
        };
        selectors.validate().map_err(|err| match err {
            ScrapeError::Selector(selector) => CliError::InvalidSelector(selector),
            other => CliError::InvalidSelector(other.to_string()),
        })?;

        if cli.fetch_timeout_secs == 0 {
            return Err(CliError::InvalidTimeout);
        }

        let refresh = RefreshConfig {
            interval: Duration::from_secs(cli.refresh_interval_secs.max(1)),
            enabled: cli.refresh_interval_secs > 0,
        };

        // An empty variable counts as unset
        let webhook_url = cli
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(ServiceConfig {
            listen_addr,
            source_url: cli.source_url.clone(),
            selectors,
            fetch_timeout: Duration::from_secs(cli.fetch_timeout_secs),
            refresh,
            voice: VoiceSettings {
                voice: cli.voice.clone(),
                language: cli.language.clone(),
                webhook_url,
            },
        })
    }
}

//! Exchange-rate scraper for dolarhoy.com
//!
//! Fetches the landing page and pulls the blue-dollar buy/sell figures and
//! the "last updated" stamp out of the markup with CSS selectors.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;

use super::ExchangeQuote;

/// Page the quote is scraped from
pub const DEFAULT_SOURCE_URL: &str = "https://dolarhoy.com/";

/// Default selector for the buy price
pub const DEFAULT_BUY_SELECTOR: &str = ".tile.is-child .compra .val";

/// Default selector for the sell price
pub const DEFAULT_SELL_SELECTOR: &str = ".tile.is-child .venta .val";

/// Default selector for the "last updated" label
pub const DEFAULT_UPDATED_SELECTOR: &str = ".tile.is-child .update span";

/// Label the site puts in front of the timestamp
const UPDATED_PREFIX: &str = "Actualizado por última vez:";

const USER_AGENT: &str = concat!("dolarblue/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when scraping the source page
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network failure, timeout, or non-success HTTP status
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// A configured selector is not valid CSS
    #[error("Invalid CSS selector: '{0}'")]
    Selector(String),

    /// A required field is missing or empty in the page
    #[error("Missing expected field in page: {0}")]
    Extraction(String),
}

/// CSS selectors locating each field in the source page
///
/// Kept as data so a layout change on the site only needs new flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub buy: String,
    pub sell: String,
    pub updated: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            buy: DEFAULT_BUY_SELECTOR.to_string(),
            sell: DEFAULT_SELL_SELECTOR.to_string(),
            updated: DEFAULT_UPDATED_SELECTOR.to_string(),
        }
    }
}

impl Selectors {
    /// Checks that every selector parses
    ///
    /// # Returns
    /// * `Ok(())` if all three selectors are valid CSS
    /// * `Err(ScrapeError::Selector)` naming the first one that is not
    pub fn validate(&self) -> Result<(), ScrapeError> {
        for selector in [&self.buy, &self.sell, &self.updated] {
            parse_selector(selector)?;
        }
        Ok(())
    }
}

/// Client for scraping the current quote from the source page
#[derive(Debug, Clone)]
pub struct RatesClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Page to scrape (allows override for testing)
    source_url: String,
    /// Where each field lives in the page
    selectors: Selectors,
}

impl RatesClient {
    /// Creates a RatesClient whose requests give up after `timeout`
    ///
    /// # Returns
    /// * `Err(reqwest::Error)` if the TLS backend cannot be initialized
    pub fn new(
        source_url: impl Into<String>,
        selectors: Selectors,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(http_client, source_url, selectors))
    }

    /// Creates a RatesClient with a custom HTTP client
    pub fn with_client(
        http_client: Client,
        source_url: impl Into<String>,
        selectors: Selectors,
    ) -> Self {
        Self {
            http_client,
            source_url: source_url.into(),
            selectors,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Fetches the source page and extracts the current quote
    ///
    /// # Returns
    /// * `Ok(ExchangeQuote)` - Prices and raw timestamp from the page
    /// * `Err(ScrapeError)` - If the request fails or the timestamp is missing
    pub async fn fetch_quote(&self) -> Result<ExchangeQuote, ScrapeError> {
        let html = self
            .http_client
            .get(&self.source_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_quote(&html, &self.selectors)
    }
}

/// Extracts a quote from the source page markup
///
/// Prices that are missing come back empty; only a missing timestamp is
/// fatal, since the IVR message cannot be dated without it.
pub fn extract_quote(html: &str, selectors: &Selectors) -> Result<ExchangeQuote, ScrapeError> {
    let document = Html::parse_document(html);

    let buy_price = first_text(&document, &selectors.buy)?
        .map(|text| clean_price(&text))
        .unwrap_or_default();
    let sell_price = first_text(&document, &selectors.sell)?
        .map(|text| clean_price(&text))
        .unwrap_or_default();
    let raw_timestamp = first_text(&document, &selectors.updated)?
        .map(|text| clean_timestamp(&text))
        .unwrap_or_default();

    if raw_timestamp.is_empty() {
        return Err(ScrapeError::Extraction(format!(
            "last update timestamp ({})",
            selectors.updated
        )));
    }

    Ok(ExchangeQuote {
        buy_price,
        sell_price,
        raw_timestamp,
        fetched_at: Utc::now(),
    })
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|_| ScrapeError::Selector(selector.to_string()))
}

/// Text content of the first element matching `selector`
fn first_text(document: &Html, selector: &str) -> Result<Option<String>, ScrapeError> {
    let selector = parse_selector(selector)?;
    Ok(document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>()))
}

/// Strips whitespace and the leading `$` from a price cell
fn clean_price(text: &str) -> String {
    text.trim().replacen('$', "", 1).trim().to_string()
}

/// Strips whitespace and the "last updated" label from the timestamp cell
fn clean_timestamp(text: &str) -> String {
    text.trim().replacen(UPDATED_PREFIX, "", 1).trim().to_string()
}

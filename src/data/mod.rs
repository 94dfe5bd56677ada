//! Core data models for the exchange-rate service
//!
//! This module holds the values that flow through a refresh: the quote scraped
//! from the source page and the spoken form of its "last updated" stamp.

pub mod date;
pub mod rates;

pub use date::{normalize_timestamp, DateError};
pub use rates::{RatesClient, ScrapeError, Selectors};

use std::fmt;

use chrono::{DateTime, Utc};

/// Buy/sell figures scraped from the source page
///
/// Prices stay as text: the IVR reads them back exactly as the site prints
/// them, so no decimal parsing happens anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeQuote {
    /// Price the exchange pays for one dollar, without the currency symbol
    pub buy_price: String,
    /// Price the exchange charges for one dollar, without the currency symbol
    pub sell_price: String,
    /// Timestamp exactly as the site prints it (e.g. `15/03/24 10:30 AM`)
    pub raw_timestamp: String,
    /// When this quote was scraped
    pub fetched_at: DateTime<Utc>,
}

/// A day and month rendered as a Spanish phrase, e.g. "15 de marzo"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenTimestamp(String);

impl SpokenTimestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SpokenTimestamp {
    fn from(phrase: String) -> Self {
        Self(phrase)
    }
}

impl fmt::Display for SpokenTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

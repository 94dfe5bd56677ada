//! dolarblue library
//!
//! Scrapes the blue-dollar exchange rate and serves it as a voice-response
//! document for an IVR call flow. The binary only wires these modules
//! together; integration tests drive them directly.

pub mod cache;
pub mod cli;
pub mod data;
pub mod refresh;
pub mod server;
pub mod voice;

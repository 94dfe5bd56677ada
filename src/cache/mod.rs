//! In-memory cache for the served voice document
//!
//! The service keeps exactly one document: the result of the most recent
//! refresh. There is no expiry; a refresh always replaces the whole document.

mod store;

pub use store::DocumentStore;

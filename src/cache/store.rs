//! Single-slot document store shared by the HTTP handlers

use tokio::sync::RwLock;

use crate::voice::VoiceDocument;

/// Holds the most recently built voice document
///
/// Empty until the first refresh finishes. Writes replace the whole document,
/// so readers only ever see a complete one. Shared between handlers through
/// an `Arc`.
#[derive(Debug, Default)]
pub struct DocumentStore {
    current: RwLock<Option<VoiceDocument>>,
}

impl DocumentStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored document
    pub async fn set(&self, document: VoiceDocument) {
        *self.current.write().await = Some(document);
    }

    /// Returns the stored document, or `None` before the first refresh
    pub async fn get(&self) -> Option<VoiceDocument> {
        self.current.read().await.clone()
    }
}

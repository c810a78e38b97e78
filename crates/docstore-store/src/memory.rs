use std::collections::HashMap;

use async_trait::async_trait;
use docstore_types::{Document, TextKey};
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::StoreBackend;

/// In-memory, HashMap-based table.
///
/// Generated keys are decimal sequence numbers starting at `0`. The counter
/// lives in the backend, so it resets with the process and is never shared.
/// Updates may claim arbitrary keys, including numbers the counter has not
/// reached yet; the generator steps over those.
pub struct InMemoryBackend {
    documents: HashMap<TextKey, Document>,
    next_seq: u64,
}

impl InMemoryBackend {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreBackend for InMemoryBackend {
    type Key = TextKey;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn generate_key(&mut self) -> TextKey {
        loop {
            let key = TextKey::from_sequence(self.next_seq);
            self.next_seq += 1;
            if !self.documents.contains_key(&key) {
                return key;
            }
            debug!(%key, "sequence key already taken, skipping");
        }
    }

    async fn insert(&mut self, key: &TextKey, document: &Document) -> StoreResult<()> {
        self.documents.insert(key.clone(), document.clone());
        Ok(())
    }

    async fn replace(&mut self, key: &TextKey, document: &Document) -> StoreResult<()> {
        self.documents.insert(key.clone(), document.clone());
        Ok(())
    }

    async fn fetch(&mut self, key: &TextKey) -> StoreResult<Option<Document>> {
        Ok(self.documents.get(key).cloned())
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("document_count", &self.len())
            .field("next_seq", &self.next_seq)
            .finish()
    }
}

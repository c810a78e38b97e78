use async_trait::async_trait;
use docstore_types::{Document, DocumentKey};

use crate::error::StoreResult;

/// The table behind the store actor.
///
/// Methods take `&mut self`: a backend has a single owner which applies one
/// operation to completion before starting the next. Implementations must
/// satisfy:
/// - `generate_key` never returns a key that currently names a document.
/// - `insert` and `replace` store the document exactly as given; stamping the
///   `id` field is the caller's job.
/// - `replace` creates the document when the key is absent (upsert).
/// - `fetch` returns `Ok(None)` for an absent key.
#[async_trait]
pub trait StoreBackend: Send + 'static {
    /// Native key form of this backend.
    type Key: DocumentKey;

    /// Short backend name for logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Produce a fresh, unused key for an insert.
    fn generate_key(&mut self) -> Self::Key;

    /// Store a new document under a freshly generated key.
    async fn insert(&mut self, key: &Self::Key, document: &Document) -> StoreResult<()>;

    /// Store a document, replacing whatever was at `key`.
    async fn replace(&mut self, key: &Self::Key, document: &Document) -> StoreResult<()>;

    /// Look up a document.
    async fn fetch(&mut self, key: &Self::Key) -> StoreResult<Option<Document>>;
}

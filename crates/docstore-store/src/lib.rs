//! Storage backends for docstore.
//!
//! A backend is the table behind the store actor. It is owned by exactly one
//! actor task and only ever borrowed mutably from there, so implementations
//! hold plain state with no locking.
//!
//! # Storage Backends
//!
//! All backends implement the [`StoreBackend`] trait:
//!
//! - [`InMemoryBackend`] -- `HashMap`-based table with a sequence key generator
//! - [`MongoBackend`] -- one MongoDB collection, keyed by [`ObjectKey`]
//!
//! # Design Rules
//!
//! 1. The backend never interprets document contents beyond the `id` field.
//! 2. A write replaces the whole document; there is no merge.
//! 3. A missing document is `Ok(None)`, never an error.
//! 4. Transport and driver failures are propagated as [`StoreError`], never
//!    silently turned into empty results.

pub mod error;
pub mod memory;
pub mod mongo;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBackend;
pub use mongo::{MongoBackend, ObjectKey};
pub use traits::StoreBackend;

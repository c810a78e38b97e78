//! Foundation types for docstore.
//!
//! Every other docstore crate depends on `docstore-types`. It carries no
//! runtime, no storage and no transport: only the values that flow between
//! the HTTP gateway, the store actor and the storage backends.
//!
//! # Key Types
//!
//! - [`Document`]: JSON object stored under a key, carrying a derived `id` field
//! - [`DocumentKey`]: capability every backend key type implements
//! - [`TextKey`]: free-form string key used by the in-memory backend

pub mod document;
pub mod error;
pub mod key;

pub use document::Document;
pub use error::TypeError;
pub use key::{parse_key, DocumentKey, TextKey};

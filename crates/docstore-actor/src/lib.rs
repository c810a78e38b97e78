//! Single-writer store actor for docstore.
//!
//! One tokio task owns the storage backend and applies commands one at a
//! time, in the order its inbound queue yields them. Callers never touch the
//! table: they send a [`Command`] carrying a one-shot reply channel and wait
//! on it through a [`StoreHandle`]. That total order is the only
//! concurrency control the table has.
//!
//! # Key Types
//!
//! - [`Operation`]: the closed set of requests
//! - [`Command`]: an operation plus its reply channel
//! - [`StoreActor`]: the command loop
//! - [`StoreHandle`]: cloneable sender with a bounded reply wait

pub mod actor;
pub mod command;
pub mod error;
pub mod handle;

pub use actor::{ActorConfig, ActorStats, StoreActor};
pub use command::{Command, Intent, Operation, OperationKind, Reply};
pub use error::{ActorError, ActorResult};
pub use handle::StoreHandle;

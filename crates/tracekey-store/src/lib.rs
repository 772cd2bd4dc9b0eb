//! Tracekey Store
//!
//! Durable [`SessionStore`] backends for devices that keep their session
//! across restarts:
//!
//! - [`FileStore`]: one file per key in a directory, replaced atomically
//! - [`RedbStore`]: a single redb database with ACID transactions
//! - [`ChaoticStore`]: fault-injection wrapper for chaos tests
//!
//! All backends are synchronous and `Clone`; clones share the same
//! underlying storage.
//!
//! [`SessionStore`]: tracekey_core::SessionStore

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chaotic;
mod file;
mod redb;

pub use chaotic::ChaoticStore;
pub use file::FileStore;
pub use self::redb::RedbStore;
pub use tracekey_core::{MemoryStore, SessionStore, StorageError};

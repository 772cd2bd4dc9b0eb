#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use zeroize::Zeroizing;

use super::{SessionStore, StorageError, validate_key};

/// In-memory store for tests, simulation, and embedders with their own
/// persistence.
///
/// All state is wrapped in Arc<Mutex<>> to allow Clone and concurrent access;
/// clones share the same map. Stored buffers are zeroized when replaced,
/// removed, or when the last clone is dropped. A poisoned lock is reported as
/// [`StorageError::Io`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Zeroizing<Vec<u8>>>>>,
}

impl MemoryStore {
    /// Create a new empty `MemoryStore`
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored buffers.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.len())
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Zeroizing<Vec<u8>>>>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Io("memory store lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Zeroizing<Vec<u8>>>, StorageError> {
        validate_key(key)?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        self.lock()?.insert(key.to_string(), Zeroizing::new(bytes.to_vec()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.lock()?.remove(key);
        Ok(())
    }
}

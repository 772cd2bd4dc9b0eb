//! Redb-backed durable session store.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety: a
//! `store` either commits the whole buffer or leaves the previous one intact.

use std::{path::Path, sync::Arc};

use redb::{Database, TableDefinition};
use tracekey_core::{SessionStore, StorageError, storage::validate_key};
use zeroize::Zeroizing;

/// Table: sessions
/// Key: storage key (UTF-8, validated)
/// Value: encoded session bytes
const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Durable session store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates the `sessions` table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(SESSIONS).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), "Opened redb session store");
        Ok(Self { db: Arc::new(db) })
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl SessionStore for RedbStore {
    fn load(&self, key: &str) -> Result<Option<Zeroizing<Vec<u8>>>, StorageError> {
        validate_key(key)?;

        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(SESSIONS).map_err(|e| StorageError::Io(e.to_string()))?;

        let value = table.get(key).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(value.map(|guard| Zeroizing::new(guard.value().to_vec())))
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;

        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table =
                txn.open_table(SESSIONS).map_err(|e| StorageError::Io(e.to_string()))?;
            table.insert(key, bytes).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table =
                txn.open_table(SESSIONS).map_err(|e| StorageError::Io(e.to_string()))?;
            table.remove(key).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_store_then_load() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        store.store("device", b"session bytes").unwrap();

        assert_eq!(store.load("device").unwrap().unwrap().as_slice(), b"session bytes");
    }

    #[test]
    fn test_missing_key_loads_none() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        assert!(store.load("device").unwrap().is_none());
    }

    #[test]
    fn test_overwrite() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        store.store("device", b"first").unwrap();
        store.store("device", b"second").unwrap();

        assert_eq!(store.load("device").unwrap().unwrap().as_slice(), b"second");
    }

    #[test]
    fn test_keys_are_independent() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        store.store("alice", b"a").unwrap();
        store.store("bob", b"b").unwrap();
        store.remove("alice").unwrap();

        assert!(store.load("alice").unwrap().is_none());
        assert_eq!(store.load("bob").unwrap().unwrap().as_slice(), b"b");
    }

    #[test]
    fn test_remove_missing_key() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        store.remove("device").unwrap();
    }

    #[test]
    fn test_rejects_invalid_key() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        assert!(matches!(store.store("a/b", b"x"), Err(StorageError::InvalidKey(_))));
    }
}

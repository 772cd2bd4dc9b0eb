//! Storage abstraction for persisted sessions
//!
//! The session engine never touches the filesystem. Callers inject a
//! [`SessionStore`] that moves opaque byte buffers in and out of whatever
//! backend the deployment uses. The trait is synchronous (no async) to match
//! the synchronous engine.
//!
//! This crate ships [`MemoryStore`]; durable backends live in
//! `tracekey-store`.

mod error;
mod memory;

pub use error::StorageError;
pub use memory::MemoryStore;
use zeroize::Zeroizing;

/// Longest accepted storage key
pub const MAX_KEY_LEN: usize = 64;

/// Byte-buffer store for persisted sessions
///
/// Must be Clone (can be shared by several owners), Send + Sync
/// (thread-safe), and synchronous. Implementations typically share internal
/// state via Arc, so clones access the same underlying storage.
///
/// Buffers hold secret material: loads return [`Zeroizing`] buffers so the
/// caller's copy is wiped on drop.
pub trait SessionStore: Clone + Send + Sync + 'static {
    /// Load the buffer stored under `key`.
    ///
    /// Returns `None` if nothing is stored under `key`.
    fn load(&self, key: &str) -> Result<Option<Zeroizing<Vec<u8>>>, StorageError>;

    /// Store `bytes` under `key`, replacing any previous buffer.
    ///
    /// # Invariants
    ///
    /// - Post: a subsequent `load(key)` returns exactly `bytes`, or the whole
    ///   call failed and the previous buffer is intact
    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove the buffer stored under `key`.
    ///
    /// Idempotent: removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Check a storage key: 1 to [`MAX_KEY_LEN`] characters of `[A-Za-z0-9_-]`.
///
/// Backends that map keys to file names or table keys call this before
/// touching the backend, so a key can never escape its namespace.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey(format!(
            "key length must be 1..={MAX_KEY_LEN}, got {}",
            key.len()
        )));
    }

    if let Some(bad) = key.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(StorageError::InvalidKey(format!("key contains {bad:?}")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_keys() {
        for key in ["default", "device-1", "user_42", "A", &"k".repeat(MAX_KEY_LEN)] {
            assert!(validate_key(key).is_ok(), "{key} should be accepted");
        }
    }

    #[test]
    fn rejects_empty_and_long_keys() {
        assert!(matches!(validate_key(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(
            validate_key(&"k".repeat(MAX_KEY_LEN + 1)),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn rejects_path_like_keys() {
        for key in ["../etc", "a/b", "a\\b", "a.b", "with space", "nul\0"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "{key:?} should be rejected"
            );
        }
    }
}

//! Storage error types.

use thiserror::Error;

/// Errors from a [`super::SessionStore`] backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Backend I/O failed.
    ///
    /// May be transient (disk full, lock contention) or permanent
    /// (permissions, corruption). Retry policy belongs to the caller.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// Key is not acceptable to the backend.
    ///
    /// Caller bug; retrying with the same key fails the same way.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StorageError::Io("disk full".to_string());
        assert_eq!(err.to_string(), "storage I/O error: disk full");

        let err = StorageError::InvalidKey("key contains '/'".to_string());
        assert_eq!(err.to_string(), "invalid storage key: key contains '/'");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(StorageError::from(io), StorageError::Io("denied".to_string()));
    }
}

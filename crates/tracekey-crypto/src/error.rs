//! Error types for primitive operations

use thiserror::Error;

/// Errors from building primitive values out of untrusted input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid key material length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length
        expected: usize,
        /// Actual key length
        actual: usize,
    },

    /// Invalid identifier length
    #[error("invalid identifier length: expected {expected}, got {actual}")]
    InvalidIdentifierLength {
        /// Expected identifier length
        expected: usize,
        /// Actual identifier length
        actual: usize,
    },
}

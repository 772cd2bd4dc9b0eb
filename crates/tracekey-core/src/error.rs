//! Session error types.
//!
//! One enum for everything a caller of the session API can observe:
//! - Root generation (random source)
//! - Day transitions (time moving backwards)
//! - Restoring persisted state (malformed bytes, storage failures)

use thiserror::Error;
use tracekey_crypto::DayIndex;

use crate::{codec::FormatError, env::EntropyError, storage::StorageError};

/// Errors that can occur during session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// The random source could not provide a root secret.
    ///
    /// Fatal: no session can be created without secure randomness.
    #[error(transparent)]
    RandomSourceUnavailable(#[from] EntropyError),

    /// Requested day precedes the session's current day.
    ///
    /// Caller bug: time may not move backwards. The session is unchanged.
    #[error("invalid transition: session is at day {current}, requested day {requested}")]
    InvalidTransition {
        /// Day the session is at
        current: DayIndex,
        /// Day that was requested
        requested: DayIndex,
    },

    /// Persisted session bytes were rejected by the codec.
    ///
    /// Recoverable: the caller falls back to creating a fresh session.
    #[error("persisted session rejected: {0}")]
    Format(#[from] FormatError),

    /// Storage collaborator failed.
    ///
    /// Propagated unchanged; retry policy belongs to the caller.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Returns true if this error is fatal (unrecoverable)
    ///
    /// Fatal errors mean the engine cannot operate or the caller has a bug.
    /// Everything else may succeed after a fallback or a retry.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::RandomSourceUnavailable(_) => true,
            Self::InvalidTransition { .. } => true,

            Self::Format(_) => false,
            Self::Storage(_) => false,
        }
    }

    /// Returns true if the documented fallback applies: discard the persisted
    /// state and create a fresh session.
    pub fn is_recoverable_by_fresh_session(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

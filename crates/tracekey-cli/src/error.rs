//! CLI error types.

use thiserror::Error;
use tracekey_core::{ConfigError, SessionError, StorageError};

/// Errors surfaced by a subcommand
#[derive(Debug, Error)]
pub enum CliError {
    /// Session engine failed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Backend could not be opened
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid schedule configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Disclosed secret is not 32 hex-encoded bytes
    #[error("invalid day secret: {0}")]
    InvalidSecret(String),

    /// More identifiers requested than any schedule publishes in a day
    #[error("cannot print {count} identifiers; at most {max} per day")]
    CountTooLarge {
        /// Requested count
        count: u32,
        /// Largest accepted count
        max: u32,
    },

    /// No session is stored under the requested name
    #[error("no session named {name:?}; run `tracekey init` first")]
    NoSession {
        /// Session name
        name: String,
    },

    /// `init` would overwrite an existing session
    #[error("session {name:?} already exists; pass --force to replace it")]
    SessionExists {
        /// Session name
        name: String,
    },

    /// Writing output failed
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

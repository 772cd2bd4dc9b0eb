//! Tracekey Cryptographic Primitives
//!
//! Stateless building blocks for tracekey. Pure functions with deterministic
//! outputs. Callers provide the secret material; nothing here touches a
//! random source, a clock, or storage.
//!
//! # Key Lifecycle
//!
//! A device holds one secret per day. The first secret is drawn from a
//! secure random source; every later secret is the one-way ratchet of the
//! previous day's. From each day secret a broadcast key is derived, and the
//! broadcast key yields one short identifier per broadcast period.
//!
//! ```text
//! Root Secret (random, day d)
//!        │
//!        ▼ SHA-256
//! Day Secret (day d+1) ──▶ SHA-256 ──▶ Day Secret (day d+2) ──▶ ...
//!        │
//!        ▼ HMAC-SHA256("Broadcast key")
//! Broadcast Key
//!        │
//!        ▼ AES-256([0; 12] || period_be)
//! Identifier[period] (16 bytes)
//! ```
//!
//! # Security
//!
//! Forward Secrecy:
//! - The ratchet is a hash; a day secret reveals later days, never earlier
//! - Replaced day secrets are zeroized when dropped
//!
//! Unlinkability:
//! - Identifiers of one day are PRF outputs under a key only the owner holds
//! - Publishing a day secret links that day's identifiers and nothing before
//!
//! Side Channels:
//! - HMAC-SHA256, SHA-256 and AES-256 (hardware or fixsliced) run in time
//!   independent of key content
//! - [`DaySecret`] equality folds over every byte without early exit

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod identifier;
mod ratchet;
mod types;

pub use error::CryptoError;
pub use identifier::{BroadcastKey, derive_identifier, derive_identifiers};
pub use ratchet::{ratchet, ratchet_by};
pub use types::{
    DEFAULT_PERIODS_PER_DAY, DayIndex, DaySecret, IDENTIFIER_LEN, Identifier,
    JULIAN_DAY_UNIX_EPOCH, SECONDS_PER_DAY, SECRET_LEN,
};

//! Tracekey Core
//!
//! The day-key engine of a decentralized proximity-tracing scheme: a
//! [`Session`] owns the rotating per-day secret and produces the day's
//! broadcast identifiers; the persistence codec turns a session into bytes and
//! back; a [`Replay`] regenerates one day's identifiers from a disclosed
//! [`DayKey`] so a caller can compare them with what it observed.
//!
//! # Architecture
//!
//! ```text
//!   Environment ──(random root, today)──▶ Session ──identifiers()──▶ broadcast
//!                                            │
//!                 SessionStore ◀──bytes──────┤ to_bytes() / restore()
//!                                            │
//!                                     export_day_key()
//!                                            │
//!                                            ▼
//!   observed ids ◀──compare── Replay ◀── DayKey (published)
//! ```
//!
//! Nothing in this crate performs I/O. Randomness and the calendar come from
//! an [`Environment`]; persistence goes through a caller-supplied
//! [`SessionStore`].
//!
//! # Invariants
//!
//! - A session's day index never decreases
//! - Moving a session forward `n` days costs exactly `n` ratchet steps
//! - A disclosed key never re-enters a session's chain
//! - Secret bytes are zeroized when their owner is dropped

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod config;
pub mod env;
pub mod error;
pub mod persist;
pub mod replay;
pub mod session;
pub mod storage;
pub mod window;

pub use codec::{FormatError, SESSION_FORMAT, SESSION_FORMAT_VERSION};
pub use config::{ConfigError, MAX_PERIODS_PER_DAY, ScheduleConfig};
pub use env::{EntropyError, Environment, SeededEnv, SystemEnv};
pub use error::SessionError;
pub use persist::{restore_or_create, restore_session, save_session};
pub use replay::Replay;
pub use session::{DayKey, Session};
pub use storage::{MemoryStore, SessionStore, StorageError};
pub use tracekey_crypto::{DayIndex, DaySecret, Identifier};
pub use window::{DEFAULT_DISCLOSURE_DAYS, ReplayWindow};

//! Persistence codec for session state.
//!
//! A session's recoverable state is its day index and its current day
//! secret. The encoding is a CBOR map:
//!
//! ```text
//! {
//!   "format":  "tracekey-session",
//!   "version": 1,
//!   "day":     u32 (Julian day number),
//!   "secret":  [u8; 32],
//! }
//! ```
//!
//! Decoding is strict: unknown fields, a foreign format tag, another version,
//! a secret of the wrong length, or bytes after the record are all rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracekey_crypto::{DayIndex, DaySecret, SECRET_LEN};
use zeroize::{Zeroize, Zeroizing};

/// Format tag written into every persisted session
pub const SESSION_FORMAT: &str = "tracekey-session";

/// Current persisted session version
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Encoded records are ~120 bytes; reserving up front keeps the buffer from
/// reallocating and leaving partial copies of the secret behind.
const ENCODED_CAPACITY: usize = 192;

/// Persisted session bytes could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input ended before a complete record was read
    #[error("truncated session record")]
    Truncated,

    /// Input is not a well-formed session record
    #[error("malformed session record: {reason}")]
    Malformed {
        /// Decoder diagnostic
        reason: String,
    },

    /// Record carries another format tag
    #[error("foreign record format: {found:?}")]
    ForeignFormat {
        /// Format tag found in the record
        found: String,
    },

    /// Record version is not supported by this build
    #[error("unsupported session version: found {found}, supported {supported}")]
    UnsupportedVersion {
        /// Version found in the record
        found: u32,
        /// Version this build reads
        supported: u32,
    },

    /// Bytes remain after the record
    #[error("{count} trailing bytes after session record")]
    TrailingBytes {
        /// Number of unread bytes
        count: usize,
    },
}

impl FormatError {
    fn from_cbor(err: ciborium::de::Error<std::io::Error>) -> Self {
        match err {
            ciborium::de::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                Self::Truncated
            },
            other => Self::Malformed { reason: other.to_string() },
        }
    }
}

/// Borrowed view used for encoding, so the secret is not copied.
#[derive(Serialize)]
struct SessionRecordRef<'a> {
    format: &'a str,
    version: u32,
    day: u32,
    secret: &'a [u8; SECRET_LEN],
}

/// Owned record produced by decoding. Zeroizes its secret copy on drop.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionRecord {
    format: String,
    version: u32,
    day: u32,
    secret: [u8; SECRET_LEN],
}

impl Drop for SessionRecord {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// Encode session state.
///
/// The returned buffer holds secret material and is zeroized on drop.
pub fn encode(day: DayIndex, secret: &DaySecret) -> Zeroizing<Vec<u8>> {
    let record = SessionRecordRef {
        format: SESSION_FORMAT,
        version: SESSION_FORMAT_VERSION,
        day: day.value(),
        secret: secret.as_bytes(),
    };

    let mut bytes = Zeroizing::new(Vec::with_capacity(ENCODED_CAPACITY));
    let Ok(()) = ciborium::into_writer(&record, &mut *bytes) else {
        unreachable!("CBOR encoding of a fixed record into a Vec cannot fail");
    };
    bytes
}

/// Decode session state.
///
/// # Errors
///
/// - `Truncated`: empty input or input ends mid-record
/// - `Malformed`: not CBOR, wrong shape, unknown fields, wrong secret length
/// - `ForeignFormat`: format tag is not [`SESSION_FORMAT`]
/// - `UnsupportedVersion`: version is not [`SESSION_FORMAT_VERSION`]
/// - `TrailingBytes`: input continues after the record
pub fn decode(bytes: &[u8]) -> Result<(DayIndex, DaySecret), FormatError> {
    if bytes.is_empty() {
        return Err(FormatError::Truncated);
    }

    let mut remaining = bytes;
    let record: SessionRecord =
        ciborium::from_reader(&mut remaining).map_err(FormatError::from_cbor)?;

    if !remaining.is_empty() {
        return Err(FormatError::TrailingBytes { count: remaining.len() });
    }

    if record.format != SESSION_FORMAT {
        return Err(FormatError::ForeignFormat { found: record.format.clone() });
    }

    if record.version != SESSION_FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: record.version,
            supported: SESSION_FORMAT_VERSION,
        });
    }

    Ok((DayIndex::new(record.day), DaySecret::from_bytes(record.secret)))
}

//! Value types shared by the ratchet and the identifier PRF.

use std::fmt;

use zeroize::Zeroize;

use crate::error::CryptoError;

/// Length of a day secret in bytes
pub const SECRET_LEN: usize = 32;

/// Length of a broadcast identifier in bytes
pub const IDENTIFIER_LEN: usize = 16;

/// Broadcast periods per day: one identifier per 15 minutes
pub const DEFAULT_PERIODS_PER_DAY: u32 = 96;

/// Julian day number of 1970-01-01
pub const JULIAN_DAY_UNIX_EPOCH: u32 = 2_440_587;

/// Seconds in one day
pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Secret material for exactly one day.
///
/// Produced either from a secure random source (chain root) or by
/// [`crate::ratchet`] of the previous day's secret. The bytes are zeroized
/// when the value is dropped. Not `Copy`: every duplicate is an explicit
/// [`Clone`], and every duplicate is zeroized on its own drop.
#[derive(Clone)]
pub struct DaySecret {
    bytes: [u8; SECRET_LEN],
}

impl DaySecret {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self { bytes }
    }

    /// Copy secret bytes out of an untrusted slice.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength`: slice is not exactly [`SECRET_LEN`] bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let Ok(bytes) = <[u8; SECRET_LEN]>::try_from(bytes) else {
            return Err(CryptoError::InvalidKeyLength {
                expected: SECRET_LEN,
                actual: bytes.len(),
            });
        };
        Ok(Self { bytes })
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.bytes
    }
}

impl PartialEq for DaySecret {
    /// Constant time: every byte is visited regardless of earlier mismatches.
    fn eq(&self, other: &Self) -> bool {
        let diff = self.bytes.iter().zip(other.bytes.iter()).fold(0u8, |acc, (a, b)| acc | (a ^ b));
        diff == 0
    }
}

impl Eq for DaySecret {}

impl fmt::Debug for DaySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DaySecret(<redacted>)")
    }
}

impl Drop for DaySecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Day counter, as a Julian day number.
///
/// Ordered: a session's day index never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayIndex(u32);

impl DayIndex {
    /// Day index from a raw Julian day number.
    pub const fn new(julian_day: u32) -> Self {
        Self(julian_day)
    }

    /// Raw Julian day number.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Day containing the given Unix timestamp (UTC).
    ///
    /// Saturates at `u32::MAX` for timestamps far beyond any real clock.
    pub fn from_unix_secs(secs: u64) -> Self {
        let julian = secs / SECONDS_PER_DAY + u64::from(JULIAN_DAY_UNIX_EPOCH);
        Self(u32::try_from(julian).unwrap_or(u32::MAX))
    }

    /// The following day, or `None` at the end of the representable range.
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    /// Day `days` after this one, or `None` on overflow.
    pub fn checked_add(self, days: u32) -> Option<Self> {
        self.0.checked_add(days).map(Self)
    }

    /// Number of days from `earlier` to `self`, or `None` if `earlier` is
    /// later than `self`.
    pub fn days_since(self, earlier: Self) -> Option<u32> {
        self.0.checked_sub(earlier.0)
    }
}

impl From<u32> for DayIndex {
    fn from(julian_day: u32) -> Self {
        Self(julian_day)
    }
}

impl fmt::Display for DayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short broadcast identifier for one period of one day.
///
/// Public value: it is what a device broadcasts and what observers record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier([u8; IDENTIFIER_LEN]);

impl Identifier {
    /// Wrap raw identifier bytes.
    pub const fn from_bytes(bytes: [u8; IDENTIFIER_LEN]) -> Self {
        Self(bytes)
    }

    /// Copy identifier bytes out of an untrusted slice (e.g. a radio frame).
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifierLength`: slice is not exactly [`IDENTIFIER_LEN`]
    ///   bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        <[u8; IDENTIFIER_LEN]>::try_from(bytes).map(Self).map_err(|_| {
            CryptoError::InvalidIdentifierLength { expected: IDENTIFIER_LEN, actual: bytes.len() }
        })
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", hex::encode(self.0))
    }
}

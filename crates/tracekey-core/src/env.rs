//! Environment abstraction for deterministic testing.
//!
//! Decouples the session engine from system resources (clock, randomness).
//! Production code uses [`SystemEnv`]; tests and benchmarks use
//! [`SeededEnv`], whose clock is set by hand and whose RNG is seeded.

#![allow(clippy::disallowed_types, reason = "Locking seeded RNG state")]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracekey_crypto::{DayIndex, JULIAN_DAY_UNIX_EPOCH, SECONDS_PER_DAY};

/// The random source failed to produce bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("random source unavailable: {reason}")]
pub struct EntropyError {
    /// Why the source failed
    pub reason: String,
}

impl EntropyError {
    /// Entropy failure with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Abstract environment providing the calendar and secure randomness.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - `random_bytes()` either fills the whole buffer or fails; it never
///   reports success on a partially filled or zeroed buffer
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError>;

    /// Wall-clock time as seconds since the Unix epoch (UTC).
    fn wall_clock_secs(&self) -> u64;

    /// Current day as a Julian day number.
    fn today(&self) -> DayIndex {
        DayIndex::from_unix_secs(self.wall_clock_secs())
    }
}

/// Production environment using the OS RNG and the system clock.
///
/// # Security
///
/// The RNG uses getrandom which provides OS-level cryptographic randomness
/// (e.g., /dev/urandom on Linux, `BCryptGenRandom` on Windows). Failures are
/// reported as [`EntropyError`] rather than replaced by a fallback source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(buffer).map_err(|e| EntropyError::new(e.to_string()))
    }

    #[allow(clippy::disallowed_methods)]
    #[allow(clippy::expect_used)]
    fn wall_clock_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("invariant: system clock is after Unix epoch (1970-01-01)")
            .as_secs()
    }
}

/// Deterministic environment: seeded `ChaCha20` RNG and a manual clock.
///
/// Clones share the RNG stream and the clock, so a clone handed to a
/// component observes the same time the test sets.
///
/// Not for production: the seed is the whole secret.
#[derive(Clone)]
pub struct SeededEnv {
    rng: Arc<Mutex<ChaCha20Rng>>,
    clock_secs: Arc<AtomicU64>,
}

impl SeededEnv {
    /// Environment with the given RNG seed and the clock at the Unix epoch.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
            clock_secs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Set the clock to midnight (UTC) of `day`.
    ///
    /// Days before the Unix epoch clamp to the epoch.
    pub fn set_day(&self, day: DayIndex) {
        let days = u64::from(day.value().saturating_sub(JULIAN_DAY_UNIX_EPOCH));
        self.set_clock_secs(days * SECONDS_PER_DAY);
    }

    /// Builder form of [`Self::set_day`].
    #[must_use]
    pub fn at_day(self, day: DayIndex) -> Self {
        self.set_day(day);
        self
    }

    /// Set the clock to an exact Unix timestamp.
    pub fn set_clock_secs(&self, secs: u64) {
        self.clock_secs.store(secs, Ordering::SeqCst);
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&self, days: u32) {
        let delta = u64::from(days) * SECONDS_PER_DAY;
        self.clock_secs.fetch_add(delta, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for SeededEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededEnv")
            .field("clock_secs", &self.clock_secs.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Environment for SeededEnv {
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        let mut rng = self.rng.lock().map_err(|_| EntropyError::new("seeded RNG lock poisoned"))?;
        rng.fill_bytes(buffer);
        Ok(())
    }

    fn wall_clock_secs(&self) -> u64 {
        self.clock_secs.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1).unwrap();
        env.random_bytes(&mut bytes2).unwrap();

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_env_today_is_after_2020() {
        // 2020-01-01 under the Unix-epoch Julian convention
        assert!(SystemEnv::new().today() > DayIndex::new(2_458_849));
    }

    #[test]
    fn seeded_env_is_reproducible() {
        let env1 = SeededEnv::with_seed(42);
        let env2 = SeededEnv::with_seed(42);

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        env1.random_bytes(&mut a).unwrap();
        env2.random_bytes(&mut b).unwrap();

        assert_eq!(a, b, "same seed must produce same bytes");
    }

    #[test]
    fn seeded_env_stream_advances() {
        let env = SeededEnv::with_seed(7);

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        env.random_bytes(&mut a).unwrap();
        env.random_bytes(&mut b).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn seeded_env_clones_share_clock() {
        let env = SeededEnv::with_seed(0).at_day(DayIndex::new(2_460_000));
        let clone = env.clone();

        env.advance_days(3);

        assert_eq!(clone.today(), DayIndex::new(2_460_003));
    }

    #[test]
    fn seeded_env_set_day_is_midnight() {
        let env = SeededEnv::with_seed(0);
        env.set_day(DayIndex::new(JULIAN_DAY_UNIX_EPOCH + 10));

        assert_eq!(env.wall_clock_secs(), 10 * SECONDS_PER_DAY);
        assert_eq!(env.today(), DayIndex::new(JULIAN_DAY_UNIX_EPOCH + 10));
    }

    #[test]
    fn seeded_env_clamps_days_before_epoch() {
        let env = SeededEnv::with_seed(0).at_day(DayIndex::new(100));
        assert_eq!(env.wall_clock_secs(), 0);
    }
}

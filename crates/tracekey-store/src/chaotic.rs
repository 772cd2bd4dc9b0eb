//! Chaotic store wrapper for fault injection testing
//!
//! Store wrapper that randomly fails operations to test error handling and
//! recovery. Used for chaos testing to ensure session persistence handles
//! storage failures gracefully.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use tracekey_core::{SessionStore, StorageError};
use zeroize::Zeroizing;

/// Chaotic store wrapper that randomly injects failures
///
/// Delegates to an underlying store but fails operations based on a
/// configured failure rate. A failed operation never reaches the inner store,
/// so injected failures cannot leave partial writes behind. Uses
/// Arc<Mutex<>> for the RNG state, making it Clone and thread-safe.
#[derive(Clone)]
pub struct ChaoticStore<S: SessionStore> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    /// Operations attempted, failed or not
    operation_count: Arc<AtomicUsize>,
}

/// Simple deterministic RNG for chaos injection
///
/// Uses linear congruential generator (LCG) for fast, deterministic randomness.
/// This ensures chaos tests are reproducible with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate next random value [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // LCG constants from Numerical Recipes
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }

    /// Check if we should fail (returns true with probability = `failure_rate`)
    fn should_fail(&mut self, failure_rate: f64) -> bool {
        self.next() < failure_rate
    }
}

impl<S: SessionStore> ChaoticStore<S> {
    /// Create a new chaotic store wrapper
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Create with explicit seed for reproducible chaos
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operation_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying store (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of store operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operation_count.load(Ordering::SeqCst)
    }

    /// Count the operation and decide whether to fail it.
    fn inject(&self, operation: &'static str, key: &str) -> Result<(), StorageError> {
        self.operation_count.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .rng
            .lock()
            .map_err(|_| StorageError::Io("chaotic RNG lock poisoned".to_string()))?
            .should_fail(self.failure_rate);

        if should_fail {
            tracing::trace!(operation, key, "Injecting storage failure");
            return Err(StorageError::Io("chaotic failure injection".to_string()));
        }

        Ok(())
    }
}

impl<S: SessionStore> SessionStore for ChaoticStore<S> {
    fn load(&self, key: &str) -> Result<Option<Zeroizing<Vec<u8>>>, StorageError> {
        self.inject("load", key)?;
        self.inner.load(key)
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.inject("store", key)?;
        self.inner.store(key, bytes)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inject("remove", key)?;
        self.inner.remove(key)
    }
}

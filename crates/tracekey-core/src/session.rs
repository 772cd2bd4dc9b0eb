//! Session engine: the rotating day-secret chain.
//!
//! A [`Session`] is the mutable root object of a device: its current day and
//! that day's secret. The only mutation is [`Session::advance`], which is the
//! only place the ratchet runs. Secret material leaves a session only through
//! [`Session::export_day_key`] (disclosure) and [`Session::to_bytes`]
//! (persistence).

use std::fmt;

use tracekey_crypto::{
    BroadcastKey, DayIndex, DaySecret, Identifier, SECRET_LEN, derive_identifier, ratchet_by,
};
use zeroize::Zeroizing;

use crate::{
    codec::{self, FormatError},
    config::ScheduleConfig,
    env::Environment,
    error::SessionError,
};

/// A day's key material, detached from any session.
///
/// Produced by [`Session::export_day_key`] when a user discloses a day, or
/// built with [`DayKey::new`] from a key someone else published. A `DayKey`
/// can be replayed but can never be folded back into a session's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayKey {
    day: DayIndex,
    secret: DaySecret,
}

impl DayKey {
    /// Pair a day with its secret.
    pub fn new(day: DayIndex, secret: DaySecret) -> Self {
        Self { day, secret }
    }

    /// Day this key belongs to.
    pub fn day(&self) -> DayIndex {
        self.day
    }

    /// The day's secret.
    pub fn secret(&self) -> &DaySecret {
        &self.secret
    }
}

/// Rotating per-day secret chain owned by one device.
///
/// # Invariants
///
/// - `day` never decreases
/// - `secret` is the root secret ratcheted once per day elapsed since the
///   root's day
/// - `day` and `secret` change together, in a single `&mut self` call
///
/// Dropping a session zeroizes its secret; [`Session::release`] makes the
/// end of its lifetime explicit.
pub struct Session {
    /// Current day index
    day: DayIndex,
    /// Secret for `day`
    secret: DaySecret,
}

impl Session {
    /// Create a session with a fresh random root secret for `today`.
    ///
    /// # Errors
    ///
    /// - `RandomSourceUnavailable`: the environment's random source failed.
    ///   No session is created; there is no fallback to a weaker source.
    pub fn create<E: Environment>(env: &E, today: DayIndex) -> Result<Self, SessionError> {
        let mut root = Zeroizing::new([0u8; SECRET_LEN]);
        if let Err(e) = env.random_bytes(root.as_mut_slice()) {
            tracing::error!(error = %e, "Failed to draw root secret");
            return Err(e.into());
        }

        let secret = DaySecret::from_bytes(*root);

        tracing::info!(day = %today, "Created session with fresh root secret");

        Ok(Self { day: today, secret })
    }

    /// Create a session for the environment's current day.
    pub fn create_today<E: Environment>(env: &E) -> Result<Self, SessionError> {
        Self::create(env, env.today())
    }

    /// Build a session from known state.
    pub fn from_parts(day: DayIndex, secret: DaySecret) -> Self {
        Self { day, secret }
    }

    /// Restore a session from bytes produced by [`Session::to_bytes`].
    ///
    /// # Errors
    ///
    /// - `FormatError`: bytes are malformed, truncated, foreign, or of an
    ///   unsupported version. Callers are expected to fall back to
    ///   [`Session::create`].
    pub fn restore(bytes: &[u8]) -> Result<Self, FormatError> {
        let (day, secret) = codec::decode(bytes)?;
        tracing::debug!(day = %day, "Restored session");
        Ok(Self { day, secret })
    }

    /// Encode the session's recoverable state.
    ///
    /// The buffer holds the current secret and is zeroized on drop.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        codec::encode(self.day, &self.secret)
    }

    /// Current day index.
    pub fn day(&self) -> DayIndex {
        self.day
    }

    /// Advance the session to `target`.
    ///
    /// No-op when `target` is the current day. Otherwise ratchets exactly
    /// `target - day` times; every intermediate secret is zeroized as soon as
    /// its successor exists, and the new `(day, secret)` pair is committed
    /// only after the last step.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition`: `target` precedes the current day. The session
    ///   is left unmodified.
    pub fn advance(&mut self, target: DayIndex) -> Result<(), SessionError> {
        let Some(steps) = target.days_since(self.day) else {
            tracing::warn!(
                current = %self.day,
                requested = %target,
                "Rejected backwards day transition"
            );
            return Err(SessionError::InvalidTransition { current: self.day, requested: target });
        };

        if steps == 0 {
            return Ok(());
        }

        let next = ratchet_by(&self.secret, steps);
        let previous = self.day;

        // Assigning drops (and zeroizes) the old secret
        self.secret = next;
        self.day = target;

        tracing::debug!(from = %previous, to = %target, steps, "Advanced session");

        Ok(())
    }

    /// Advance the session to the environment's current day.
    pub fn advance_to_today<E: Environment>(&mut self, env: &E) -> Result<(), SessionError> {
        self.advance(env.today())
    }

    /// Identifiers for periods `0..count` of the current day, in order.
    ///
    /// Pure read: does not change the day. Counts beyond the publication
    /// schedule are still derivable; knowing which ones are actually
    /// broadcast is the caller's responsibility, see [`Self::identifiers_for`].
    pub fn identifiers(&self, count: u32) -> Vec<Identifier> {
        BroadcastKey::derive(&self.secret).identifiers(count)
    }

    /// Every identifier the given schedule publishes today.
    pub fn identifiers_for(&self, schedule: &ScheduleConfig) -> Vec<Identifier> {
        BroadcastKey::derive(&self.secret).identifiers(schedule.periods_per_day)
    }

    /// Identifier for a single period of the current day.
    pub fn identifier(&self, period: u32) -> Identifier {
        derive_identifier(&self.secret, period)
    }

    /// Export the current day's key for disclosure.
    ///
    /// This is the only sanctioned path for a day secret to leave the
    /// session. The session keeps its own copy and is unchanged.
    pub fn export_day_key(&self) -> DayKey {
        tracing::info!(day = %self.day, "Exported day key for disclosure");
        DayKey::new(self.day, self.secret.clone())
    }

    /// End the session's lifetime, zeroizing its secret.
    pub fn release(self) {
        tracing::debug!(day = %self.day, "Released session");
        drop(self);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("day", &self.day).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tracekey_crypto::{DEFAULT_PERIODS_PER_DAY, derive_identifiers, ratchet};

    use super::*;
    use crate::{EntropyError, SeededEnv};

    fn root_secret() -> DaySecret {
        let mut bytes = [0u8; SECRET_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        DaySecret::from_bytes(bytes)
    }

    #[derive(Clone)]
    struct BrokenEnv;

    impl Environment for BrokenEnv {
        fn random_bytes(&self, _buffer: &mut [u8]) -> Result<(), EntropyError> {
            Err(EntropyError::new("entropy source offline"))
        }

        fn wall_clock_secs(&self) -> u64 {
            0
        }
    }

    #[test]
    fn create_uses_requested_day() {
        let env = SeededEnv::with_seed(1);
        let session = Session::create(&env, DayIndex::new(100)).unwrap();
        assert_eq!(session.day(), DayIndex::new(100));
    }

    #[test]
    fn create_today_reads_environment_clock() {
        let env = SeededEnv::with_seed(1).at_day(DayIndex::new(2_460_000));
        let session = Session::create_today(&env).unwrap();
        assert_eq!(session.day(), DayIndex::new(2_460_000));
    }

    #[test]
    fn create_draws_distinct_roots() {
        let env = SeededEnv::with_seed(1);
        let a = Session::create(&env, DayIndex::new(1)).unwrap();
        let b = Session::create(&env, DayIndex::new(1)).unwrap();
        assert_ne!(a.export_day_key(), b.export_day_key());
    }

    #[test]
    fn create_fails_without_random_source() {
        let result = Session::create(&BrokenEnv, DayIndex::new(1));
        assert!(matches!(result, Err(SessionError::RandomSourceUnavailable(_))));
    }

    #[test]
    fn advance_same_day_is_noop() {
        let mut session = Session::from_parts(DayIndex::new(100), root_secret());
        let before = session.identifiers(8);

        session.advance(DayIndex::new(100)).unwrap();

        assert_eq!(session.day(), DayIndex::new(100));
        assert_eq!(session.identifiers(8), before);
    }

    #[test]
    fn advance_three_days_ratchets_three_times() {
        let root = root_secret();
        let mut session = Session::from_parts(DayIndex::new(100), root.clone());

        session.advance(DayIndex::new(103)).unwrap();

        let key = session.export_day_key();
        assert_eq!(key.day(), DayIndex::new(103));
        assert_eq!(key.secret(), &ratchet(&ratchet(&ratchet(&root))));
    }

    #[test]
    fn advance_in_steps_matches_single_jump() {
        let mut stepped = Session::from_parts(DayIndex::new(10), root_secret());
        let mut jumped = Session::from_parts(DayIndex::new(10), root_secret());

        for day in 11..=15 {
            stepped.advance(DayIndex::new(day)).unwrap();
        }
        jumped.advance(DayIndex::new(15)).unwrap();

        assert_eq!(stepped.export_day_key(), jumped.export_day_key());
    }

    #[test]
    fn advance_backwards_fails_and_leaves_session_unchanged() {
        let mut session = Session::from_parts(DayIndex::new(103), root_secret());
        let before = session.export_day_key();

        let result = session.advance(DayIndex::new(100));

        match result {
            Err(SessionError::InvalidTransition { current, requested }) => {
                assert_eq!(current, DayIndex::new(103));
                assert_eq!(requested, DayIndex::new(100));
            },
            other => unreachable!("expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(session.export_day_key(), before);
    }

    #[test]
    fn advance_to_today_follows_clock() {
        let env = SeededEnv::with_seed(3).at_day(DayIndex::new(2_460_000));
        let mut session = Session::create_today(&env).unwrap();

        env.advance_days(2);
        session.advance_to_today(&env).unwrap();

        assert_eq!(session.day(), DayIndex::new(2_460_002));
    }

    #[test]
    fn identifiers_match_primitive_layer() {
        let session = Session::from_parts(DayIndex::new(5), root_secret());
        assert_eq!(session.identifiers(8), derive_identifiers(&root_secret(), 8));
        assert_eq!(session.identifier(3), derive_identifier(&root_secret(), 3));
    }

    #[test]
    fn identifiers_beyond_schedule_are_derivable() {
        let session = Session::from_parts(DayIndex::new(5), root_secret());
        let ids = session.identifiers(DEFAULT_PERIODS_PER_DAY + 4);
        assert_eq!(ids.len(), (DEFAULT_PERIODS_PER_DAY + 4) as usize);

        let scheduled = session.identifiers_for(&ScheduleConfig::default());
        assert_eq!(ids[..DEFAULT_PERIODS_PER_DAY as usize], scheduled[..]);
    }

    #[test]
    fn identifiers_do_not_mutate_day() {
        let session = Session::from_parts(DayIndex::new(5), root_secret());
        let _ = session.identifiers(96);
        assert_eq!(session.day(), DayIndex::new(5));
    }

    #[test]
    fn export_day_key_leaves_session_usable() {
        let mut session = Session::from_parts(DayIndex::new(5), root_secret());
        let key = session.export_day_key();

        session.advance(DayIndex::new(6)).unwrap();

        assert_eq!(key.day(), DayIndex::new(5));
        assert_eq!(key.secret(), &root_secret());
        assert_eq!(session.export_day_key().secret(), &ratchet(&root_secret()));
    }

    #[test]
    fn bytes_roundtrip() {
        let session = Session::from_parts(DayIndex::new(2_459_000), root_secret());
        let restored = Session::restore(&session.to_bytes()).unwrap();

        assert_eq!(restored.day(), session.day());
        assert_eq!(restored.export_day_key(), session.export_day_key());
    }

    #[test]
    fn restore_truncated_bytes_fails() {
        let session = Session::from_parts(DayIndex::new(2_459_000), root_secret());
        let bytes = session.to_bytes();

        let result = Session::restore(&bytes[..10]);
        assert!(result.is_err(), "truncated state must not restore");
    }

    #[test]
    fn debug_does_not_print_secret() {
        let session = Session::from_parts(DayIndex::new(7), DaySecret::from_bytes([0xCD; 32]));
        assert_eq!(format!("{session:?}"), "Session { day: DayIndex(7), .. }");
    }

    #[test]
    fn release_consumes_session() {
        let session = Session::from_parts(DayIndex::new(7), root_secret());
        session.release();
    }
}

//! Property-based tests for the session engine
//!
//! These tests verify the engine's contract over arbitrary inputs:
//!
//! 1. **Persistence**: `restore(to_bytes(s))` behaves exactly like `s`
//! 2. **Monotonicity**: a session's day never decreases
//! 3. **Path independence**: how a session reaches a day does not matter
//! 4. **Replay fidelity**: a disclosed key replays the session's identifiers
//! 5. **Codec strictness**: damaged input is rejected, never misread

use proptest::prelude::*;
use tracekey_core::{DayIndex, DaySecret, Replay, Session, SessionError, codec};

fn secret_strategy() -> impl Strategy<Value = DaySecret> {
    any::<[u8; 32]>().prop_map(DaySecret::from_bytes)
}

fn day_strategy() -> impl Strategy<Value = DayIndex> {
    (2_400_000u32..2_600_000).prop_map(DayIndex::new)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_persistence_roundtrip(secret in secret_strategy(), day in day_strategy()) {
        let session = Session::from_parts(day, secret);
        let restored = Session::restore(&session.to_bytes()).unwrap();

        prop_assert_eq!(restored.day(), session.day());
        prop_assert_eq!(restored.identifiers(16), session.identifiers(16));
    }

    #[test]
    fn prop_advance_to_current_day_is_noop(secret in secret_strategy(), day in day_strategy()) {
        let mut session = Session::from_parts(day, secret);
        let before = session.export_day_key();

        session.advance(day).unwrap();

        prop_assert_eq!(session.export_day_key(), before);
    }

    #[test]
    fn prop_backwards_advance_always_fails(
        secret in secret_strategy(),
        day in day_strategy(),
        back in 1u32..1000,
    ) {
        let mut session = Session::from_parts(day, secret);
        let before = session.export_day_key();

        let result = session.advance(DayIndex::new(day.value() - back));

        let is_invalid_transition = matches!(result, Err(SessionError::InvalidTransition { .. }));
        prop_assert!(is_invalid_transition);
        prop_assert_eq!(session.export_day_key(), before);
    }

    #[test]
    fn prop_advance_path_independent(
        secret in secret_strategy(),
        day in day_strategy(),
        first in 0u32..10,
        second in 0u32..10,
    ) {
        let mut stepped = Session::from_parts(day, secret.clone());
        let mut jumped = Session::from_parts(day, secret);

        stepped.advance(DayIndex::new(day.value() + first)).unwrap();
        stepped.advance(DayIndex::new(day.value() + first + second)).unwrap();
        jumped.advance(DayIndex::new(day.value() + first + second)).unwrap();

        prop_assert_eq!(stepped.export_day_key(), jumped.export_day_key());
    }

    #[test]
    fn prop_replay_matches_session(
        secret in secret_strategy(),
        day in day_strategy(),
        count in 0u32..200,
    ) {
        let session = Session::from_parts(day, secret);
        let key = session.export_day_key();

        let replayed: Vec<_> = Replay::open(&key, count).collect();

        prop_assert_eq!(replayed.len(), count as usize);
        prop_assert!(replayed.iter().all(|(d, _)| *d == day));
        let ids: Vec<_> = replayed.into_iter().map(|(_, id)| id).collect();
        prop_assert_eq!(ids, session.identifiers(count));
    }

    #[test]
    fn prop_truncated_bytes_rejected(
        secret in secret_strategy(),
        day in day_strategy(),
        cut in 0usize..64,
    ) {
        let bytes = codec::encode(day, &secret);
        let len = cut.min(bytes.len() - 1);

        prop_assert!(codec::decode(&bytes[..len]).is_err());
    }

    #[test]
    fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = codec::decode(&bytes);
    }
}

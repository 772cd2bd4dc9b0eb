//! Fuzz target for session lifecycle under storage chaos
//!
//! Runs an arbitrary sequence of day advances, saves, restores, and
//! disclosures against a session persisted through a `ChaoticStore`, and
//! checks it against a model that only tracks the root secret and the day.
//!
//! # Invariants
//!
//! - The session's day never decreases; a backwards advance fails and
//!   changes nothing
//! - The session's secret is always `ratchet^(day - start)(root)`
//! - The store only ever holds a session that was successfully saved
//! - Storage failures surface as `SessionError::Storage`
//! - NEVER panic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tracekey_core::{
    DayIndex, DaySecret, Replay, Session, SessionError, restore_session, save_session,
};
use tracekey_crypto::ratchet_by;
use tracekey_store::{ChaoticStore, MemoryStore};

const KEY: &str = "device";

#[derive(Debug, Arbitrary)]
struct Scenario {
    root: [u8; 32],
    start: u32,
    failure_percent: u8,
    seed: u64,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Advance { days: u8 },
    AdvanceBackwards { days: u8 },
    Save,
    Restore,
    Disclose { count: u8 },
}

fuzz_target!(|scenario: Scenario| {
    let start = scenario.start % 3_000_000;
    let root = DaySecret::from_bytes(scenario.root);
    let failure_rate = f64::from(scenario.failure_percent % 101) / 100.0;
    let store = ChaoticStore::with_seed(MemoryStore::new(), failure_rate, scenario.seed);

    let mut session = Session::from_parts(DayIndex::new(start), root.clone());
    let mut saved_day: Option<DayIndex> = None;

    for op in scenario.ops.into_iter().take(64) {
        match op {
            Op::Advance { days } => {
                let target = DayIndex::new(session.day().value() + u32::from(days % 30));
                session.advance(target).unwrap();
            }

            Op::AdvanceBackwards { days } => {
                let days = u32::from(days).max(1);
                let Some(target) = session.day().value().checked_sub(days) else {
                    continue;
                };
                let before = session.export_day_key();
                let result = session.advance(DayIndex::new(target));
                assert!(matches!(result, Err(SessionError::InvalidTransition { .. })));
                assert_eq!(session.export_day_key(), before);
            }

            Op::Save => match save_session(&store, KEY, &session) {
                Ok(()) => saved_day = Some(session.day()),
                Err(SessionError::Storage(_)) => {}
                Err(e) => panic!("unexpected save error: {e:?}"),
            },

            Op::Restore => match restore_session(&store, KEY) {
                Ok(Some(restored)) => {
                    assert_eq!(Some(restored.day()), saved_day);
                    // Restored sessions are on the same chain
                    let steps = restored.day().days_since(DayIndex::new(start)).unwrap();
                    assert_eq!(restored.export_day_key().secret(), &ratchet_by(&root, steps));
                    if restored.day() >= session.day() {
                        session = restored;
                    }
                }
                Ok(None) => assert!(saved_day.is_none()),
                Err(SessionError::Storage(_)) => {}
                Err(e) => panic!("unexpected restore error: {e:?}"),
            },

            Op::Disclose { count } => {
                let key = session.export_day_key();
                let replayed: Vec<_> =
                    Replay::open(&key, u32::from(count)).map(|(_, id)| id).collect();
                assert_eq!(replayed, session.identifiers(u32::from(count)));
            }
        }

        let steps = session.day().days_since(DayIndex::new(start)).unwrap();
        assert_eq!(session.export_day_key().secret(), &ratchet_by(&root, steps));
    }
});

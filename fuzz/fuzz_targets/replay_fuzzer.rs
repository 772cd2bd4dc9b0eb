//! Fuzz target for replay iteration
//!
//! Drives `Replay` and `ReplayWindow` with arbitrary keys, counts, and
//! interleavings of `next`, `nth`, and `rewind`, and compares every item with
//! direct derivation.
//!
//! # Invariants
//!
//! - `Replay` yields exactly `count` items, period `i` at position `i`
//! - `size_hint` is exact for `Replay` and an upper bound for windows
//! - An exhausted iterator stays exhausted
//! - Window days are consecutive and never wrap
//! - NEVER panic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tracekey_core::{DayIndex, DayKey, DaySecret, Replay, ReplayWindow};
use tracekey_crypto::{derive_identifier, ratchet_by};

#[derive(Debug, Arbitrary)]
struct Input {
    secret: [u8; 32],
    day: u32,
    count: u16,
    window_days: u8,
    steps: Vec<Step>,
}

#[derive(Debug, Arbitrary)]
enum Step {
    Next,
    Nth(u16),
    Rewind,
}

fuzz_target!(|input: Input| {
    let secret = DaySecret::from_bytes(input.secret);
    let key = DayKey::new(DayIndex::new(input.day), secret.clone());
    let count = u32::from(input.count % 512);

    let mut replay = Replay::open(&key, count);
    let mut position = 0u32;

    for step in input.steps.into_iter().take(256) {
        assert_eq!(replay.len(), (count - position) as usize);

        let item = match step {
            Step::Next => replay.next(),
            Step::Nth(n) => {
                let target = position.saturating_add(u32::from(n));
                position = target.min(count);
                replay.nth(n as usize)
            }
            Step::Rewind => {
                replay.rewind();
                position = 0;
                continue;
            }
        };

        match item {
            Some((day, id)) => {
                assert!(position < count);
                assert_eq!(day, key.day());
                assert_eq!(id, derive_identifier(&secret, position));
                position += 1;
            }
            None => {
                assert_eq!(position, count);
                assert!(replay.next().is_none());
            }
        }
    }

    let days = u32::from(input.window_days % 20);
    let window = ReplayWindow::open(&key, days, count.min(16));
    let (_, upper) = window.size_hint();
    let items: Vec<_> = window.collect();
    assert!(items.len() <= upper.unwrap_or(usize::MAX));

    let per_day = count.min(16) as usize;
    for (i, (day, id)) in items.iter().enumerate() {
        let offset = (i / per_day) as u32;
        assert_eq!(day.value(), input.day + offset);
        let period = (i % per_day) as u32;
        assert_eq!(*id, derive_identifier(&ratchet_by(&secret, offset), period));
    }
});

//! Replay verifier: regenerate one disclosed day's identifiers.
//!
//! A [`Replay`] is a lazy, finite iterator over `(day, identifier)` pairs for
//! periods `0..count` of a single disclosed day. It holds only the day's
//! broadcast key, never ratchets, and never matches: comparing the output
//! against observed identifiers is the caller's job.

use std::iter::FusedIterator;

use tracekey_crypto::{BroadcastKey, DayIndex, Identifier};

use crate::session::DayKey;

/// Lazy identifier sequence of one disclosed day.
///
/// Pure function of `(disclosed, count)`: opening the same key twice, or
/// calling [`Replay::rewind`], reproduces the same sequence.
#[derive(Debug)]
pub struct Replay {
    /// Day the disclosed key belongs to
    day: DayIndex,
    /// PRF key derived from the disclosed secret
    key: BroadcastKey,
    /// Number of periods to produce
    count: u32,
    /// Next period to produce
    next_period: u32,
}

impl Replay {
    /// Open a replay over periods `0..count` of the disclosed day.
    pub fn open(disclosed: &DayKey, count: u32) -> Self {
        Self {
            day: disclosed.day(),
            key: BroadcastKey::derive(disclosed.secret()),
            count,
            next_period: 0,
        }
    }

    /// Day being replayed.
    pub fn day(&self) -> DayIndex {
        self.day
    }

    /// Total number of identifiers this replay produces.
    pub fn total(&self) -> u32 {
        self.count
    }

    /// Period index of the next identifier (equals `count` once exhausted).
    pub fn position(&self) -> u32 {
        self.next_period
    }

    /// Restart the sequence from period 0.
    pub fn rewind(&mut self) {
        self.next_period = 0;
    }

    fn remaining(&self) -> usize {
        (self.count - self.next_period) as usize
    }
}

impl Iterator for Replay {
    type Item = (DayIndex, Identifier);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_period >= self.count {
            return None;
        }

        let id = self.key.identifier(self.next_period);
        self.next_period += 1;

        debug_assert!(self.next_period <= self.count);
        Some((self.day, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }

    /// Random access: periods before the target are skipped, not derived.
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let target = u32::try_from(n).ok().and_then(|n| self.next_period.checked_add(n));
        match target {
            Some(period) if period < self.count => {
                self.next_period = period;
                self.next()
            },
            _ => {
                self.next_period = self.count;
                None
            },
        }
    }
}

impl ExactSizeIterator for Replay {}

impl FusedIterator for Replay {}

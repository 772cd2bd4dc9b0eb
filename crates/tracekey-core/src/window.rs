//! Multi-day replay from a single disclosed key.
//!
//! Some deployments disclose one day key and let verifiers derive the days
//! after it, instead of publishing every day separately. [`ReplayWindow`]
//! implements that policy on top of [`Replay`]: it ratchets a local copy of
//! the disclosed secret forward one day at a time and replays each day in
//! turn. Whether a protocol allows this is a protocol decision; a plain
//! [`Replay`] never ratchets.

use std::iter::FusedIterator;

use tracekey_crypto::{DayIndex, Identifier, ratchet};

use crate::{replay::Replay, session::DayKey};

/// Days covered by a disclosure in the default policy
pub const DEFAULT_DISCLOSURE_DAYS: u32 = 14;

/// Replay of `days` consecutive days starting at a disclosed key.
///
/// Yields `(day, identifier)` for every period `0..count` of every day in
/// `disclosed.day() .. disclosed.day() + days`, day by day, in period order.
/// The window ends early rather than wrapping past the last representable
/// day.
#[derive(Debug)]
pub struct ReplayWindow {
    /// Identifiers per day
    count: u32,
    /// Day currently being replayed
    current: Option<Replay>,
    /// Key for the day after `current`; `Some` only while `days_left > 0`
    upcoming: Option<DayKey>,
    /// Days not yet opened
    days_left: u32,
}

impl ReplayWindow {
    /// Open a window of `days` days with `count` identifiers per day.
    pub fn open(disclosed: &DayKey, days: u32, count: u32) -> Self {
        if days == 0 {
            return Self { count, current: None, upcoming: None, days_left: 0 };
        }

        let days_left = days - 1;
        let upcoming = if days_left > 0 { following_day(disclosed) } else { None };

        Self { count, current: Some(Replay::open(disclosed, count)), upcoming, days_left }
    }

    /// Day currently being replayed, if any.
    pub fn current_day(&self) -> Option<DayIndex> {
        self.current.as_ref().map(Replay::day)
    }
}

/// Key of the day after `key`, or `None` at the end of the day range.
fn following_day(key: &DayKey) -> Option<DayKey> {
    key.day().checked_next().map(|day| DayKey::new(day, ratchet(key.secret())))
}

impl Iterator for ReplayWindow {
    type Item = (DayIndex, Identifier);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(Iterator::next) {
                return Some(item);
            }

            let Some(key) = self.upcoming.take() else {
                self.current = None;
                return None;
            };

            debug_assert!(self.days_left > 0);
            self.days_left -= 1;
            self.upcoming = if self.days_left > 0 { following_day(&key) } else { None };
            self.current = Some(Replay::open(&key, self.count));

            tracing::trace!(day = %key.day(), days_left = self.days_left, "Replaying next day");
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let in_current = self.current.as_ref().map_or(0, ExactSizeIterator::len);
        let later = (self.days_left as usize).checked_mul(self.count as usize);
        (in_current, later.and_then(|later| later.checked_add(in_current)))
    }
}

impl FusedIterator for ReplayWindow {}

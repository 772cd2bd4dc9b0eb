//! Broadcast schedule configuration.

use thiserror::Error;
use tracekey_crypto::{DEFAULT_PERIODS_PER_DAY, SECONDS_PER_DAY};

/// Upper bound on periods per day: one identifier per minute
pub const MAX_PERIODS_PER_DAY: u32 = 1440;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Periods per day outside `1..=MAX_PERIODS_PER_DAY`
    #[error("periods per day must be between 1 and {max}, got {value}")]
    InvalidPeriodsPerDay {
        /// Rejected value
        value: u32,
        /// Largest accepted value
        max: u32,
    },
}

/// How a day is split into broadcast periods.
///
/// Each period broadcasts one identifier. Periods have equal length and
/// start at midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Number of identifiers published per day
    pub periods_per_day: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { periods_per_day: DEFAULT_PERIODS_PER_DAY }
    }
}

impl ScheduleConfig {
    /// Schedule with the given number of periods, validated.
    pub fn new(periods_per_day: u32) -> Result<Self, ConfigError> {
        let config = Self { periods_per_day };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.periods_per_day == 0 || self.periods_per_day > MAX_PERIODS_PER_DAY {
            return Err(ConfigError::InvalidPeriodsPerDay {
                value: self.periods_per_day,
                max: MAX_PERIODS_PER_DAY,
            });
        }
        Ok(())
    }

    /// Length of one period in seconds (rounded down).
    pub fn period_secs(&self) -> u64 {
        SECONDS_PER_DAY / u64::from(self.periods_per_day.max(1))
    }

    /// Period index active at the given Unix timestamp.
    ///
    /// Always `< periods_per_day`; the remainder seconds at the end of a day
    /// that does not divide evenly belong to the last period.
    pub fn period_at(&self, unix_secs: u64) -> u32 {
        let into_day = unix_secs % SECONDS_PER_DAY;
        let period = into_day / self.period_secs().max(1);
        let last = u64::from(self.periods_per_day.max(1) - 1);
        period.min(last) as u32
    }
}

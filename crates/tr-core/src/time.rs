//! Wall-clock model.
//!
//! All timestamps are UTC ([`Timestamp`]).  The time-of-day weight model
//! works on the *local* clock hour of the region being routed, which
//! [`LocalClock`] derives from a fixed UTC offset.  Daylight-saving
//! transitions are out of scope: a region is configured with the offset it
//! observes during the period being served.

use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

use crate::{CoreError, CoreResult};

/// A UTC instant.
pub type Timestamp = DateTime<Utc>;

/// Converts UTC timestamps into a region's local clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LocalClock {
    offset: FixedOffset,
}

impl LocalClock {
    /// The UTC clock (offset zero).
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Clock `offset_secs` east of UTC (e.g. `19_800` for IST, UTC+05:30).
    pub fn with_offset_secs(offset_secs: i32) -> CoreResult<Self> {
        FixedOffset::east_opt(offset_secs)
            .map(|offset| Self { offset })
            .ok_or_else(|| {
                CoreError::Config(format!("UTC offset {offset_secs}s is out of range"))
            })
    }

    /// Local hour of day in `0..24`.
    pub fn hour_of_day(&self, at: Timestamp) -> u32 {
        at.with_timezone(&self.offset).hour()
    }

    pub fn offset_secs(&self) -> i32 {
        self.offset.local_minus_utc()
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for LocalClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UTC{}", self.offset)
    }
}

/// `true` while `then` is no more than `window_secs` older than `now`.
///
/// Timestamps in the future relative to `now` count as fresh.
pub fn is_fresh(then: Timestamp, now: Timestamp, window_secs: u64) -> bool {
    let window_ms = window_secs.saturating_mul(1_000).min(i64::MAX as u64) as i64;
    now.signed_duration_since(then).num_milliseconds() <= window_ms
}

//! Timestamps and the per-graph clock.
//!
//! A [`Clock`] is the "current time" a graph stamps writes with when the
//! caller does not pass a timestamp explicitly. It belongs to one graph
//! instance and is only ever moved by the caller.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Point in time with millisecond resolution, measured from the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Fixed timestamp carried by every version of a non-temporal graph.
    pub const STATIC: Timestamp = Timestamp::EPOCH;

    pub const MAX: Timestamp = Timestamp(u64::MAX);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Current wall-clock time. Times before the epoch clamp to [`Timestamp::EPOCH`].
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.0)
    }

    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let millis = u64::try_from(duration.as_millis()).ok()?;
        self.0.checked_add(millis).map(Self)
    }

    pub fn saturating_add(self, duration: Duration) -> Self {
        self.checked_add(duration).unwrap_or(Self::MAX)
    }

    /// Time elapsed from `earlier` to `self`, or `None` if `earlier` is later.
    pub fn duration_since(self, earlier: Timestamp) -> Option<Duration> {
        self.0.checked_sub(earlier.0).map(Duration::from_millis)
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self(millis)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        ts.to_system_time()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

/// Monotonic time cursor owned by a graph.
///
/// Starts at the graph's creation time (or an explicit start) and moves only
/// when the caller advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    now: Timestamp,
}

impl Clock {
    /// Clock starting at the current wall-clock time.
    pub fn new() -> Self {
        Self::starting_at(Timestamp::now())
    }

    pub const fn starting_at(start: Timestamp) -> Self {
        Self { now: start }
    }

    pub const fn now(&self) -> Timestamp {
        self.now
    }

    /// Move the clock forward by `step` and return the new time.
    ///
    /// Saturates at [`Timestamp::MAX`].
    pub fn advance(&mut self, step: Duration) -> Timestamp {
        self.now = self.now.saturating_add(step);
        self.now
    }

    /// Jump to an absolute time. Moving backwards is rejected.
    pub fn set(&mut self, to: Timestamp) -> Result<Timestamp> {
        if to < self.now {
            log::warn!("Rejected clock rollback from {} to {}", self.now, to);
            return Err(GraphError::ClockRollback {
                current: self.now,
                requested: to,
            });
        }
        self.now = to;
        Ok(self.now)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversions() {
        let ts = Timestamp::from_secs(90);
        assert_eq!(ts.as_millis(), 90_000);
        assert_eq!(Timestamp::from(ts.to_system_time()), ts);
        assert_eq!(ts.to_string(), "90.000");
        assert_eq!(Timestamp::from_millis(1_250).to_string(), "1.250");
    }

    #[test]
    fn test_timestamp_arithmetic() {
        let ts = Timestamp::from_secs(10);
        let later = ts.checked_add(Duration::from_secs(5)).unwrap();
        assert_eq!(later, Timestamp::from_secs(15));
        assert_eq!(later.duration_since(ts), Some(Duration::from_secs(5)));
        assert_eq!(ts.duration_since(later), None);
        assert_eq!(
            Timestamp::MAX.saturating_add(Duration::from_secs(1)),
            Timestamp::MAX
        );
    }

    #[test]
    fn test_pre_epoch_time_clamps() {
        let before = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(Timestamp::from(before), Timestamp::EPOCH);
    }

    #[test]
    fn test_clock_advance() {
        let mut clock = Clock::starting_at(Timestamp::EPOCH);
        assert_eq!(clock.now(), Timestamp::EPOCH);

        let t = clock.advance(Duration::from_secs(30 * 60));
        assert_eq!(t, Timestamp::from_secs(1800));
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn test_clock_rejects_rollback() {
        let mut clock = Clock::starting_at(Timestamp::from_secs(100));
        assert!(clock.set(Timestamp::from_secs(200)).is_ok());

        let err = clock.set(Timestamp::from_secs(50)).unwrap_err();
        assert!(matches!(err, GraphError::ClockRollback { .. }));
        assert_eq!(clock.now(), Timestamp::from_secs(200));

        // Setting to the current time is not a rollback.
        assert!(clock.set(Timestamp::from_secs(200)).is_ok());
    }

    #[test]
    fn test_new_clock_starts_near_now() {
        let before = Timestamp::now();
        let clock = Clock::new();
        assert!(clock.now() >= before);
    }
}

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Time source consulted once per record at creation.
///
/// Ledgers read time only through this trait, so tests can pin timestamps and
/// obtain reproducible digests.
pub trait Clock: Send + Sync {
    /// The current instant, at nanosecond resolution where available.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
///
/// Each call to [`Clock::now`] returns the current instant and then advances
/// it by `step`. A zero step yields a frozen clock.
pub struct ManualClock {
    state: Mutex<ManualState>,
}

struct ManualState {
    current: DateTime<Utc>,
    step: Duration,
}

impl ManualClock {
    /// A clock frozen at `at`.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::stepping(at, Duration::zero())
    }

    /// A clock starting at `start` that advances by `step` after every read.
    pub fn stepping(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            state: Mutex::new(ManualState {
                current: start,
                step,
            }),
        }
    }

    /// Move the clock to an explicit instant.
    pub fn set(&self, at: DateTime<Utc>) {
        self.lock().current = at;
    }

    /// Move the clock forward (or backward, for a negative duration).
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.current = state.current + by;
    }

    /// The instant the next read will return, without advancing.
    pub fn peek(&self) -> DateTime<Utc> {
        self.lock().current
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        // The state is two plain values; a panic mid-update cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut state = self.lock();
        let now = state.current;
        state.current = now + state.step;
        now
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn epoch_plus(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn system_clock_is_after_2020() {
        let now = SystemClock.now();
        assert!(now > epoch_plus(1_577_836_800));
    }

    #[test]
    fn fixed_clock_does_not_move() {
        let clock = ManualClock::fixed(epoch_plus(100));
        assert_eq!(clock.now(), epoch_plus(100));
        assert_eq!(clock.now(), epoch_plus(100));
    }

    #[test]
    fn stepping_clock_advances_after_each_read() {
        let clock = ManualClock::stepping(epoch_plus(0), Duration::nanoseconds(5));
        let a = clock.now();
        let b = clock.now();
        assert_eq!(b - a, Duration::nanoseconds(5));
        assert_eq!(clock.peek(), epoch_plus(0) + Duration::nanoseconds(10));
    }

    #[test]
    fn set_and_advance() {
        let clock = ManualClock::fixed(epoch_plus(0));
        clock.set(epoch_plus(50));
        clock.advance(Duration::seconds(10));
        assert_eq!(clock.now(), epoch_plus(60));
    }

    #[test]
    fn clock_is_object_safe() {
        let clocks: Vec<Box<dyn Clock>> = vec![
            Box::new(SystemClock) as Box<dyn Clock>,
            Box::new(ManualClock::fixed(epoch_plus(1))),
        ];
        assert_eq!(clocks[1].now(), epoch_plus(1));
    }
}

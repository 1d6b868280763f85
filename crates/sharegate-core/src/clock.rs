use jiff::{SignedDuration, Timestamp};
use std::sync::{Arc, Mutex};

/// Wall-clock time source.
///
/// Injected everywhere time matters so expiry can be simulated in tests.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            inner: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `target`, in either direction.
    pub fn set(&self, target: Timestamp) {
        *self.lock() = target;
    }

    /// Moves the clock forward (or backward, for a negative duration).
    pub fn advance(&self, by: SignedDuration) {
        let mut now = self.lock();
        *now = now.saturating_add(by).unwrap_or(*now);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
        // a poisoned guard still holds a valid timestamp
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_at_given_time() {
        let base = Timestamp::from_second(0).unwrap();
        let clock = ManualClock::new(base);
        assert_eq!(clock.now(), base);
    }

    #[test]
    fn manual_clock_advances_and_is_shared_between_clones() {
        let clock = ManualClock::new(Timestamp::from_second(100).unwrap());
        let other = clock.clone();

        clock.advance(SignedDuration::from_secs(30));
        assert_eq!(other.now(), Timestamp::from_second(130).unwrap());

        other.set(Timestamp::from_second(10).unwrap());
        assert_eq!(clock.now(), Timestamp::from_second(10).unwrap());
    }
}

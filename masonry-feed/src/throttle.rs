//! Rate limiting for high-frequency input such as scroll events.
//!
//! [`Throttle`] lets at most one value through per interval. A value that
//! arrives too early is parked and released by [`Throttle::poll`] once the
//! interval has elapsed, so the last update in a burst is never lost.

use std::time::Duration;

use web_time::Instant;

/// Leading- and trailing-edge throttle driven by caller-supplied time.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_fire: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    /// Creates a throttle that fires at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
            pending: None,
        }
    }

    /// Minimum spacing between fires.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn ready(&self, now: Instant) -> bool {
        match self.last_fire {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Offers a value.
    ///
    /// Returns it immediately if the interval has elapsed since the last
    /// fire. Otherwise it replaces any parked value and `None` is returned.
    pub fn submit(&mut self, value: T, now: Instant) -> Option<T> {
        if self.ready(now) {
            self.pending = None;
            self.last_fire = Some(now);
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Releases the parked value once the interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() || !self.ready(now) {
            return None;
        }
        self.last_fire = Some(now);
        self.pending.take()
    }

    /// When the parked value becomes releasable, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        // A value is only parked after a fire, so `last_fire` is set here.
        self.last_fire.map(|last| last + self.interval)
    }

    /// Whether a value is parked.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the parked value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    fn ms(base: Instant, offset: u64) -> Instant {
        base + Duration::from_millis(offset)
    }

    #[test]
    fn first_value_fires_immediately() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        assert_eq!(throttle.submit("test", start), Some("test"));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn values_within_interval_are_parked() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        assert_eq!(throttle.submit("first", start), Some("first"));
        assert_eq!(throttle.submit("second", ms(start, 10)), None);

        assert_eq!(throttle.poll(ms(start, 50)), None);
        assert_eq!(throttle.deadline(), Some(ms(start, 100)));
        assert_eq!(throttle.poll(ms(start, 100)), Some("second"));
        assert_eq!(throttle.poll(ms(start, 400)), None);
    }

    #[test]
    fn trailing_edge_delivers_latest_value() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.submit(1, start);
        throttle.submit(2, ms(start, 20));
        throttle.submit(3, ms(start, 40));
        throttle.submit(4, ms(start, 60));

        assert_eq!(throttle.poll(ms(start, 100)), Some(4));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn interval_restarts_after_trailing_fire() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.submit(1, start);
        throttle.submit(2, ms(start, 50));
        assert_eq!(throttle.poll(ms(start, 120)), Some(2));

        assert_eq!(throttle.submit(3, ms(start, 150)), None);
        assert_eq!(throttle.poll(ms(start, 200)), None);
        assert_eq!(throttle.poll(ms(start, 220)), Some(3));
    }

    #[test]
    fn late_submit_fires_directly_and_discards_parked() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.submit(1, start);
        throttle.submit(2, ms(start, 30));
        assert_eq!(throttle.submit(3, ms(start, 130)), Some(3));
        assert_eq!(throttle.poll(ms(start, 500)), None);
    }

    #[test]
    fn cancel_drops_parked_value() {
        let start = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.submit(1, start);
        throttle.submit(2, ms(start, 30));
        throttle.cancel();
        assert_eq!(throttle.deadline(), None);
        assert_eq!(throttle.poll(ms(start, 200)), None);
    }
}

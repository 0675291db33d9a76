//! Trailing-edge debounce for query input.

use std::time::Duration;

use web_time::Instant;

/// Owned debounce timer.
///
/// Each [`schedule`](Debouncer::schedule) replaces the pending value and
/// pushes the deadline out by the full delay. The owner polls it from its
/// event loop and drops or [`cancel`](Debouncer::cancel)s it on teardown.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Creates an idle debouncer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Arms the timer with `value`, cancelling whatever was pending.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Yields the value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if !due {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// Deadline of the pending value.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Whether a value is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Disarms the timer.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule("cats", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(300)),
            Some("cats")
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn each_keystroke_restarts_the_timer() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule("c", start);
        debouncer.schedule("ca", start + Duration::from_millis(200));
        debouncer.schedule("cat", start + Duration::from_millis(400));

        assert_eq!(debouncer.poll(start + Duration::from_millis(600)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(700))
        );
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(700)),
            Some("cat")
        );
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule("dogs", start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }
}

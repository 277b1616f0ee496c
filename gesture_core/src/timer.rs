//! Cancellable one-shot deadline.
//!
//! The pipeline never sleeps or spawns; a timeout is just an optional
//! deadline checked whenever a frame or a host tick arrives.  Because the
//! deadline lives in the owner's state, cancelling is a plain assignment and
//! a stale callback can never fire after the condition it guarded is gone.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeout {
    deadline: Option<Instant>,
}

impl Timeout {
    pub fn new() -> Self {
        Timeout { deadline: None }
    }

    /// Arm (or re-arm) to fire `after` from `now`.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once `now` has reached the deadline.  Does not disarm.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Disarm and return true if the deadline has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut t = Timeout::new();
        t.arm(t0, ms(100));
        assert!(!t.fire_if_due(t0 + ms(99)));
        assert!(t.fire_if_due(t0 + ms(100)));
        assert!(!t.fire_if_due(t0 + ms(200)));
        assert!(!t.is_armed());
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut t = Timeout::new();
        t.arm(t0, ms(10));
        t.cancel();
        t.cancel();
        assert!(!t.fire_if_due(t0 + ms(50)));
    }

    #[test]
    fn rearm_moves_the_deadline() {
        let t0 = Instant::now();
        let mut t = Timeout::new();
        t.arm(t0, ms(10));
        t.arm(t0 + ms(5), ms(10));
        assert!(!t.is_due(t0 + ms(12)));
        assert!(t.is_due(t0 + ms(15)));
        assert_eq!(t.remaining(t0 + ms(20)), Some(Duration::ZERO));
    }
}

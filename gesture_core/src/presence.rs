//! Hand presence and the "gesture control unavailable" grace period.
//!
//! ```text
//!   Searching ──hand──▶ Present ──no hand──▶ AbsentPending ──grace elapsed──▶ Unavailable
//!                          ▲                      │                                │
//!                          └──────hand────────────┴───────────hand─────────────────┘
//! ```
//!
//! `Searching` is the start state before any hand has been seen; absence
//! there is not a loss and arms nothing.  The grace period is a
//! [`Timeout`] polled on every observation and every host tick, and it is
//! cancelled the moment a hand comes back.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::timer::Timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresencePhase {
    Searching,
    Present,
    AbsentPending,
    Unavailable,
}

/// What changed as a result of an observation or a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// First hand of the session.
    Appeared,
    /// Hand gone; grace period started.
    Lost,
    /// Hand back inside the grace period.
    Returned,
    /// Grace period ran out.
    Expired,
    /// Hand back after the session was marked unavailable.
    Recovered,
}

impl PresenceTransition {
    /// Whether this transition flips the hand-present flag.
    pub fn changes_presence(&self) -> bool {
        !matches!(self, PresenceTransition::Expired)
    }
}

#[derive(Debug, Clone)]
pub struct PresenceTracker {
    phase:   PresencePhase,
    timeout: Timeout,
    grace:   Duration,
}

impl PresenceTracker {
    pub fn new(grace: Duration) -> Self {
        PresenceTracker {
            phase:   PresencePhase::Searching,
            timeout: Timeout::new(),
            grace,
        }
    }

    /// Record whether the current frame carries a hand.
    ///
    /// A hand seen on the frame where the grace period runs out beats the
    /// timer: the deadline is cancelled and the result is `Returned`, never
    /// an unreported trip through `Unavailable`.
    pub fn observe(&mut self, has_hand: bool, now: Instant) -> Option<PresenceTransition> {
        if !has_hand {
            if let Some(expired) = self.poll(now) {
                return Some(expired);
            }
        }

        let transition = match (self.phase, has_hand) {
            (PresencePhase::Searching, true) => {
                self.phase = PresencePhase::Present;
                Some(PresenceTransition::Appeared)
            }
            (PresencePhase::Present, false) => {
                self.phase = PresencePhase::AbsentPending;
                self.timeout.arm(now, self.grace);
                Some(PresenceTransition::Lost)
            }
            (PresencePhase::AbsentPending, true) => {
                self.phase = PresencePhase::Present;
                self.timeout.cancel();
                Some(PresenceTransition::Returned)
            }
            (PresencePhase::Unavailable, true) => {
                self.phase = PresencePhase::Present;
                self.timeout.cancel();
                Some(PresenceTransition::Recovered)
            }
            _ => None,
        };

        if let Some(t) = transition {
            debug!(?t, phase = ?self.phase, "presence transition");
        }
        transition
    }

    /// Fire the grace timeout if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<PresenceTransition> {
        if self.phase == PresencePhase::AbsentPending && self.timeout.fire_if_due(now) {
            self.phase = PresencePhase::Unavailable;
            debug!("presence grace period elapsed");
            return Some(PresenceTransition::Expired);
        }
        None
    }

    /// Drop any pending timeout; used on teardown.
    pub fn cancel(&mut self) {
        self.timeout.cancel();
    }

    pub fn phase(&self) -> PresencePhase { self.phase }

    pub fn has_hand(&self) -> bool {
        self.phase == PresencePhase::Present
    }

    /// Classification and dispatch only run while a hand is present.
    pub fn accepts_gestures(&self) -> bool {
        self.has_hand()
    }

    pub fn timeout_armed(&self) -> bool {
        self.timeout.is_armed()
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        PresenceTracker::new(Duration::from_millis(2500))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use PresenceTransition::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    /// Feed `has_hand` every 50 ms from `from` to `to` (exclusive) and
    /// collect every transition.
    fn run(p: &mut PresenceTracker, t0: Instant, from: u64, to: u64, has_hand: bool)
        -> Vec<PresenceTransition>
    {
        (from..to).step_by(50)
            .filter_map(|t| p.observe(has_hand, t0 + ms(t)))
            .collect()
    }

    #[test]
    fn absence_before_any_hand_arms_nothing() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        assert!(run(&mut p, t0, 0, 5000, false).is_empty());
        assert_eq!(p.phase(), PresencePhase::Searching);
        assert!(!p.timeout_armed());
    }

    #[test]
    fn short_absence_never_expires() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        assert_eq!(run(&mut p, t0, 0, 500, true), vec![Appeared]);
        assert_eq!(run(&mut p, t0, 500, 2950, false), vec![Lost]);
        assert!(p.timeout_armed());
        assert_eq!(run(&mut p, t0, 2950, 3500, true), vec![Returned]);
        assert!(!p.timeout_armed());
        // Long after the original deadline nothing fires.
        assert_eq!(p.poll(t0 + ms(10_000)), None);
        assert_eq!(p.phase(), PresencePhase::Present);
    }

    #[test]
    fn long_absence_expires_exactly_once() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        run(&mut p, t0, 0, 500, true);
        let seen = run(&mut p, t0, 500, 8000, false);
        assert_eq!(seen, vec![Lost, Expired]);
        assert_eq!(p.phase(), PresencePhase::Unavailable);
    }

    #[test]
    fn expiry_is_exactly_at_grace() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        p.observe(true, t0);
        p.observe(false, t0 + ms(100));
        assert_eq!(p.poll(t0 + ms(2599)), None);
        assert_eq!(p.poll(t0 + ms(2600)), Some(Expired));
        assert_eq!(p.poll(t0 + ms(2700)), None);
    }

    #[test]
    fn repeated_absence_does_not_rearm() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        p.observe(true, t0);
        p.observe(false, t0 + ms(50));
        for t in (100..2500).step_by(50) {
            p.observe(false, t0 + ms(t));
        }
        assert_eq!(p.observe(false, t0 + ms(2550)), Some(Expired));
    }

    #[test]
    fn recovery_from_unavailable() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        p.observe(true, t0);
        p.observe(false, t0 + ms(50));
        assert_eq!(p.poll(t0 + ms(3000)), Some(Expired));
        assert_eq!(p.observe(true, t0 + ms(4000)), Some(Recovered));
        assert!(p.accepts_gestures());
        // A fresh loss starts a fresh grace period.
        assert_eq!(p.observe(false, t0 + ms(4050)), Some(Lost));
        assert_eq!(p.poll(t0 + ms(6000)), None);
        assert_eq!(p.poll(t0 + ms(6550)), Some(Expired));
    }

    #[test]
    fn hand_returning_on_the_expiry_frame_wins() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        let mut seen = Vec::new();
        seen.extend(p.observe(true, t0));
        seen.extend(p.observe(false, t0 + ms(50)));
        // Deadline reached on the very frame the hand returns.
        seen.extend(p.observe(true, t0 + ms(2550)));
        assert_eq!(seen, vec![Appeared, Lost, Returned]);
        assert_eq!(p.phase(), PresencePhase::Present);
        assert!(!p.timeout_armed());
        assert_eq!(p.poll(t0 + ms(10_000)), None);
    }

    #[test]
    fn every_recovery_follows_a_reported_expiry() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        let mut seen = Vec::new();
        seen.extend(p.observe(true, t0));
        seen.extend(p.observe(false, t0 + ms(50)));
        for t in [2550, 2551, 3000] {
            seen.extend(p.observe(true, t0 + ms(t)));
            seen.extend(p.observe(false, t0 + ms(t + 1)));
        }
        seen.extend(p.observe(false, t0 + ms(6000)));
        seen.extend(p.observe(true, t0 + ms(6050)));
        let expired   = seen.iter().filter(|t| **t == Expired).count();
        let recovered = seen.iter().filter(|t| **t == Recovered).count();
        assert_eq!((expired, recovered), (1, 1));
        let at = seen.iter().position(|t| *t == Recovered).unwrap();
        assert_eq!(seen[at - 1], Expired);
    }

    #[test]
    fn gestures_suppressed_while_absent() {
        let t0 = Instant::now();
        let mut p = PresenceTracker::default();
        assert!(!p.accepts_gestures());
        p.observe(true, t0);
        assert!(p.accepts_gestures());
        p.observe(false, t0 + ms(50));
        assert!(!p.accepts_gestures());
        p.poll(t0 + ms(5000));
        assert!(!p.accepts_gestures());
    }
}

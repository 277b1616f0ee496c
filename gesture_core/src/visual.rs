//! Visual feedback state machine.
//!
//! Produces a single [`VisualState`] for an external renderer to read at its
//! own cadence.  Purely observational: nothing here feeds back into
//! classification or dispatch.
//!
//! `Executed` and `Error` are timed.  `Executed` returns to `Idle` after its
//! hold; `Error` returns to `Idle` after its hold only once no sticky fault
//! (hand unavailable, tracker disabled) is still in force.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::timer::Timeout;

// ════════════════════════════════════════════════════════════════════════════
// VisualState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    #[default]
    Idle,
    Detected,
    Stable,
    Gesture,
    Executed,
    Error,
}

impl VisualState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualState::Idle     => "idle",
            VisualState::Detected => "detected",
            VisualState::Stable   => "stable",
            VisualState::Gesture  => "gesture",
            VisualState::Executed => "executed",
            VisualState::Error    => "error",
        }
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Inputs
// ════════════════════════════════════════════════════════════════════════════

/// Failure classes the controller distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// One-off, e.g. the downstream command failed.  Clears on its own.
    Transient,
    /// No hand for the whole grace period.  Holds until a hand returns.
    Unavailable,
    /// Tracker could not start.  Holds for the rest of the session.
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualInput {
    Presence(bool),
    /// A frame with landmarks was processed.
    Landmarks,
    /// Classifier saw a gesture, filter has not confirmed it yet.
    Pending,
    Confirmed,
    Executed,
    Fault(Fault),
    FaultCleared(Fault),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualTransition {
    pub from: VisualState,
    pub to:   VisualState,
}

// ════════════════════════════════════════════════════════════════════════════
// VisualController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct VisualController {
    state:         VisualState,
    revert:        Timeout,
    executed_hold: Duration,
    error_hold:    Duration,
    unavailable:   bool,
    disabled:      bool,
}

impl VisualController {
    pub fn new(executed_hold: Duration, error_hold: Duration) -> Self {
        VisualController {
            state: VisualState::Idle,
            revert: Timeout::new(),
            executed_hold,
            error_hold,
            unavailable: false,
            disabled:    false,
        }
    }

    pub fn state(&self) -> VisualState { self.state }

    /// True while a fault is keeping the controller in `Error`.
    pub fn fault_is_sticky(&self) -> bool {
        self.unavailable || self.disabled
    }

    pub fn apply(&mut self, input: VisualInput, now: Instant) -> Option<VisualTransition> {
        match input {
            VisualInput::Fault(fault) => {
                match fault {
                    Fault::Transient   => {}
                    Fault::Unavailable => self.unavailable = true,
                    Fault::Disabled    => self.disabled = true,
                }
                self.revert.arm(now, self.error_hold);
                return self.set(VisualState::Error);
            }
            VisualInput::FaultCleared(fault) => {
                match fault {
                    Fault::Transient   => {}
                    Fault::Unavailable => self.unavailable = false,
                    Fault::Disabled    => self.disabled = false,
                }
                return self.tick(now);
            }
            _ => {}
        }

        // Error only ends through its own timer.
        if self.state == VisualState::Error {
            return None;
        }

        let next = match input {
            VisualInput::Presence(false) => VisualState::Idle,
            VisualInput::Presence(true) | VisualInput::Landmarks => match self.state {
                VisualState::Idle => VisualState::Detected,
                other             => other,
            },
            VisualInput::Pending => match self.state {
                // Keep the confirmation visible for its full hold.
                VisualState::Executed => VisualState::Executed,
                _                     => VisualState::Stable,
            },
            VisualInput::Confirmed => VisualState::Gesture,
            VisualInput::Executed => {
                self.revert.arm(now, self.executed_hold);
                return self.set(VisualState::Executed);
            }
            VisualInput::Fault(_) | VisualInput::FaultCleared(_) => return None,
        };

        if next != self.state {
            self.revert.cancel();
        }
        self.set(next)
    }

    /// Apply any timed revert that is due.
    pub fn tick(&mut self, now: Instant) -> Option<VisualTransition> {
        match self.state {
            VisualState::Executed if self.revert.fire_if_due(now) => {
                self.set(VisualState::Idle)
            }
            VisualState::Error if !self.fault_is_sticky() && self.revert.is_due(now) => {
                self.revert.cancel();
                self.set(VisualState::Idle)
            }
            _ => None,
        }
    }

    fn set(&mut self, next: VisualState) -> Option<VisualTransition> {
        if next == self.state {
            return None;
        }
        let from = self.state;
        self.state = next;
        Some(VisualTransition { from, to: next })
    }
}

impl Default for VisualController {
    fn default() -> Self {
        VisualController::new(Duration::from_millis(800), Duration::from_millis(1200))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use VisualState::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn starts_idle() {
        assert_eq!(VisualController::default().state(), Idle);
    }

    #[test]
    fn recognition_lifecycle() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        let mut seen = vec![v.state()];
        for input in [
            VisualInput::Presence(true),
            VisualInput::Landmarks,
            VisualInput::Pending,
            VisualInput::Pending,
            VisualInput::Confirmed,
            VisualInput::Executed,
        ] {
            if let Some(t) = v.apply(input, t0) {
                seen.push(t.to);
            }
        }
        assert_eq!(v.tick(t0 + ms(799)), None);
        if let Some(t) = v.tick(t0 + ms(800)) {
            seen.push(t.to);
        }
        assert_eq!(seen, vec![Idle, Detected, Stable, Gesture, Executed, Idle]);
    }

    #[test]
    fn presence_only_lifts_idle() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        v.apply(VisualInput::Pending, t0);
        assert_eq!(v.apply(VisualInput::Presence(true), t0), None);
        assert_eq!(v.state(), Stable);
    }

    #[test]
    fn losing_the_hand_returns_to_idle() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        v.apply(VisualInput::Confirmed, t0);
        let t = v.apply(VisualInput::Presence(false), t0).unwrap();
        assert_eq!((t.from, t.to), (Gesture, Idle));
    }

    #[test]
    fn executed_is_not_cut_short_by_pending_frames() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        v.apply(VisualInput::Executed, t0);
        assert_eq!(v.apply(VisualInput::Pending, t0 + ms(50)), None);
        assert_eq!(v.state(), Executed);
        assert_eq!(v.tick(t0 + ms(800)).map(|t| t.to), Some(Idle));
    }

    #[test]
    fn transient_error_reverts_after_hold() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        v.apply(VisualInput::Presence(true), t0);
        v.apply(VisualInput::Fault(Fault::Transient), t0);
        assert_eq!(v.state(), Error);
        // Hand loss does not override an error.
        assert_eq!(v.apply(VisualInput::Presence(false), t0 + ms(100)), None);
        assert_eq!(v.tick(t0 + ms(1199)), None);
        assert_eq!(v.tick(t0 + ms(1200)).map(|t| t.to), Some(Idle));
    }

    #[test]
    fn unavailable_error_is_sticky_until_cleared() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        v.apply(VisualInput::Fault(Fault::Unavailable), t0);
        assert_eq!(v.tick(t0 + ms(5000)), None);
        assert_eq!(v.state(), Error);
        let t = v.apply(VisualInput::FaultCleared(Fault::Unavailable), t0 + ms(6000)).unwrap();
        assert_eq!(t.to, Idle);
        assert_eq!(v.apply(VisualInput::Presence(true), t0 + ms(6000)).map(|t| t.to), Some(Detected));
    }

    #[test]
    fn cleared_fault_still_honours_minimum_hold() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        v.apply(VisualInput::Fault(Fault::Unavailable), t0);
        assert_eq!(v.apply(VisualInput::FaultCleared(Fault::Unavailable), t0 + ms(300)), None);
        assert_eq!(v.state(), Error);
        assert_eq!(v.tick(t0 + ms(1200)).map(|t| t.to), Some(Idle));
    }

    #[test]
    fn disabled_never_reverts() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        v.apply(VisualInput::Fault(Fault::Disabled), t0);
        assert_eq!(v.tick(t0 + ms(60_000)), None);
        assert_eq!(v.apply(VisualInput::Confirmed, t0 + ms(60_000)), None);
        assert_eq!(v.state(), Error);
    }

    #[test]
    fn repeated_fault_extends_the_hold() {
        let t0 = Instant::now();
        let mut v = VisualController::default();
        v.apply(VisualInput::Fault(Fault::Transient), t0);
        v.apply(VisualInput::Fault(Fault::Transient), t0 + ms(1000));
        assert_eq!(v.tick(t0 + ms(1500)), None);
        assert_eq!(v.tick(t0 + ms(2200)).map(|t| t.to), Some(Idle));
    }
}

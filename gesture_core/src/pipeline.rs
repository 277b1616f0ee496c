//! One gesture-tracking session.
//!
//! `Pipeline` owns every piece of per-session state (run length, cooldown,
//! presence timeout, visual state) and wires the components together:
//!
//! ```text
//!  frame ─▶ throttle ─▶ presence ─▶ classify ─▶ stability ─▶ dispatch ─▶ command
//!                          │            │            │            │
//!                          └────────────┴────────────┴────────────┴──▶ visual
//! ```
//!
//! Everything happens synchronously inside [`Pipeline::process_frame`] and
//! [`Pipeline::tick`]; the host calls the former once per camera frame and
//! the latter from its render loop so timed transitions fire even when no
//! frames arrive.  Nothing here is global, so independent sessions can run
//! side by side.
//!
//! Failures stay inside the gesture path: a tracker that cannot start
//! disables this pipeline and reports once, it never panics or propagates.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::classifier::{classify, GestureLabel};
use crate::config::{ClassifierThresholds, PipelineConfig};
use crate::dispatcher::CommandDispatcher;
use crate::event::PipelineEvent;
use crate::landmark::{Frame, Hand};
use crate::presence::{PresencePhase, PresenceTracker, PresenceTransition};
use crate::stability::StabilityFilter;
use crate::throttle::FrameThrottle;
use crate::visual::{Fault, VisualController, VisualInput, VisualState};

/// Notification shown while no hand has been seen for the grace period.
pub const UNAVAILABLE_MESSAGE: &str = "Gesture control unavailable (no hand detected)";

/// Notification shown once the tracker has failed to start.
pub const TRACKER_FAILED_MESSAGE: &str = "Gesture control unavailable (camera access)";

// ════════════════════════════════════════════════════════════════════════════
// FrameOutcome
// ════════════════════════════════════════════════════════════════════════════

/// What happened to one frame handed to [`Pipeline::process_frame`].
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// Arrived too soon after the previous processed frame; ignored.
    Throttled,
    /// The tracker failed to start earlier in this session.
    Disabled,
    /// No hand in the frame; only presence was updated.
    NoHand,
    Processed {
        label:     GestureLabel,
        confirmed: Option<GestureLabel>,
        command:   Option<&'static str>,
    },
}

// ════════════════════════════════════════════════════════════════════════════
// Pipeline
// ════════════════════════════════════════════════════════════════════════════

pub struct Pipeline {
    thresholds:   ClassifierThresholds,
    throttle:     FrameThrottle,
    stability:    StabilityFilter,
    dispatcher:   CommandDispatcher,
    presence:     PresenceTracker,
    visual:       VisualController,
    notification: Option<String>,
    disabled:     bool,
    tx:           Sender<PipelineEvent>,
}

impl Pipeline {
    /// Start a session and return the receiving end of its event stream.
    pub fn new(config: PipelineConfig) -> (Self, Receiver<PipelineEvent>) {
        let (tx, rx) = mpsc::channel();
        let timing = &config.timing;
        let pipeline = Pipeline {
            throttle:     FrameThrottle::new(timing.frame_interval()),
            stability:    StabilityFilter::new(config.stability.frames),
            dispatcher:   CommandDispatcher::new(timing.cooldown()),
            presence:     PresenceTracker::new(timing.absence_grace()),
            visual:       VisualController::new(timing.executed_hold(), timing.error_hold()),
            thresholds:   config.classifier,
            notification: None,
            disabled:     false,
            tx,
        };
        (pipeline, rx)
    }

    // ── per-frame entry point ─────────────────────────────────────────────

    pub fn process_frame(&mut self, frame: &Frame, now: Instant) -> FrameOutcome {
        if self.disabled {
            return FrameOutcome::Disabled;
        }
        if !self.throttle.admit(now) {
            trace!("frame throttled");
            return FrameOutcome::Throttled;
        }

        // Presence polls its own deadline inside `observe`, so a hand on
        // the expiry frame keeps the session available.
        self.tick_visual(now);

        if let Some(t) = self.presence.observe(frame.has_hand(), now) {
            self.on_presence(t, now);
        }

        let points = match frame {
            Frame::Hand(points) if self.presence.accepts_gestures() => points,
            _ => return FrameOutcome::NoHand,
        };

        self.update_visual(VisualInput::Landmarks, now);

        let label = match Hand::from_points(points) {
            Ok(hand) => classify(&hand, &self.thresholds),
            Err(e) => {
                debug!(error = %e, "malformed landmark set, treating as no gesture");
                GestureLabel::None
            }
        };
        self.emit(PipelineEvent::LabelClassified { label });

        let confirmed = self.stability.filter(label);
        let mut command = None;

        match confirmed {
            Some(gesture) => {
                info!(%gesture, "gesture confirmed");
                self.emit(PipelineEvent::GestureConfirmed { label: gesture });
                self.update_visual(VisualInput::Confirmed, now);

                command = self.dispatcher.dispatch(gesture, now);
                if let Some(cmd) = command {
                    info!(%gesture, command = cmd, "command dispatched");
                    self.emit(PipelineEvent::CommandDispatched { label: gesture, command: cmd });
                    self.update_visual(VisualInput::Executed, now);
                }
            }
            None if !label.is_none() => self.update_visual(VisualInput::Pending, now),
            None => {}
        }

        FrameOutcome::Processed { label, confirmed, command }
    }

    /// Fire any due timeouts.  Call from the render loop or any periodic tick.
    pub fn tick(&mut self, now: Instant) {
        if let Some(t) = self.presence.poll(now) {
            self.on_presence(t, now);
        }
        self.tick_visual(now);
    }

    fn tick_visual(&mut self, now: Instant) {
        if let Some(t) = self.visual.tick(now) {
            self.emit_visual(t.from, t.to);
        }
    }

    // ── host-reported failures ────────────────────────────────────────────

    /// The landmark source could not start (camera permission denied, model
    /// failed to load, …).  Gesture input is switched off for the rest of
    /// the session; repeated reports are ignored.
    pub fn report_init_failure(&mut self, now: Instant, reason: &str) {
        if self.disabled {
            return;
        }
        warn!(reason, "gesture tracker failed to start; gesture input disabled");
        self.disabled = true;
        self.presence.cancel();
        self.stability.reset();
        self.notification = Some(TRACKER_FAILED_MESSAGE.to_string());
        self.emit(PipelineEvent::Error {
            message: format!("gesture tracker failed to start: {reason}"),
        });
        self.update_visual(VisualInput::Fault(Fault::Disabled), now);
    }

    /// The downstream consumer failed to execute a dispatched command.
    pub fn report_command_failure(&mut self, now: Instant, reason: &str) {
        warn!(reason, "gesture command failed");
        self.emit(PipelineEvent::Error { message: format!("command failed: {reason}") });
        self.update_visual(VisualInput::Fault(Fault::Transient), now);
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn visual_state(&self) -> VisualState { self.visual.state() }
    pub fn presence_phase(&self) -> PresencePhase { self.presence.phase() }
    pub fn is_disabled(&self) -> bool { self.disabled }

    /// Current error/notification message, if any.
    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    /// End the session: cancel the pending timeout and drop all state.
    /// The event receiver sees the channel disconnect.
    pub fn shutdown(mut self) {
        self.presence.cancel();
        info!("gesture pipeline shut down");
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn on_presence(&mut self, transition: PresenceTransition, now: Instant) {
        match transition {
            PresenceTransition::Appeared | PresenceTransition::Returned => {}
            PresenceTransition::Recovered => {
                info!("hand back, gesture control available");
                self.notification = None;
                self.emit(PipelineEvent::Available);
                self.update_visual(VisualInput::FaultCleared(Fault::Unavailable), now);
            }
            PresenceTransition::Lost => {
                // A missing hand interrupts any run in progress.
                self.stability.reset();
            }
            PresenceTransition::Expired => {
                warn!("no hand detected for the grace period");
                self.notification = Some(UNAVAILABLE_MESSAGE.to_string());
                self.emit(PipelineEvent::Unavailable { message: UNAVAILABLE_MESSAGE.to_string() });
                self.update_visual(VisualInput::Fault(Fault::Unavailable), now);
            }
        }

        if transition.changes_presence() {
            let has_hand = self.presence.has_hand();
            self.emit(PipelineEvent::PresenceChanged { has_hand });
            self.update_visual(VisualInput::Presence(has_hand), now);
        }
    }

    fn update_visual(&mut self, input: VisualInput, now: Instant) {
        if let Some(t) = self.visual.apply(input, now) {
            self.emit_visual(t.from, t.to);
        }
    }

    fn emit_visual(&self, from: VisualState, to: VisualState) {
        debug!(%from, %to, "visual state");
        self.emit(PipelineEvent::VisualChanged { from, to });
    }

    fn emit(&self, event: PipelineEvent) {
        // A host that dropped its receiver simply stops listening.
        let _ = self.tx.send(event);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Landmark sources.
//!
//! The public interface is [`SourceMessage`] delivered over a `mpsc` channel.
//! The app doesn't need to know whether frames come from a camera tracker or
//! from the keyboard simulator.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use gesture_core::landmark::Frame;
use gesture_core::poses;

// ════════════════════════════════════════════════════════════════════════════
// SourceMessage
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceMessage {
    /// One camera frame's worth of landmarks (or none).
    Frame(Frame),

    /// The tracker could not start.  Sent at most once, before any frame.
    InitFailed(String),

    /// The source has stopped; the app should shut down.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceMessage`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<SourceMessage> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource: keyboard simulation
// ════════════════════════════════════════════════════════════════════════════

/// Camera cadence of the simulated tracker (~30 fps).
pub const SIM_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Hand pose selected from the keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimPose {
    #[default]
    Hidden,
    OpenPalm,
    Fist,
    Pinch,
    Relaxed,
}

impl SimPose {
    pub fn name(&self) -> &'static str {
        match self {
            SimPose::Hidden   => "no hand",
            SimPose::OpenPalm => "open palm",
            SimPose::Fist     => "fist",
            SimPose::Pinch    => "pinch",
            SimPose::Relaxed  => "relaxed",
        }
    }
}

/// Raw input event from the simulation window.
#[derive(Clone, Debug)]
pub enum SimInput {
    Pose(SimPose),
    /// Move the hand in normalised image coordinates.
    Nudge { dx: f32, dy: f32 },
    Quit,
}

/// Landmark source driven by [`SimInput`] events from the visualizer window.
///
/// Whatever pose is currently held is emitted as a frame every
/// [`SIM_FRAME_INTERVAL`], the way a camera tracker keeps reporting a hand
/// that isn't moving.
pub struct SimLandmarkSource {
    pub rx:        Receiver<SimInput>,
    /// Report this start-up failure instead of producing frames.
    pub fail_init: Option<String>,
    pub interval:  Duration,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkSource { rx, fail_init: None, interval: SIM_FRAME_INTERVAL }
    }

    pub fn failing(rx: Receiver<SimInput>, reason: impl Into<String>) -> Self {
        SimLandmarkSource { fail_init: Some(reason.into()), ..SimLandmarkSource::new(rx) }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>) {
        let SimLandmarkSource { rx, fail_init, interval } = *self;

        if let Some(reason) = fail_init {
            info!(%reason, "simulated tracker failed to start");
            let _ = tx.send(SourceMessage::InitFailed(reason));
            // Keep forwarding quit so the window can still close cleanly.
            for input in rx {
                if let SimInput::Quit = input {
                    let _ = tx.send(SourceMessage::Quit);
                    return;
                }
            }
            return;
        }

        let mut pose   = SimPose::default();
        let mut offset = (0.0_f32, 0.0_f32);

        loop {
            loop {
                match rx.try_recv() {
                    Ok(SimInput::Pose(p)) => {
                        debug!(pose = p.name(), "sim pose");
                        pose = p;
                    }
                    Ok(SimInput::Nudge { dx, dy }) => {
                        offset.0 = (offset.0 + dx).clamp(-0.4, 0.4);
                        offset.1 = (offset.1 + dy).clamp(-0.4, 0.4);
                    }
                    Ok(SimInput::Quit) | Err(TryRecvError::Disconnected) => {
                        let _ = tx.send(SourceMessage::Quit);
                        return;
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }

            if tx.send(SourceMessage::Frame(sim_frame(pose, offset))).is_err() {
                return;
            }
            thread::sleep(interval);
        }
    }
}

/// Landmarks for `pose`, shifted by `offset`.
pub fn sim_frame(pose: SimPose, offset: (f32, f32)) -> Frame {
    let points = match pose {
        SimPose::Hidden   => return Frame::NoHand,
        SimPose::OpenPalm => poses::open_palm(),
        SimPose::Fist     => poses::fist(),
        SimPose::Pinch    => poses::pinch(),
        SimPose::Relaxed  => poses::relaxed(),
    };
    Frame::Hand(poses::translate(&points, offset.0, offset.1))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

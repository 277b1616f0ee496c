//! # gesture_core
//!
//! Turns a stream of single-hand landmark frames into debounced command
//! triggers, and tracks a visual-feedback state for a renderer.
//!
//! ## Gesture → Command mapping
//!
//! | Gesture | Pose | Command |
//! |---|---|---|
//! | Open palm | ≥3 of 4 fingertips clearly above their PIP joints | `/wake` |
//! | Fist | fingertips curled in toward the wrist | `/sleep` |
//! | Pinch | thumb tip on index tip, tilted toward the camera | `/confirm` |
//!
//! A gesture must be seen on 8 consecutive processed frames to confirm,
//! and one global 1200 ms cooldown separates dispatched commands.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Instant;
//! use gesture_core::{Frame, Pipeline, PipelineConfig, PipelineEvent};
//!
//! let (mut pipeline, events) = Pipeline::new(PipelineConfig::default());
//!
//! // once per camera frame:
//! pipeline.process_frame(&Frame::Hand(gesture_core::poses::open_palm()), Instant::now());
//!
//! // from the render loop:
//! pipeline.tick(Instant::now());
//! let _colour_key = pipeline.visual_state().as_str();
//!
//! for event in events.try_iter() {
//!     if let PipelineEvent::CommandDispatched { command, .. } = event {
//!         println!("run {command}");
//!     }
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod landmark;
pub mod pipeline;
pub mod poses;
pub mod presence;
pub mod stability;
pub mod throttle;
pub mod timer;
pub mod visual;

pub use classifier::{classify, GestureLabel};
pub use config::{ClassifierThresholds, PipelineConfig};
pub use error::{ConfigError, LandmarkError};
pub use event::PipelineEvent;
pub use landmark::{Frame, Hand, Landmark, LANDMARK_COUNT};
pub use pipeline::{FrameOutcome, Pipeline};
pub use visual::VisualState;

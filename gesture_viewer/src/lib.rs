//! # gesture_viewer
//!
//! Desktop front-end for `gesture_core`: a simulated hand tracker, a
//! particle cloud that mirrors the pipeline's visual state, and a command
//! log fed by a stand-in executor.
//!
//! ## Keyboard
//!
//! | Key | Effect |
//! |---|---|
//! | `1` | Hold an open palm (`/wake`) |
//! | `2` | Hold a fist (`/sleep`) |
//! | `3` | Hold a pinch (`/confirm`) |
//! | `4` | Relaxed hand, no gesture |
//! | `0` / `H` | Remove the hand |
//! | Arrows | Move the hand |
//! | `B` | Toggle the command backend offline / online |
//! | `Q` / `Esc` | Quit |
//!
//! Hold a pose for eight processed frames (about half a second) to fire its
//! command.  Remove the hand for longer than the grace period to see the
//! unavailable notice.

pub mod source;
pub mod particles;
pub mod visualizer;
pub mod app;

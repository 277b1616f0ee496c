//! Events emitted by a [`Pipeline`](crate::pipeline::Pipeline).
//!
//! The host receives these over the `mpsc` channel returned when the
//! pipeline is created.  Consumers don't need to know which component
//! produced an event; the set is closed and every variant is listed here.

use std::fmt;

use serde::Serialize;

use crate::classifier::GestureLabel;
use crate::visual::VisualState;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// The hand appeared or disappeared.
    PresenceChanged { has_hand: bool },

    /// Raw per-frame classification, before debouncing.
    LabelClassified { label: GestureLabel },

    /// The stability filter completed a run of identical labels.
    GestureConfirmed { label: GestureLabel },

    /// A command passed the cooldown gate and should be executed.
    CommandDispatched { label: GestureLabel, command: &'static str },

    /// No hand for the whole grace period.  Raised once per entry.
    Unavailable { message: String },

    /// Gesture control is usable again; any notification is cleared.
    Available,

    /// Tracker start-up failure or a failed command.
    Error { message: String },

    /// The visual state changed.
    VisualChanged { from: VisualState, to: VisualState },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::PresenceChanged { has_hand } => {
                write!(f, "presence   {}", if *has_hand { "hand" } else { "no hand" })
            }
            PipelineEvent::LabelClassified { label }   => write!(f, "classified {label}"),
            PipelineEvent::GestureConfirmed { label }  => write!(f, "confirmed  {label}"),
            PipelineEvent::CommandDispatched { label, command } => {
                write!(f, "command    {command}  ({label})")
            }
            PipelineEvent::Unavailable { message } => write!(f, "notice     {message}"),
            PipelineEvent::Available               => write!(f, "notice     cleared"),
            PipelineEvent::Error { message }       => write!(f, "error      {message}"),
            PipelineEvent::VisualChanged { from, to } => write!(f, "visual     {from} -> {to}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let event = PipelineEvent::CommandDispatched { label: GestureLabel::Fist, command: "/sleep" };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "command_dispatched");
        assert_eq!(json["label"], "fist");
        assert_eq!(json["command"], "/sleep");

        let json = serde_json::to_value(PipelineEvent::VisualChanged {
            from: VisualState::Idle,
            to:   VisualState::Detected,
        }).unwrap();
        assert_eq!(json["to"], "detected");
        assert_eq!(serde_json::to_value(PipelineEvent::Available).unwrap()["event"], "available");
    }

    #[test]
    fn display_is_one_line() {
        let event = PipelineEvent::Unavailable { message: "no hand".into() };
        assert_eq!(event.to_string(), "notice     no hand");
    }
}

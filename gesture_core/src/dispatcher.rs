//! Confirmed gesture → command string, behind one global cooldown.
//!
//! The cooldown is shared by every gesture: a different gesture confirmed
//! inside the window is dropped, not queued.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::classifier::GestureLabel;

// ════════════════════════════════════════════════════════════════════════════
// CommandMap
// ════════════════════════════════════════════════════════════════════════════

static COMMANDS: [(GestureLabel, &str); 3] = [
    (GestureLabel::OpenPalm, "/wake"),
    (GestureLabel::Fist,     "/sleep"),
    (GestureLabel::Pinch,    "/confirm"),
];

/// Fixed gesture → command table.  `None` has no entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandMap;

impl CommandMap {
    pub fn command_for(&self, label: GestureLabel) -> Option<&'static str> {
        COMMANDS.iter()
            .find(|(l, _)| *l == label)
            .map(|(_, cmd)| *cmd)
    }

    pub fn entries(&self) -> &'static [(GestureLabel, &'static str)] {
        &COMMANDS
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CommandDispatcher
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    map:          CommandMap,
    cooldown:     Duration,
    last_trigger: Option<Instant>,
}

impl CommandDispatcher {
    pub fn new(cooldown: Duration) -> Self {
        CommandDispatcher {
            map: CommandMap,
            cooldown,
            last_trigger: None,
        }
    }

    /// Returns the command for `label`, or `None` if it has no mapping or
    /// the cooldown since the last dispatched command has not yet elapsed.
    pub fn dispatch(&mut self, label: GestureLabel, now: Instant) -> Option<&'static str> {
        let command = self.map.command_for(label)?;

        if let Some(last) = self.last_trigger {
            let since = now.saturating_duration_since(last);
            if since <= self.cooldown {
                debug!(%label, ?since, "gesture dropped by cooldown");
                return None;
            }
        }

        self.last_trigger = Some(now);
        Some(command)
    }

    pub fn last_trigger(&self) -> Option<Instant> { self.last_trigger }
    pub fn cooldown(&self) -> Duration { self.cooldown }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        CommandDispatcher::new(Duration::from_millis(1200))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

//! Top-level application state.
//!
//! `AppState` owns the `Pipeline`, its event receiver, the particle cloud,
//! and a stand-in command executor.  It feeds source messages into the
//! pipeline, reacts to pipeline events, and drives the visualizer each frame.

use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use tracing::{info, warn};

use gesture_core::landmark::{Frame, Hand, Landmark};
use gesture_core::{GestureLabel, Pipeline, PipelineConfig, PipelineEvent, VisualState};

use crate::particles::ParticleCloud;
use crate::source::{spawn_landmark_source, SimInput, SimLandmarkSource, SourceMessage};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

pub struct AppConfig {
    pub pipeline:       PipelineConfig,
    pub particle_count: usize,
    /// Entries kept in the on-screen command log.
    pub log_capacity:   usize,
    /// Start the simulated tracker in a failed state.
    pub fail_init:      Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            pipeline:       PipelineConfig::default(),
            particle_count: 400,
            log_capacity:   8,
            fail_init:      None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Command executor
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum ExecError {
    Offline,
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Offline => write!(f, "command backend offline"),
        }
    }
}

impl std::error::Error for ExecError {}

/// Stands in for whatever would actually run `/wake`, `/sleep`, `/confirm`.
#[derive(Debug)]
pub struct CommandExecutor {
    online:   bool,
    executed: Vec<&'static str>,
}

impl CommandExecutor {
    pub fn new() -> Self {
        CommandExecutor { online: true, executed: Vec::new() }
    }

    pub fn execute(&mut self, command: &'static str) -> Result<(), ExecError> {
        if !self.online {
            return Err(ExecError::Offline);
        }
        self.executed.push(command);
        Ok(())
    }

    pub fn is_online(&self) -> bool { self.online }
    pub fn set_online(&mut self, online: bool) { self.online = online; }
    pub fn executed(&self) -> &[&'static str] { &self.executed }
}

impl Default for CommandExecutor {
    fn default() -> Self { Self::new() }
}

// ════════════════════════════════════════════════════════════════════════════
// Command log
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub command: &'static str,
    pub label:   GestureLabel,
    pub ok:      bool,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.ok { "ok" } else { "failed" };
        write!(f, "{} {} {}", self.command, self.label, mark)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    pipeline:     Pipeline,
    events:       Receiver<PipelineEvent>,
    particles:    ParticleCloud,
    executor:     CommandExecutor,

    // ── what the renderer shows ──────────────────────────────────────────
    hand:         Option<Vec<Landmark>>,
    log:          VecDeque<LogEntry>,
    log_capacity: usize,
    last_label:   GestureLabel,
    pub status:   String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Self {
        let (pipeline, events) = Pipeline::new(cfg.pipeline);
        AppState {
            pipeline,
            events,
            particles:    ParticleCloud::new(cfg.particle_count),
            executor:     CommandExecutor::new(),
            hand:         None,
            log:          VecDeque::with_capacity(cfg.log_capacity),
            log_capacity: cfg.log_capacity.max(1),
            last_label:   GestureLabel::None,
            status:       "Ready: show a hand".to_string(),
        }
    }

    // ── source messages ──────────────────────────────────────────────────

    /// Feed one source message.  Returns false once the source has quit.
    pub fn handle_source(&mut self, msg: SourceMessage, now: Instant) -> bool {
        match msg {
            SourceMessage::Frame(frame) => {
                self.hand = match &frame {
                    Frame::Hand(points) => Some(points.clone()),
                    Frame::NoHand       => None,
                };
                self.pipeline.process_frame(&frame, now);
            }
            SourceMessage::InitFailed(reason) => {
                self.hand = None;
                self.pipeline.report_init_failure(now, &reason);
            }
            SourceMessage::Quit => return false,
        }
        true
    }

    pub fn toggle_backend(&mut self) {
        let online = !self.executor.is_online();
        self.executor.set_online(online);
        info!(online, "command backend toggled");
        self.status = if online { "Backend online" } else { "Backend offline" }.to_string();
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) {
        self.pipeline.tick(now);
        self.drain_events(now);

        let centroid = self.hand.as_deref()
            .filter(|_| !self.pipeline.is_disabled())
            .and_then(|points| Hand::from_points(points).ok())
            .map(|hand| hand.centroid());
        self.particles.follow(centroid);
        self.particles.tick();
    }

    fn drain_events(&mut self, now: Instant) {
        // A failed command feeds an error back in, so keep going until quiet.
        loop {
            let batch: Vec<PipelineEvent> = self.events.try_iter().collect();
            if batch.is_empty() {
                return;
            }
            for event in batch {
                self.handle_event(event, now);
            }
        }
    }

    fn handle_event(&mut self, event: PipelineEvent, now: Instant) {
        match event {
            PipelineEvent::VisualChanged { to, .. } => self.particles.set_state(to),
            PipelineEvent::LabelClassified { label } => self.last_label = label,
            PipelineEvent::GestureConfirmed { label } => {
                self.status = format!("Gesture: {label}");
            }
            PipelineEvent::CommandDispatched { label, command } => {
                let ok = match self.executor.execute(command) {
                    Ok(()) => {
                        info!(command, "command executed");
                        self.status = format!("Ran {command}");
                        true
                    }
                    Err(e) => {
                        warn!(command, error = %e, "command failed");
                        self.pipeline.report_command_failure(now, &e.to_string());
                        self.status = format!("{command} failed: {e}");
                        false
                    }
                };
                self.push_log(LogEntry { command, label, ok });
            }
            PipelineEvent::Unavailable { message } => self.status = message,
            PipelineEvent::Available => self.status = "Hand detected".to_string(),
            PipelineEvent::Error { message } => self.status = message,
            PipelineEvent::PresenceChanged { .. } => {}
        }
    }

    fn push_log(&mut self, entry: LogEntry) {
        if self.log.len() >= self.log_capacity {
            self.log.pop_front();
        }
        self.log.push_back(entry);
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn visual_state(&self) -> VisualState              { self.pipeline.visual_state() }
    pub fn notification(&self) -> Option<&str>             { self.pipeline.notification() }
    pub fn particles(&self)    -> &ParticleCloud           { &self.particles }
    pub fn hand(&self)         -> Option<&[Landmark]>      { self.hand.as_deref() }
    pub fn log(&self)          -> &VecDeque<LogEntry>      { &self.log }
    pub fn last_label(&self)   -> GestureLabel             { self.last_label }
    pub fn backend_online(&self) -> bool                   { self.executor.is_online() }
    pub fn executor(&self)     -> &CommandExecutor         { &self.executor }

    pub fn shutdown(self) {
        self.pipeline.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the viewer until the window closes or the source quits.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let source = match &cfg.fail_init {
        Some(reason) => SimLandmarkSource::failing(sim_rx, reason.clone()),
        None         => SimLandmarkSource::new(sim_rx),
    };
    let source_rx = spawn_landmark_source(source);

    let mut vis = Visualizer::new(sim_tx)?;
    let mut app = AppState::new(cfg);

    'main: while vis.is_open() {
        let input = vis.poll_input();
        if input.quit { break; }
        if input.toggle_backend { app.toggle_backend(); }

        loop {
            match source_rx.try_recv() {
                Ok(msg) => {
                    if !app.handle_source(msg, Instant::now()) { break 'main; }
                }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => break 'main,
            }
        }

        app.tick(Instant::now());
        vis.render(&app);
    }

    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use gesture_core::poses;
    use crate::particles::{state_color, BURST_SCALE};

    fn make_app() -> AppState {
        AppState::new(AppConfig::default())
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    /// Feed `count` frames of `points` 60 ms apart starting at `from`,
    /// ticking after each.  Returns the time of the next slot.
    fn hold(app: &mut AppState, points: &[Landmark], from: Instant, count: u64) -> Instant {
        for i in 0..count {
            let now = from + ms(i * 60);
            app.handle_source(SourceMessage::Frame(Frame::Hand(points.to_vec())), now);
            app.tick(now);
        }
        from + ms(count * 60)
    }

    #[test]
    fn held_palm_runs_wake_once() {
        let t0 = Instant::now();
        let mut app = make_app();
        hold(&mut app, &poses::open_palm(), t0, 8);

        assert_eq!(app.executor().executed(), &["/wake"]);
        assert_eq!(app.log().len(), 1);
        assert!(app.log()[0].ok);
        assert_eq!(app.visual_state(), VisualState::Executed);
        assert_eq!(app.particles().scale, BURST_SCALE);
        assert_eq!(app.particles().color, state_color(VisualState::Executed));
    }

    #[test]
    fn offline_backend_logs_failure_and_shows_error() {
        let t0 = Instant::now();
        let mut app = make_app();
        app.toggle_backend();
        assert!(!app.backend_online());

        hold(&mut app, &poses::fist(), t0, 8);

        assert!(app.executor().executed().is_empty());
        assert_eq!(app.log().back().map(|e| e.ok), Some(false));
        assert_eq!(app.visual_state(), VisualState::Error);
        assert_eq!(app.particles().color, state_color(VisualState::Error));
    }

    #[test]
    fn init_failure_disables_and_notifies() {
        let t0 = Instant::now();
        let mut app = make_app();
        assert!(app.handle_source(SourceMessage::InitFailed("denied".into()), t0));
        app.tick(t0);
        assert_eq!(app.visual_state(), VisualState::Error);
        assert_eq!(app.notification(), Some(gesture_core::pipeline::TRACKER_FAILED_MESSAGE));

        hold(&mut app, &poses::open_palm(), t0 + ms(100), 10);
        assert!(app.executor().executed().is_empty());
    }

    #[test]
    fn losing_the_hand_clears_landmarks() {
        let t0 = Instant::now();
        let mut app = make_app();
        let next = hold(&mut app, &poses::relaxed(), t0, 2);
        assert!(app.hand().is_some());
        app.handle_source(SourceMessage::Frame(Frame::NoHand), next);
        app.tick(next);
        assert!(app.hand().is_none());
        assert_eq!(app.visual_state(), VisualState::Idle);
    }

    #[test]
    fn log_keeps_most_recent_entries() {
        let t0 = Instant::now();
        let mut app = AppState::new(AppConfig { log_capacity: 2, ..AppConfig::default() });
        let mut now = t0;
        for pose in [poses::open_palm(), poses::fist(), poses::pinch()] {
            now = hold(&mut app, &pose, now, 8);
            // Let the cooldown lapse between gestures.
            now += ms(1300);
        }
        let commands: Vec<_> = app.log().iter().map(|e| e.command).collect();
        assert_eq!(commands, vec!["/sleep", "/confirm"]);
    }

    #[test]
    fn particles_drift_toward_the_hand() {
        let t0 = Instant::now();
        let mut app = make_app();
        let points = poses::translate(&poses::relaxed(), -0.2, 0.0);
        let target = Hand::from_points(&points).unwrap().centroid();
        hold(&mut app, &points, t0, 40);
        let (cx, cy) = app.particles().center;
        assert!((cx - target.0).abs() < 1e-3);
        assert!((cy - target.1).abs() < 1e-3);
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = make_app();
        assert!(!app.handle_source(SourceMessage::Quit, Instant::now()));
    }
}

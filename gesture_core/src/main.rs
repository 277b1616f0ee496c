//! gesture_replay: headless host that feeds recorded frames through a
//! pipeline and prints what comes out.
//!
//! Input is JSON lines, one frame per line:
//!
//! ```text
//! {"t_ms": 0,    "hand": [[0.50, 0.80, 0.0], … 21 points …]}
//! {"t_ms": 60,   "hand": null}
//! {"t_ms": 0,    "init_error": "camera permission denied"}
//! {"t_ms": 900,  "command_failed": "backend unreachable"}
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;

use gesture_core::{poses, Frame, Landmark, Pipeline, PipelineConfig, PipelineEvent};

/// Interval between ticks after the last frame.
const TAIL_STEP_MS: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "gesture_replay", about = "Replay landmark frames through the gesture pipeline")]
struct Cli {
    /// JSON-lines frame file (stdin when omitted)
    input: Option<PathBuf>,

    /// Pipeline config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a built-in scenario instead of reading frames
    #[arg(long, conflicts_with = "input")]
    demo: bool,

    /// Print events as JSON objects
    #[arg(long)]
    json: bool,

    /// Include per-frame classification events
    #[arg(long)]
    labels: bool,

    /// Only print the summary
    #[arg(long, conflicts_with = "json")]
    quiet: bool,

    /// Keep ticking this long after the last frame so timed transitions show
    #[arg(long, default_value_t = 1500)]
    tail_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ReplayLine {
    t_ms: u64,
    #[serde(default)]
    hand: Option<Vec<Landmark>>,
    #[serde(default)]
    init_error: Option<String>,
    #[serde(default)]
    command_failed: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_core=warn,gesture_replay=info".into()),
        )
        .init();

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let lines = if cli.demo {
        demo_scenario()
    } else {
        match &cli.input {
            Some(p) => read_lines(BufReader::new(
                File::open(p).with_context(|| format!("opening {}", p.display()))?,
            ))?,
            None => read_lines(io::stdin().lock())?,
        }
    };
    if lines.is_empty() {
        bail!("no frames to replay");
    }

    let out = match (cli.quiet, cli.json) {
        (true, _)      => Output::Quiet,
        (false, true)  => Output::Json,
        (false, false) => Output::Text,
    };
    let mut printer = Printer::new(out, cli.labels);
    let final_state = replay(config, &lines, cli.tail_ms, &mut printer)?;

    info!(
        frames = lines.len(),
        commands = printer.commands.len(),
        %final_state,
        "replay finished"
    );
    if !cli.json {
        println!("commands: {}", printer.commands.join(" "));
        println!("unavailable notices: {}", printer.unavailable);
    }
    Ok(())
}

/// Feed every line through a fresh pipeline, then keep ticking for
/// `tail_ms` so timed transitions show.  Returns the final visual state.
fn replay(
    config:  PipelineConfig,
    lines:   &[ReplayLine],
    tail_ms: u64,
    printer: &mut Printer,
) -> Result<gesture_core::VisualState> {
    let (mut pipeline, events) = Pipeline::new(config);
    let start = Instant::now();

    for line in lines {
        let now = at(start, line.t_ms)?;

        if let Some(reason) = &line.init_error {
            pipeline.tick(now);
            pipeline.report_init_failure(now, reason);
        } else if let Some(reason) = &line.command_failed {
            pipeline.tick(now);
            pipeline.report_command_failure(now, reason);
        } else {
            pipeline.process_frame(&Frame::from(line.hand.clone()), now);
        }
        printer.drain(line.t_ms, &events)?;
    }

    let last = lines.iter().map(|l| l.t_ms).max().unwrap_or(0);
    for t in (last..=last.saturating_add(tail_ms)).step_by(TAIL_STEP_MS) {
        pipeline.tick(at(start, t)?);
        printer.drain(t, &events)?;
    }

    let final_state = pipeline.visual_state();
    pipeline.shutdown();
    Ok(final_state)
}

fn at(start: Instant, t_ms: u64) -> Result<Instant> {
    start.checked_add(Duration::from_millis(t_ms))
        .with_context(|| format!("t_ms {t_ms} is out of range"))
}

/// Parse JSON-lines frames; blank lines and `#` comments are skipped.
fn read_lines(reader: impl BufRead) -> Result<Vec<ReplayLine>> {
    let mut lines = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.context("reading frames")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parsed: ReplayLine = serde_json::from_str(trimmed)
            .with_context(|| format!("line {}: not a frame", n + 1))?;
        lines.push(parsed);
    }
    Ok(lines)
}

/// Hold an open palm long enough to wake, relax, then drop the hand for
/// longer than the grace period.
fn demo_scenario() -> Vec<ReplayLine> {
    let frame = |t_ms: u64, hand: Option<Vec<Landmark>>| ReplayLine {
        t_ms,
        hand,
        init_error: None,
        command_failed: None,
    };

    let mut lines: Vec<ReplayLine> = (0..8).map(|i| frame(i * 60, Some(poses::open_palm()))).collect();
    lines.extend((8..12).map(|i| frame(i * 60, Some(poses::relaxed()))));
    lines.extend((12..60).map(|i| frame(i * 60, None)));
    lines
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    Text,
    Json,
    Quiet,
}

/// Prints events as they drain and tallies what the summary needs.
struct Printer {
    out:         Output,
    labels:      bool,
    commands:    Vec<&'static str>,
    unavailable: usize,
}

impl Printer {
    fn new(out: Output, labels: bool) -> Self {
        Printer { out, labels, commands: Vec::new(), unavailable: 0 }
    }

    fn drain(&mut self, t_ms: u64, events: &Receiver<PipelineEvent>) -> Result<()> {
        for event in events.try_iter() {
            match &event {
                PipelineEvent::CommandDispatched { command, .. } => self.commands.push(*command),
                PipelineEvent::Unavailable { .. } => self.unavailable += 1,
                _ => {}
            }
            if !self.labels && matches!(event, PipelineEvent::LabelClassified { .. }) {
                continue;
            }
            match self.out {
                Output::Json => {
                    let mut value = serde_json::to_value(&event)?;
                    value["t_ms"] = t_ms.into();
                    println!("{value}");
                }
                Output::Text  => println!("[{t_ms:>6} ms] {event}"),
                Output::Quiet => {}
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

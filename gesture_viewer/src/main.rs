//! gesture_viewer: interactive entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gesture_core::PipelineConfig;
use gesture_viewer::app::{run, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "gesture_viewer", about = "Hand-gesture command demo with a particle visualizer")]
struct Cli {
    /// Pipeline config (TOML); defaults apply to anything left out
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of particles in the cloud
    #[arg(long, default_value_t = 400)]
    particles: usize,

    /// Start with the simulated tracker failing, as if camera access was denied
    #[arg(long, value_name = "REASON")]
    fail_init: Option<String>,

    /// Skip the banner
    #[arg(long)]
    quick: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_core=info,gesture_viewer=info".into()),
        )
        .init();

    if !cli.quick {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║          Gesture Viewer: hand gestures to commands           ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("  1=palm (/wake)  2=fist (/sleep)  3=pinch (/confirm)  0=hide");
        println!("  B toggles the command backend, Q quits.");
        println!();
    }

    let pipeline = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    info!(
        frames = pipeline.stability.frames,
        cooldown_ms = pipeline.timing.cooldown_ms,
        "starting viewer"
    );

    run(AppConfig {
        pipeline,
        particle_count: cli.particles,
        fail_init: cli.fail_init,
        ..AppConfig::default()
    })
}

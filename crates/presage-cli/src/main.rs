use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use presage_core::ProgressRing;

mod config;
mod replay;
mod setup;

use config::Config;

#[derive(Parser)]
#[command(name = "presage", version, about = "Movement-based liveness capture")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the detector weight files and record integrity digests
    Setup {
        /// Target directory (default: $XDG_DATA_HOME/presage/models)
        #[arg(long)]
        model_dir: Option<String>,
    },
    /// Run a liveness session over a recorded detection trace
    Replay {
        /// JSON trace of per-tick detection results
        #[arg(long)]
        trace: PathBuf,
        /// Directory of PNG frames replayed in filename order
        #[arg(long)]
        frames: Option<PathBuf>,
        /// Where to write the captured still
        #[arg(long, default_value = "captured.png")]
        out: PathBuf,
        /// Tick cadence in milliseconds (default from PRESAGE_TICK_INTERVAL_MS)
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Abandon the session after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Emit the circular progress ring as an SVG document
    Ring {
        /// Progress value in [0, 100]
        #[arg(long)]
        progress: f32,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Setup { model_dir } => setup::run(model_dir, &config.model_dir),
        Command::Replay {
            trace,
            frames,
            out,
            tick_ms,
            timeout_secs,
        } => {
            replay::run(replay::ReplayArgs {
                trace,
                frames,
                out,
                tick_interval: tick_ms
                    .map(Duration::from_millis)
                    .unwrap_or(config.tick_interval),
                timeout: Duration::from_secs(
                    timeout_secs.unwrap_or(config.session_timeout_secs),
                ),
                model_dir: config.model_dir,
            })
            .await
        }
        Command::Ring { progress, out } => {
            let svg = ProgressRing::default().to_svg(progress);
            match out {
                Some(path) => std::fs::write(&path, svg)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{svg}"),
            }
            Ok(())
        }
    }
}

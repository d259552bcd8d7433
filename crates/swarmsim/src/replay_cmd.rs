//! The `replay` subcommand: re-emit a recorded telemetry log.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use swarm_engine::replay_file;
use swarm_sink::EventSink;

use crate::sinks;

#[derive(Args)]
pub struct ReplayArgs {
    /// Path to the JSONL telemetry log.
    #[arg(long)]
    input: PathBuf,

    /// Playback speed multiplier; `0` disables pacing entirely.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Print rows to stdout instead of the columnar store.
    #[arg(long)]
    print_only: bool,
}

pub fn run(args: ReplayArgs) -> Result<()> {
    let mut sink = sinks::replay_sink(args.print_only)?;
    info!(input = %args.input.display(), speed = args.speed, "replaying telemetry log");

    replay_file(&args.input, sink.as_mut(), args.speed)
        .with_context(|| format!("replay of {} failed", args.input.display()))?;
    sink.close()?;
    Ok(())
}

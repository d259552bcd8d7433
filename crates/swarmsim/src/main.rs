//! swarmsim — real-time tactical drone-swarm simulator.
//!
//! Two subcommands:
//!
//! - `simulate` drives the tick engine against the configured fleets and
//!   emits telemetry, detections, swarm events, and simulation state to the
//!   chosen sinks until a termination signal arrives.
//! - `replay` re-emits a previously recorded JSONL telemetry log, paced by
//!   the original timestamps.

mod config;
mod replay_cmd;
mod simulate;
mod sinks;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "swarmsim", version, about = "Real-time tactical drone-swarm simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the real-time simulator until interrupted.
    Simulate(simulate::SimulateArgs),
    /// Re-emit a recorded telemetry log through a sink.
    Replay(replay_cmd::ReplayArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "swarmsim=info,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Simulate(args) => simulate::run(args).await,
        Command::Replay(args) => {
            // The store sink is a blocking HTTP client; keep it off the
            // async worker threads.
            tokio::task::spawn_blocking(move || replay_cmd::run(args)).await?
        }
    }
}

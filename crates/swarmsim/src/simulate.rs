//! The `simulate` subcommand: wire sinks, build the engine, drive the tick
//! loop until a termination signal.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use tracing::{error, info};

use swarm_core::WallClock;
use swarm_engine::{run as run_engine, ShutdownToken, Simulator};

use crate::config;
use crate::sinks;

#[derive(Args)]
pub struct SimulateArgs {
    /// Path to the simulation configuration YAML.
    #[arg(long, default_value = "config/simulation.yaml")]
    config: PathBuf,

    /// Schema file consumed by the external config validator.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Tick interval (e.g. 500ms, 2s).  Env: TICK_INTERVAL.
    #[arg(long, default_value = "1s")]
    tick: String,

    /// Print rows to stdout instead of the columnar store.
    #[arg(long)]
    print_only: bool,

    /// Colorized human-friendly stdout output instead of JSON lines.
    #[arg(long)]
    pretty: bool,

    /// JSONL log-file prefix; sibling files carry the other streams.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enemy detection stream.  Env: ENABLE_DETECTIONS.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    detections: bool,

    /// Swarm event stream.  Env: ENABLE_SWARM_EVENTS.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    swarm_events: bool,

    /// Drone movement telemetry stream.  Env: ENABLE_MOVEMENT_METRICS.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    movement_metrics: bool,

    /// Simulation state stream.  Env: ENABLE_SIMULATION_STATE.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    simulation_state: bool,

    /// PRNG seed; identical seeds replay identical runs.
    #[arg(long)]
    seed: Option<u64>,
}

pub async fn run(args: SimulateArgs) -> Result<()> {
    let mut cfg = config::load(&args.config, args.schema.as_deref())?;

    cfg.streams.telemetry = config::env_bool("ENABLE_MOVEMENT_METRICS", args.movement_metrics);
    cfg.streams.detections = config::env_bool("ENABLE_DETECTIONS", args.detections);
    cfg.streams.swarm_events = config::env_bool("ENABLE_SWARM_EVENTS", args.swarm_events);
    cfg.streams.simulation_state =
        config::env_bool("ENABLE_SIMULATION_STATE", args.simulation_state);

    let tick_interval = match std::env::var("TICK_INTERVAL") {
        Ok(v) if !v.is_empty() => config::parse_duration(&v).context("TICK_INTERVAL")?,
        _ => config::parse_duration(&args.tick).context("--tick")?,
    };

    let cluster_id =
        std::env::var("CLUSTER_ID").ok().filter(|v| !v.is_empty()).unwrap_or_else(|| {
            "mission-01".to_owned()
        });

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    let token = ShutdownToken::new();
    let worker_token = token.clone();
    let print_only = args.print_only;
    let pretty = args.pretty;
    let log_file = args.log_file.clone();

    // Sink construction and the tick loop both perform blocking I/O; keep
    // them off the async worker threads.
    let mut worker = tokio::task::spawn_blocking(move || -> Result<()> {
        let sink = sinks::build(&cfg, print_only, pretty, log_file.as_deref())?;
        let mut sim = Simulator::new(
            cluster_id,
            cfg,
            sink,
            tick_interval,
            seed,
            WallClock::system(),
        )?;
        sim.publish_missions();

        let sim = Arc::new(Mutex::new(sim));
        run_engine(&sim, &worker_token);

        match sim.lock() {
            Ok(mut s) => s.close()?,
            Err(e) => error!(err = %e, "engine mutex poisoned at shutdown"),
        }
        Ok(())
    });

    tokio::select! {
        // Startup failure or an unexpected worker exit.
        res = &mut worker => res??,
        _ = tokio::signal::ctrl_c() => {
            info!("termination signal received");
            token.cancel();
            worker.await??;
        }
    }

    info!("drone simulation stopped");
    Ok(())
}

//! Sink wiring from flags and environment.
//!
//! Without a `GREPTIMEDB_ENDPOINT` (or with `--print-only`) everything goes
//! to stdout; otherwise the columnar store is the primary sink.  A
//! `--log-file` prefix layers a JSONL file sink behind the primary one, so
//! a store outage is observed before the local log diverges.

use std::path::Path;

use anyhow::{Context, Result};

use swarm_core::SimulationConfig;
use swarm_sink::{
    ColorStdoutSink, EventSink, FileSink, GreptimeSink, MultiSink, StdoutSink, StoreTables,
};

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn tables_from_env() -> StoreTables {
    let mut tables = StoreTables::default();
    if let Some(t) = env_nonempty("GREPTIMEDB_TABLE") {
        tables.telemetry = t;
    }
    if let Some(t) = env_nonempty("ENEMY_DETECTION_TABLE") {
        tables.detections = t;
    }
    if let Some(t) = env_nonempty("SWARM_EVENT_TABLE") {
        tables.swarm_events = t;
    }
    if let Some(t) = env_nonempty("SIMULATION_STATE_TABLE") {
        tables.state = t;
    }
    if let Some(t) = env_nonempty("MISSIONS_TABLE") {
        tables.missions = t;
    }
    tables
}

/// The primary sink: the columnar store when an endpoint is configured,
/// stdout (JSON or colorized) otherwise.
fn base_sink(cfg: &SimulationConfig, print_only: bool, pretty: bool) -> Result<Box<dyn EventSink>> {
    let stdout_sink = || -> Box<dyn EventSink> {
        if pretty {
            Box::new(ColorStdoutSink::new(cfg.clone()))
        } else {
            Box::new(StdoutSink)
        }
    };
    if print_only {
        return Ok(stdout_sink());
    }
    match env_nonempty("GREPTIMEDB_ENDPOINT") {
        Some(endpoint) => {
            let sink = GreptimeSink::connect(&endpoint, "public", tables_from_env())
                .with_context(|| format!("cannot reach columnar store at {endpoint}"))?;
            Ok(Box::new(sink))
        }
        None => Ok(stdout_sink()),
    }
}

/// Assemble the fan-out for a simulation run.
pub fn build(
    cfg: &SimulationConfig,
    print_only: bool,
    pretty: bool,
    log_file: Option<&Path>,
) -> Result<MultiSink> {
    let mut multi = MultiSink::new(vec![base_sink(cfg, print_only, pretty)?]);
    if let Some(prefix) = log_file {
        let file = FileSink::create(prefix)
            .with_context(|| format!("cannot create log files at {}", prefix.display()))?;
        multi.push(Box::new(file));
    }
    Ok(multi)
}

/// The sink a replay writes into; replays always print plain JSON in
/// stdout mode.
pub fn replay_sink(print_only: bool) -> Result<Box<dyn EventSink>> {
    base_sink(&SimulationConfig::default(), print_only, false)
}

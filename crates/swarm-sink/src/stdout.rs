//! Structured stdout sink: one JSON object per line.

use std::io::Write;

use serde::Serialize;

use swarm_enemy::DetectionRow;
use swarm_telemetry::{MissionRow, SimulationStateRow, SwarmEventRow, TelemetryRow};

use crate::sink::EventSink;
use crate::SinkResult;

/// Prints every stream to standard output as JSON lines.
#[derive(Default)]
pub struct StdoutSink;

fn print_line<T: Serialize>(row: &T) -> SinkResult<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, row)?;
    out.write_all(b"\n")?;
    Ok(())
}

impl EventSink for StdoutSink {
    fn write_telemetry(&mut self, row: &TelemetryRow) -> SinkResult<()> {
        print_line(row)
    }

    fn write_detection(&mut self, row: &DetectionRow) -> SinkResult<()> {
        print_line(row)
    }

    fn write_swarm_event(&mut self, row: &SwarmEventRow) -> SinkResult<()> {
        print_line(row)
    }

    fn write_state(&mut self, row: &SimulationStateRow) -> SinkResult<()> {
        print_line(row)
    }

    fn write_mission(&mut self, row: &MissionRow) -> SinkResult<()> {
        print_line(row)
    }

    fn close(&mut self) -> SinkResult<()> {
        std::io::stdout().flush()?;
        Ok(())
    }
}

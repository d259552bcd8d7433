//! The `EventSink` trait implemented by every output backend.

use swarm_enemy::DetectionRow;
use swarm_telemetry::{MissionRow, SimulationStateRow, SwarmEventRow, TelemetryRow};

use crate::SinkResult;

/// A destination for simulator output streams.
///
/// Per-stream single-row methods default to no-ops, so a sink implements
/// only the streams it carries — the engine probes nothing and simply calls
/// everything.  Batch methods default to a row-by-row loop; backends with a
/// cheaper bulk path override them.
///
/// Sinks are invoked from the tick task only and must be self-synchronising
/// if they share state with another thread (see [`TuiSink`][crate::TuiSink]).
pub trait EventSink: Send {
    // ── Telemetry ─────────────────────────────────────────────────────────

    fn write_telemetry(&mut self, _row: &TelemetryRow) -> SinkResult<()> {
        Ok(())
    }

    fn write_telemetry_batch(&mut self, rows: &[TelemetryRow]) -> SinkResult<()> {
        for row in rows {
            self.write_telemetry(row)?;
        }
        Ok(())
    }

    // ── Detections ────────────────────────────────────────────────────────

    fn write_detection(&mut self, _row: &DetectionRow) -> SinkResult<()> {
        Ok(())
    }

    fn write_detections(&mut self, rows: &[DetectionRow]) -> SinkResult<()> {
        for row in rows {
            self.write_detection(row)?;
        }
        Ok(())
    }

    // ── Swarm events ──────────────────────────────────────────────────────

    fn write_swarm_event(&mut self, _row: &SwarmEventRow) -> SinkResult<()> {
        Ok(())
    }

    fn write_swarm_events(&mut self, rows: &[SwarmEventRow]) -> SinkResult<()> {
        for row in rows {
            self.write_swarm_event(row)?;
        }
        Ok(())
    }

    // ── Simulation state ──────────────────────────────────────────────────

    fn write_state(&mut self, _row: &SimulationStateRow) -> SinkResult<()> {
        Ok(())
    }

    fn write_states(&mut self, rows: &[SimulationStateRow]) -> SinkResult<()> {
        for row in rows {
            self.write_state(row)?;
        }
        Ok(())
    }

    // ── Mission metadata ──────────────────────────────────────────────────

    fn write_mission(&mut self, _row: &MissionRow) -> SinkResult<()> {
        Ok(())
    }

    fn write_missions(&mut self, rows: &[MissionRow]) -> SinkResult<()> {
        for row in rows {
            self.write_mission(row)?;
        }
        Ok(())
    }

    // ── Control ───────────────────────────────────────────────────────────

    /// Report whether an admin surface is attached (interactive sinks show
    /// it; everyone else ignores it).
    fn set_admin_status(&mut self, _active: bool) {}

    /// Flush and release resources.  Idempotent.
    fn close(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

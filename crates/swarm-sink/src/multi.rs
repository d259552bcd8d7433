//! Ordered fan-out over a list of sinks.

use swarm_enemy::DetectionRow;
use swarm_telemetry::{MissionRow, SimulationStateRow, SwarmEventRow, TelemetryRow};

use crate::sink::EventSink;
use crate::SinkResult;

/// Broadcasts every row to an ordered list of sinks.
///
/// Fan-out is fail-stop per row: the first sink error aborts delivery of
/// that row to the remaining sinks and is returned to the caller (which
/// logs it and carries on).  Register the critical sink first.
///
/// `close` is the exception — it always reaches every sink and reports the
/// first error afterwards.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    /// Append a sink at the end of the fan-out order.
    pub fn push(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl EventSink for MultiSink {
    fn write_telemetry(&mut self, row: &TelemetryRow) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_telemetry(row)?;
        }
        Ok(())
    }

    fn write_telemetry_batch(&mut self, rows: &[TelemetryRow]) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_telemetry_batch(rows)?;
        }
        Ok(())
    }

    fn write_detection(&mut self, row: &DetectionRow) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_detection(row)?;
        }
        Ok(())
    }

    fn write_detections(&mut self, rows: &[DetectionRow]) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_detections(rows)?;
        }
        Ok(())
    }

    fn write_swarm_event(&mut self, row: &SwarmEventRow) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_swarm_event(row)?;
        }
        Ok(())
    }

    fn write_swarm_events(&mut self, rows: &[SwarmEventRow]) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_swarm_events(rows)?;
        }
        Ok(())
    }

    fn write_state(&mut self, row: &SimulationStateRow) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_state(row)?;
        }
        Ok(())
    }

    fn write_states(&mut self, rows: &[SimulationStateRow]) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_states(rows)?;
        }
        Ok(())
    }

    fn write_mission(&mut self, row: &MissionRow) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_mission(row)?;
        }
        Ok(())
    }

    fn write_missions(&mut self, rows: &[MissionRow]) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_missions(rows)?;
        }
        Ok(())
    }

    fn set_admin_status(&mut self, active: bool) {
        for sink in &mut self.sinks {
            sink.set_admin_status(active);
        }
    }

    fn close(&mut self) -> SinkResult<()> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.close() {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

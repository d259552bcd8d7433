//! JSONL file sink.
//!
//! One file per stream, created as siblings of the telemetry path:
//! `<prefix>`, `<prefix>.detections`, `<prefix>.swarm`, `<prefix>.state`.
//! Mission metadata rows go into the telemetry file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use swarm_enemy::DetectionRow;
use swarm_telemetry::{MissionRow, SimulationStateRow, SwarmEventRow, TelemetryRow};

use crate::sink::EventSink;
use crate::SinkResult;

/// Writes each stream as newline-delimited JSON.
pub struct FileSink {
    telemetry: BufWriter<File>,
    detections: Option<BufWriter<File>>,
    swarm: Option<BufWriter<File>>,
    state: Option<BufWriter<File>>,
    closed: bool,
}

impl FileSink {
    /// Create all four stream files next to `prefix`.
    pub fn create(prefix: &Path) -> SinkResult<Self> {
        Self::with_paths(
            prefix,
            Some(&sibling(prefix, "detections")),
            Some(&sibling(prefix, "swarm")),
            Some(&sibling(prefix, "state")),
        )
    }

    /// Create the telemetry file plus whichever stream files are requested.
    pub fn with_paths(
        telemetry: &Path,
        detections: Option<&Path>,
        swarm: Option<&Path>,
        state: Option<&Path>,
    ) -> SinkResult<Self> {
        Ok(Self {
            telemetry: BufWriter::new(File::create(telemetry)?),
            detections: detections.map(File::create).transpose()?.map(BufWriter::new),
            swarm: swarm.map(File::create).transpose()?.map(BufWriter::new),
            state: state.map(File::create).transpose()?.map(BufWriter::new),
            closed: false,
        })
    }
}

/// `<path>.<ext>` next to `path`, preserving any existing extension.
fn sibling(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn write_line<T: Serialize>(w: &mut BufWriter<File>, row: &T) -> SinkResult<()> {
    serde_json::to_writer(&mut *w, row)?;
    w.write_all(b"\n")?;
    Ok(())
}

impl EventSink for FileSink {
    fn write_telemetry(&mut self, row: &TelemetryRow) -> SinkResult<()> {
        write_line(&mut self.telemetry, row)
    }

    fn write_detection(&mut self, row: &DetectionRow) -> SinkResult<()> {
        match &mut self.detections {
            Some(w) => write_line(w, row),
            None => Ok(()),
        }
    }

    fn write_swarm_event(&mut self, row: &SwarmEventRow) -> SinkResult<()> {
        match &mut self.swarm {
            Some(w) => write_line(w, row),
            None => Ok(()),
        }
    }

    fn write_state(&mut self, row: &SimulationStateRow) -> SinkResult<()> {
        match &mut self.state {
            Some(w) => write_line(w, row),
            None => Ok(()),
        }
    }

    fn write_mission(&mut self, row: &MissionRow) -> SinkResult<()> {
        write_line(&mut self.telemetry, row)
    }

    fn close(&mut self) -> SinkResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.telemetry.flush()?;
        if let Some(w) = &mut self.detections {
            w.flush()?;
        }
        if let Some(w) = &mut self.swarm {
            w.flush()?;
        }
        if let Some(w) = &mut self.state {
            w.flush()?;
        }
        Ok(())
    }
}

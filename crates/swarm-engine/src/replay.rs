//! Replay a recorded telemetry log into any sink.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Utc};

use swarm_sink::EventSink;
use swarm_telemetry::TelemetryRow;

use crate::EngineResult;

/// Stream telemetry rows from `reader` into `sink`.
///
/// With `speed > 0`, playback paces itself by the recorded timestamp gaps
/// divided by `speed` (gaps clamp at zero, so out-of-order timestamps never
/// sleep).  With `speed <= 0` rows are written back-to-back.  Clean EOF
/// returns `Ok`; any decode or sink error aborts the replay.
pub fn replay<R: BufRead>(
    reader: R,
    sink: &mut dyn EventSink,
    speed: f64,
) -> EngineResult<()> {
    let mut prev_ts: Option<DateTime<Utc>> = None;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: TelemetryRow = serde_json::from_str(&line)?;

        if speed > 0.0 {
            if let Some(prev) = prev_ts {
                // Negative gaps clamp to zero via the failed conversion.
                let gap = (row.ts - prev).to_std().unwrap_or_default();
                let scaled = gap.div_f64(speed);
                if !scaled.is_zero() {
                    std::thread::sleep(scaled);
                }
            }
        }

        sink.write_telemetry(&row)?;
        prev_ts = Some(row.ts);
    }
    Ok(())
}

/// Open `path` and replay its rows.
pub fn replay_file(path: &Path, sink: &mut dyn EventSink, speed: f64) -> EngineResult<()> {
    let file = File::open(path)?;
    replay(BufReader::new(file), sink, speed)
}

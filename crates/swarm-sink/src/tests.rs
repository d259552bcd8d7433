//! Unit tests for swarm-sink.

use chrono::{TimeZone, Utc};

use swarm_core::Position;
use swarm_enemy::{DetectionRow, EnemyKind};
use swarm_telemetry::{
    DroneStatus, MissionRow, SimulationStateRow, SwarmEventKind, SwarmEventRow, TelemetryRow,
};

use crate::sink::EventSink;
use crate::{SinkError, SinkResult};

fn ts() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn telemetry_row(drone_id: &str) -> TelemetryRow {
    TelemetryRow {
        cluster_id: "mission-01".into(),
        drone_id: drone_id.into(),
        mission_id: "m-1".into(),
        lat: 48.0,
        lon: 16.0,
        alt: 100.0,
        battery: 99.5,
        status: DroneStatus::Ok,
        follow: false,
        movement_pattern: "patrol".into(),
        speed_mps: 12.5,
        heading_deg: 90.0,
        previous_position: Position::new(48.0, 15.999, 100.0),
        synced_from: String::new(),
        synced_id: String::new(),
        synced_at: None,
        ts: ts(),
    }
}

fn detection_row() -> DetectionRow {
    DetectionRow {
        cluster_id: "mission-01".into(),
        drone_id: "d-1".into(),
        enemy_id: "e-1".into(),
        enemy_type: EnemyKind::Vehicle,
        lat: 48.0,
        lon: 16.0,
        alt: 0.0,
        drone_lat: 48.001,
        drone_lon: 16.0,
        drone_alt: 100.0,
        distance_m: 111.0,
        bearing_deg: 180.0,
        enemy_velocity_mps: 3.0,
        confidence: 90.0,
        ts: ts(),
    }
}

fn event_row() -> SwarmEventRow {
    SwarmEventRow {
        cluster_id: "mission-01".into(),
        event_type: SwarmEventKind::Assignment,
        drone_ids: vec!["d-1".into(), "d-2".into()],
        enemy_id: "e-1".into(),
        ts: ts(),
    }
}

fn state_row() -> SimulationStateRow {
    SimulationStateRow {
        cluster_id: "mission-01".into(),
        communication_loss: 0.1,
        messages_sent: 4,
        sensor_noise: 0.05,
        weather_impact: 0.2,
        chaos_mode: false,
        ts: ts(),
    }
}

// ── File sink ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod file_tests {
    use std::io::BufRead;

    use super::*;
    use crate::file::FileSink;

    fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
        let f = std::fs::File::open(path).unwrap();
        std::io::BufReader::new(f)
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn creates_four_sibling_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run.log");
        let mut sink = FileSink::create(&prefix).unwrap();
        sink.close().unwrap();

        assert!(prefix.exists());
        assert!(dir.path().join("run.log.detections").exists());
        assert!(dir.path().join("run.log.swarm").exists());
        assert!(dir.path().join("run.log.state").exists());
    }

    #[test]
    fn streams_land_in_their_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run.log");
        let mut sink = FileSink::create(&prefix).unwrap();

        sink.write_telemetry(&telemetry_row("d-1")).unwrap();
        sink.write_detection(&detection_row()).unwrap();
        sink.write_swarm_event(&event_row()).unwrap();
        sink.write_state(&state_row()).unwrap();
        sink.close().unwrap();

        let tele = read_lines(&prefix);
        assert_eq!(tele.len(), 1);
        assert_eq!(tele[0]["drone_id"], "d-1");
        assert_eq!(tele[0]["previous_position"]["lon"], 15.999);

        let det = read_lines(&dir.path().join("run.log.detections"));
        assert_eq!(det[0]["enemy_type"], "vehicle");
        assert_eq!(det[0]["distance_m"], 111.0);

        let swarm = read_lines(&dir.path().join("run.log.swarm"));
        assert_eq!(swarm[0]["event_type"], "assignment");
        assert_eq!(swarm[0]["drone_ids"][1], "d-2");

        let state = read_lines(&dir.path().join("run.log.state"));
        assert_eq!(state[0]["messages_sent"], 4);
    }

    #[test]
    fn missions_share_the_telemetry_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run.log");
        let mut sink = FileSink::create(&prefix).unwrap();
        sink.write_mission(&MissionRow {
            cluster_id: "mission-01".into(),
            mission_id: "m-1".into(),
            name: "overwatch".into(),
            lat: 48.0,
            lon: 16.0,
            radius_km: 5.0,
            ts: ts(),
        })
        .unwrap();
        sink.close().unwrap();

        let rows = read_lines(&prefix);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "overwatch");
    }

    #[test]
    fn batch_default_writes_each_row() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("run.log");
        let mut sink = FileSink::with_paths(&prefix, None, None, None).unwrap();
        sink.write_telemetry_batch(&[telemetry_row("d-1"), telemetry_row("d-2")])
            .unwrap();
        // Detections were not requested: the write is a silent no-op.
        sink.write_detection(&detection_row()).unwrap();
        sink.close().unwrap();

        let rows = read_lines(&prefix);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["drone_id"], "d-2");
    }

    #[test]
    fn close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::create(&dir.path().join("run.log")).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
    }
}

// ── Multi sink ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod multi_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::multi::MultiSink;

    /// Counts writes; optionally fails every telemetry write.
    struct CountingSink {
        telemetry: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        fail_telemetry: bool,
    }

    impl CountingSink {
        fn new(telemetry: Arc<AtomicUsize>, closes: Arc<AtomicUsize>, fail: bool) -> Self {
            Self {
                telemetry,
                closes,
                fail_telemetry: fail,
            }
        }
    }

    impl EventSink for CountingSink {
        fn write_telemetry(&mut self, _row: &TelemetryRow) -> SinkResult<()> {
            if self.fail_telemetry {
                return Err(SinkError::Closed);
            }
            self.telemetry.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn close(&mut self) -> SinkResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn fan_out_reaches_all_sinks_in_order() {
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let mut multi = MultiSink::new(vec![
            Box::new(CountingSink::new(Arc::clone(&a), Arc::clone(&closes), false)),
            Box::new(CountingSink::new(Arc::clone(&b), Arc::clone(&closes), false)),
        ]);

        multi.write_telemetry(&telemetry_row("d-1")).unwrap();
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn first_error_stops_fan_out_for_the_row() {
        let after = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let mut multi = MultiSink::new(vec![
            Box::new(CountingSink::new(Arc::new(AtomicUsize::new(0)), Arc::clone(&closes), true)),
            Box::new(CountingSink::new(Arc::clone(&after), Arc::clone(&closes), false)),
        ]);

        assert!(multi.write_telemetry(&telemetry_row("d-1")).is_err());
        assert_eq!(after.load(Ordering::SeqCst), 0, "later sink saw the row");
    }

    #[test]
    fn close_reaches_every_sink() {
        let closes = Arc::new(AtomicUsize::new(0));
        let mut multi = MultiSink::new(vec![
            Box::new(CountingSink::new(Arc::new(AtomicUsize::new(0)), Arc::clone(&closes), true)),
            Box::new(CountingSink::new(Arc::new(AtomicUsize::new(0)), Arc::clone(&closes), false)),
        ]);
        multi.close().unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn sinks_without_a_capability_ignore_the_stream() {
        // CountingSink does not override detections: the default is a no-op.
        let a = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let mut multi = MultiSink::new(vec![Box::new(CountingSink::new(
            Arc::clone(&a),
            closes,
            false,
        ))]);
        multi.write_detection(&detection_row()).unwrap();
        assert_eq!(a.load(Ordering::SeqCst), 0);
    }
}

// ── TUI sink ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tui_tests {
    use super::*;
    use crate::tui::TuiSink;

    #[test]
    fn state_reflects_latest_rows_after_close() {
        let mut sink = TuiSink::spawn();
        let state = sink.state();

        let mut second = telemetry_row("d-1");
        second.battery = 80.0;
        sink.write_telemetry(&telemetry_row("d-1")).unwrap();
        sink.write_telemetry(&second).unwrap();
        sink.write_telemetry(&telemetry_row("d-2")).unwrap();
        sink.write_detection(&detection_row()).unwrap();
        sink.write_state(&state_row()).unwrap();
        sink.set_admin_status(true);
        sink.close().unwrap();

        let st = state.lock().unwrap();
        assert_eq!(st.telemetry.len(), 2);
        assert_eq!(st.telemetry["d-1"].battery, 80.0, "latest row wins");
        assert_eq!(st.detections.len(), 1);
        assert_eq!(st.state.as_ref().unwrap().messages_sent, 4);
        assert!(st.admin_active);
    }

    #[test]
    fn writes_after_close_report_closed() {
        let mut sink = TuiSink::spawn();
        sink.close().unwrap();
        assert!(matches!(
            sink.write_telemetry(&telemetry_row("d-1")),
            Err(SinkError::Closed)
        ));
    }

    #[test]
    fn detection_history_is_bounded() {
        let mut sink = TuiSink::spawn();
        let state = sink.state();
        for _ in 0..120 {
            sink.write_detection(&detection_row()).unwrap();
        }
        sink.close().unwrap();
        assert_eq!(state.lock().unwrap().detections.len(), 50);
    }
}

// ── Store line protocol ───────────────────────────────────────────────────────

#[cfg(test)]
mod store_tests {
    use super::*;
    use crate::store::{
        detection_line, escape_tag, state_line, swarm_event_line, telemetry_line, GreptimeSink,
        StoreTables,
    };

    #[test]
    fn connect_builds_write_url() {
        let sink = GreptimeSink::connect("http://db:4000/", "public", StoreTables::default());
        assert!(sink.is_ok());
    }

    #[test]
    fn default_tables_match_stream_names() {
        let t = StoreTables::default();
        assert_eq!(t.telemetry, "drone_telemetry");
        assert_eq!(t.detections, "enemy_detections");
        assert_eq!(t.swarm_events, "swarm_events");
        assert_eq!(t.state, "simulation_state");
        assert_eq!(t.missions, "missions");
    }

    #[test]
    fn tag_values_are_escaped() {
        assert_eq!(escape_tag("a b,c=d"), "a\\ b\\,c\\=d");
        assert_eq!(escape_tag("plain"), "plain");
    }

    #[test]
    fn telemetry_line_carries_tags_fields_and_millis() {
        let line = telemetry_line("drone_telemetry", &telemetry_row("d-1"));
        assert!(line.starts_with("drone_telemetry,cluster_id=mission-01,drone_id=d-1 "));
        assert!(line.contains("battery=99.5"));
        assert!(line.contains("status=\"ok\""));
        assert!(line.contains("follow=false"));
        assert!(line.ends_with(&format!(" {}", ts().timestamp_millis())));
    }

    #[test]
    fn detection_line_tags_the_enemy() {
        let line = detection_line("enemy_detections", &detection_row());
        assert!(line.contains(",enemy_id=e-1 "));
        assert!(line.contains("enemy_type=\"vehicle\""));
        assert!(line.contains("confidence=90"));
    }

    #[test]
    fn event_and_state_lines_flatten_compound_fields() {
        let line = swarm_event_line("swarm_events", &event_row());
        assert!(line.contains("event_type=\"assignment\""));
        assert!(line.contains("drone_ids=\"d-1;d-2\""));

        let line = state_line("simulation_state", &state_row());
        assert!(line.contains("messages_sent=4i"));
        assert!(line.contains("chaos_mode=false"));
    }
}

// ── Color stdout sink ─────────────────────────────────────────────────────────

#[cfg(test)]
mod color_tests {
    use std::sync::{Arc, Mutex};

    use swarm_core::SimulationConfig;

    use super::*;
    use crate::color::ColorStdoutSink;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_sink() -> (ColorStdoutSink, SharedBuf) {
        let buf = SharedBuf::default();
        let sink = ColorStdoutSink::with_writer(SimulationConfig::default(), Box::new(buf.clone()));
        (sink, buf)
    }

    fn output(buf: &SharedBuf) -> String {
        String::from_utf8(buf.0.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn overview_prints_exactly_once() {
        let (mut sink, buf) = capture_sink();
        sink.write_telemetry(&telemetry_row("d-1")).unwrap();
        sink.write_telemetry(&telemetry_row("d-2")).unwrap();
        let out = output(&buf);
        assert_eq!(out.matches("Simulation Configuration:").count(), 1);
    }

    #[test]
    fn telemetry_line_shows_position_and_status() {
        let (mut sink, buf) = capture_sink();
        let mut row = telemetry_row("d-1");
        row.follow = true;
        sink.write_telemetry(&row).unwrap();
        let out = output(&buf);
        assert!(out.contains("drone=d-1"));
        assert!(out.contains("lat=48.00000"));
        assert!(out.contains("status=ok"));
        assert!(out.contains("follow"));
    }

    #[test]
    fn detection_and_state_lines_are_labelled() {
        let (mut sink, buf) = capture_sink();
        sink.write_detection(&detection_row()).unwrap();
        sink.write_swarm_event(&event_row()).unwrap();
        sink.write_state(&state_row()).unwrap();
        let out = output(&buf);
        assert!(out.contains("DETECTION"));
        assert!(out.contains("SWARM"));
        assert!(out.contains("enemy=e-1"));
        assert!(out.contains("STATE"));
        assert!(out.contains("msgs=4"));
    }
}

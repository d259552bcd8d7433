//! Columnar time-series store sink (GreptimeDB over HTTP).
//!
//! Rows are posted to the store's InfluxDB-compatible ingest path, one
//! measurement (table) per stream.  The store's native schema and query
//! surface are a collaborator's concern; this sink only speaks the ingest
//! boundary.

use std::time::Duration;

use reqwest::blocking::Client;

use swarm_enemy::DetectionRow;
use swarm_telemetry::{MissionRow, SimulationStateRow, SwarmEventRow, TelemetryRow};

use crate::sink::EventSink;
use crate::{SinkError, SinkResult};

/// Per-stream table names in the store.
#[derive(Clone, Debug)]
pub struct StoreTables {
    pub telemetry: String,
    pub detections: String,
    pub swarm_events: String,
    pub state: String,
    pub missions: String,
}

impl Default for StoreTables {
    fn default() -> Self {
        Self {
            telemetry: "drone_telemetry".into(),
            detections: "enemy_detections".into(),
            swarm_events: "swarm_events".into(),
            state: "simulation_state".into(),
            missions: "missions".into(),
        }
    }
}

/// Blocking HTTP writer for a GreptimeDB endpoint.
pub struct GreptimeSink {
    client: Client,
    write_url: String,
    tables: StoreTables,
}

impl GreptimeSink {
    /// Build a sink for `endpoint` (e.g. `http://greptimedb:4000`) writing
    /// into `db`.
    pub fn connect(endpoint: &str, db: &str, tables: StoreTables) -> SinkResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(3)).build()?;
        let write_url = format!(
            "{}/v1/influxdb/write?db={}&precision=ms",
            endpoint.trim_end_matches('/'),
            db
        );
        Ok(Self {
            client,
            write_url,
            tables,
        })
    }

    fn post(&self, body: String) -> SinkResult<()> {
        if body.is_empty() {
            return Ok(());
        }
        let resp = self.client.post(&self.write_url).body(body).send()?;
        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().unwrap_or_default();
            return Err(SinkError::Store(format!("{status}: {detail}")));
        }
        Ok(())
    }
}

// ── Line protocol encoding ────────────────────────────────────────────────────

/// Escape a tag value: comma, space, and equals are significant in line
/// protocol.
pub(crate) fn escape_tag(v: &str) -> String {
    v.replace(',', "\\,").replace(' ', "\\ ").replace('=', "\\=")
}

pub(crate) fn telemetry_line(table: &str, r: &TelemetryRow) -> String {
    format!(
        "{},cluster_id={},drone_id={} mission_id=\"{}\",lat={},lon={},alt={},battery={},\
         status=\"{}\",follow={},movement_pattern=\"{}\",speed_mps={},heading_deg={} {}",
        table,
        escape_tag(&r.cluster_id),
        escape_tag(&r.drone_id),
        r.mission_id,
        r.lat,
        r.lon,
        r.alt,
        r.battery,
        r.status.as_str(),
        r.follow,
        r.movement_pattern,
        r.speed_mps,
        r.heading_deg,
        r.ts.timestamp_millis()
    )
}

pub(crate) fn detection_line(table: &str, r: &DetectionRow) -> String {
    format!(
        "{},cluster_id={},drone_id={},enemy_id={} enemy_type=\"{}\",lat={},lon={},alt={},\
         drone_lat={},drone_lon={},drone_alt={},distance_m={},bearing_deg={},\
         enemy_velocity_mps={},confidence={} {}",
        table,
        escape_tag(&r.cluster_id),
        escape_tag(&r.drone_id),
        escape_tag(&r.enemy_id),
        r.enemy_type.as_str(),
        r.lat,
        r.lon,
        r.alt,
        r.drone_lat,
        r.drone_lon,
        r.drone_alt,
        r.distance_m,
        r.bearing_deg,
        r.enemy_velocity_mps,
        r.confidence,
        r.ts.timestamp_millis()
    )
}

pub(crate) fn swarm_event_line(table: &str, r: &SwarmEventRow) -> String {
    format!(
        "{},cluster_id={} event_type=\"{}\",drone_ids=\"{}\",enemy_id=\"{}\" {}",
        table,
        escape_tag(&r.cluster_id),
        r.event_type.as_str(),
        r.drone_ids.join(";"),
        r.enemy_id,
        r.ts.timestamp_millis()
    )
}

pub(crate) fn state_line(table: &str, r: &SimulationStateRow) -> String {
    format!(
        "{},cluster_id={} communication_loss={},messages_sent={}i,sensor_noise={},\
         weather_impact={},chaos_mode={} {}",
        table,
        escape_tag(&r.cluster_id),
        r.communication_loss,
        r.messages_sent,
        r.sensor_noise,
        r.weather_impact,
        r.chaos_mode,
        r.ts.timestamp_millis()
    )
}

pub(crate) fn mission_line(table: &str, r: &MissionRow) -> String {
    format!(
        "{},cluster_id={},mission_id={} name=\"{}\",lat={},lon={},radius_km={} {}",
        table,
        escape_tag(&r.cluster_id),
        escape_tag(&r.mission_id),
        r.name,
        r.lat,
        r.lon,
        r.radius_km,
        r.ts.timestamp_millis()
    )
}

// ── EventSink impl ────────────────────────────────────────────────────────────

impl EventSink for GreptimeSink {
    fn write_telemetry(&mut self, row: &TelemetryRow) -> SinkResult<()> {
        self.post(telemetry_line(&self.tables.telemetry, row))
    }

    fn write_telemetry_batch(&mut self, rows: &[TelemetryRow]) -> SinkResult<()> {
        let body: Vec<String> = rows
            .iter()
            .map(|r| telemetry_line(&self.tables.telemetry, r))
            .collect();
        self.post(body.join("\n"))
    }

    fn write_detection(&mut self, row: &DetectionRow) -> SinkResult<()> {
        self.post(detection_line(&self.tables.detections, row))
    }

    fn write_detections(&mut self, rows: &[DetectionRow]) -> SinkResult<()> {
        let body: Vec<String> = rows
            .iter()
            .map(|r| detection_line(&self.tables.detections, r))
            .collect();
        self.post(body.join("\n"))
    }

    fn write_swarm_event(&mut self, row: &SwarmEventRow) -> SinkResult<()> {
        self.post(swarm_event_line(&self.tables.swarm_events, row))
    }

    fn write_swarm_events(&mut self, rows: &[SwarmEventRow]) -> SinkResult<()> {
        let body: Vec<String> = rows
            .iter()
            .map(|r| swarm_event_line(&self.tables.swarm_events, r))
            .collect();
        self.post(body.join("\n"))
    }

    fn write_state(&mut self, row: &SimulationStateRow) -> SinkResult<()> {
        self.post(state_line(&self.tables.state, row))
    }

    fn write_states(&mut self, rows: &[SimulationStateRow]) -> SinkResult<()> {
        let body: Vec<String> = rows.iter().map(|r| state_line(&self.tables.state, r)).collect();
        self.post(body.join("\n"))
    }

    fn write_mission(&mut self, row: &MissionRow) -> SinkResult<()> {
        self.post(mission_line(&self.tables.missions, row))
    }

    fn write_missions(&mut self, rows: &[MissionRow]) -> SinkResult<()> {
        let body: Vec<String> = rows
            .iter()
            .map(|r| mission_line(&self.tables.missions, r))
            .collect();
        self.post(body.join("\n"))
    }
}

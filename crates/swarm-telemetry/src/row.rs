//! Serde row types for every output stream.
//!
//! Field names match the JSONL log format exactly; the same structs are
//! written by every sink and decoded by replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use swarm_core::Position;

use crate::drone::DroneStatus;

// ── Telemetry ─────────────────────────────────────────────────────────────────

/// One drone telemetry record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRow {
    pub cluster_id: String,
    pub drone_id: String,
    #[serde(default)]
    pub mission_id: String,

    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub battery: f64,
    pub status: DroneStatus,
    /// Whether the drone had a follow target when the row was generated.
    pub follow: bool,
    #[serde(default)]
    pub movement_pattern: String,

    /// Metres traversed since the previous tick divided by the tick length.
    pub speed_mps: f64,
    /// Initial bearing from the previous to the current position;
    /// 0° = north, clockwise, `[0, 360)`.
    pub heading_deg: f64,
    /// The drone's position as observed at the start of the tick.
    pub previous_position: Position,

    // Sync tombstones, populated only by downstream aggregation layers.
    #[serde(default)]
    pub synced_from: String,
    #[serde(default)]
    pub synced_id: String,
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,

    pub ts: DateTime<Utc>,
}

// ── Swarm events ──────────────────────────────────────────────────────────────

/// Coordination event kinds emitted by the swarm coordinator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmEventKind {
    Assignment,
    Unassignment,
    FormationChange,
}

impl SwarmEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SwarmEventKind::Assignment => "assignment",
            SwarmEventKind::Unassignment => "unassignment",
            SwarmEventKind::FormationChange => "formation_change",
        }
    }
}

/// A swarm coordination event: which drones, which enemy, what happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwarmEventRow {
    pub cluster_id: String,
    pub event_type: SwarmEventKind,
    pub drone_ids: Vec<String>,
    /// Empty for events not tied to an enemy (formation changes).
    #[serde(default)]
    pub enemy_id: String,
    pub ts: DateTime<Utc>,
}

// ── Simulation state ──────────────────────────────────────────────────────────

/// Per-tick simulator state metrics; the last row of every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationStateRow {
    pub cluster_id: String,
    pub communication_loss: f64,
    pub messages_sent: u32,
    pub sensor_noise: f64,
    pub weather_impact: f64,
    pub chaos_mode: bool,
    pub ts: DateTime<Utc>,
}

// ── Missions ──────────────────────────────────────────────────────────────────

/// Mission metadata, written once at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionRow {
    pub cluster_id: String,
    pub mission_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub ts: DateTime<Utc>,
}

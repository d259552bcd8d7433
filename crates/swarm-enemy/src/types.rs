//! Enemy entity types and the detection row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use swarm_core::{Position, Region};

// ── Kind and status ───────────────────────────────────────────────────────────

/// What kind of entity the sensor believes it is looking at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Vehicle,
    Person,
    Drone,
    Decoy,
}

impl EnemyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Vehicle => "vehicle",
            EnemyKind::Person => "person",
            EnemyKind::Drone => "drone",
            EnemyKind::Decoy => "decoy",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyStatus {
    #[default]
    Active,
    Neutralized,
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

/// One simulated enemy entity.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: String,
    pub kind: EnemyKind,
    /// Set on decoys: the enemy that spawned this one.  A decoy may outlive
    /// its parent; it expires on its own schedule.
    pub parent_id: Option<String>,
    pub status: EnemyStatus,

    pub position: Position,
    /// The region the enemy spawned in; it is clamped back inside when a
    /// step takes it out.
    pub region: Region,
    /// Ground-truth confidence; decoys start at half their parent's.
    pub confidence: f64,
    /// Decoys past this instant are removed at the start of the next tick.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Enemy {
    pub fn is_decoy(&self) -> bool {
        self.kind == EnemyKind::Decoy
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(t) if t < now)
    }
}

// ── Detection row ─────────────────────────────────────────────────────────────

/// One drone-sees-enemy event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRow {
    pub cluster_id: String,
    pub drone_id: String,
    pub enemy_id: String,
    pub enemy_type: EnemyKind,

    /// Enemy position at detection time.
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    /// Detecting drone's position at detection time.
    pub drone_lat: f64,
    pub drone_lon: f64,
    pub drone_alt: f64,

    /// Drone-to-enemy range in metres.
    pub distance_m: f64,
    /// Bearing from the drone to the enemy; 0° = north, clockwise.
    pub bearing_deg: f64,
    /// Enemy ground speed estimated from its movement this tick.
    pub enemy_velocity_mps: f64,

    /// Detection confidence in `[0, 100]`.
    pub confidence: f64,
    pub ts: DateTime<Utc>,
}

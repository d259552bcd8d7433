//! Runtime drone state and the battery model.

use rand::Rng;
use serde::{Deserialize, Serialize};

use swarm_core::{Position, Region, SimRng};

/// Battery level at or below which a drone is considered failed.
pub const BATTERY_FAILURE_THRESHOLD: f64 = 5.0;
/// Battery level at or below which a drone reports low battery.
pub const BATTERY_LOW_THRESHOLD: f64 = 20.0;

// ── Status ────────────────────────────────────────────────────────────────────

/// Drone health, derived from battery thresholds unless chaos injection has
/// flipped it.  `Failed` is terminal for follower selection; the drone keeps
/// reporting telemetry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneStatus {
    #[default]
    Ok,
    LowBattery,
    Failed,
}

impl DroneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DroneStatus::Ok => "ok",
            DroneStatus::LowBattery => "low_battery",
            DroneStatus::Failed => "failed",
        }
    }
}

/// Status as a pure function of the battery level.
pub fn battery_status(level: f64) -> DroneStatus {
    if level <= BATTERY_FAILURE_THRESHOLD {
        DroneStatus::Failed
    } else if level <= BATTERY_LOW_THRESHOLD {
        DroneStatus::LowBattery
    } else {
        DroneStatus::Ok
    }
}

/// Battery consumption per tick by model label.
pub fn battery_drain(model: &str) -> f64 {
    match model {
        "small-fpv" => 0.5,
        "medium-uav" => 0.3,
        "large-uav" => 0.2,
        _ => 0.4,
    }
}

// ── Movement pattern ──────────────────────────────────────────────────────────

/// The configured movement behaviour of a drone when it has no follow
/// target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementPattern {
    Patrol,
    PointToPoint,
    Loiter,
    #[default]
    RandomWalk,
}

impl MovementPattern {
    /// Parse a config label; anything unrecognised is a random walk.
    pub fn from_label(label: &str) -> Self {
        match label {
            "patrol" => MovementPattern::Patrol,
            "point-to-point" => MovementPattern::PointToPoint,
            "loiter" => MovementPattern::Loiter,
            _ => MovementPattern::RandomWalk,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementPattern::Patrol => "patrol",
            MovementPattern::PointToPoint => "point-to-point",
            MovementPattern::Loiter => "loiter",
            MovementPattern::RandomWalk => "random-walk",
        }
    }
}

// ── Drone ─────────────────────────────────────────────────────────────────────

/// Runtime state for one simulated drone.
///
/// Owned by exactly one fleet for its lifetime; the engine hands out copies
/// (snapshots) or ids, never references.
#[derive(Clone, Debug, Default)]
pub struct Drone {
    pub id: String,
    pub model: String,
    pub mission_id: String,

    pub position: Position,
    /// Remaining battery in `[0, 100]`; never increases during a run.
    pub battery: f64,
    pub status: DroneStatus,

    pub movement_pattern: MovementPattern,
    pub home_region: Region,
    pub waypoints: Vec<Position>,
    /// When set, the drone is in follow mode and moves toward this point.
    pub follow_target: Option<Position>,

    /// Per-drone stochastic rates, all in `[0, 1]`.
    pub sensor_error_rate: f64,
    pub dropout_rate: f64,
    pub battery_anomaly_rate: f64,
}

impl Drone {
    /// A fresh drone at `position` with a full battery.
    pub fn new(id: String, model: String, position: Position, home_region: Region) -> Self {
        Self {
            id,
            model,
            position,
            battery: 100.0,
            status: DroneStatus::Ok,
            home_region,
            ..Default::default()
        }
    }
}

/// A globally unique drone id: fleet name, index, and a UUID suffix.
///
/// The UUID bytes come from the simulation RNG so identically-seeded runs
/// mint identical ids.
pub fn generate_drone_id(fleet_name: &str, index: usize, rng: &mut SimRng) -> String {
    let bytes: [u8; 16] = rng.inner().gen();
    let id = uuid::Builder::from_random_bytes(bytes).into_uuid();
    format!("{fleet_name}-{index}-{id}")
}

//! Typed simulation configuration.
//!
//! Loaded from YAML by the application crate and passed to the simulator.
//! Every knob has a serde default so minimal configs stay minimal; the
//! simulator applies its own clamping (detection radius floor, occlusion
//! and weather bounds) at construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geo::Region;

// ── Per-fleet behaviour ───────────────────────────────────────────────────────

/// Stochastic failure rates for one fleet, all in `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorConfig {
    #[serde(default)]
    pub sensor_error_rate: f64,
    #[serde(default)]
    pub dropout_rate: f64,
    #[serde(default)]
    pub battery_anomaly_rate: f64,
}

/// A fleet of drones sharing a model and movement behaviour.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    pub name: String,
    pub model: String,
    pub count: usize,
    /// Movement pattern label: `patrol`, `point-to-point`, `loiter`, or
    /// anything else for a random walk.
    #[serde(default)]
    pub movement_pattern: String,
    /// Name of the zone the fleet operates in; falls back to the first zone
    /// when absent or unknown.
    #[serde(default)]
    pub home_region: String,
    /// Waypoints for `point-to-point` fleets; unused by other patterns.
    #[serde(default)]
    pub waypoints: Vec<crate::geo::Position>,
    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// A named mission operating inside one zone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub zone: String,
    #[serde(default)]
    pub description: String,
}

// ── Stream toggles ────────────────────────────────────────────────────────────

/// Which output streams the simulator emits.  All default to on; the CLI
/// flips them from flags and `ENABLE_*` environment variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamToggles {
    #[serde(default = "enabled")]
    pub telemetry: bool,
    #[serde(default = "enabled")]
    pub detections: bool,
    #[serde(default = "enabled")]
    pub swarm_events: bool,
    #[serde(default = "enabled")]
    pub simulation_state: bool,
}

fn enabled() -> bool {
    true
}

impl Default for StreamToggles {
    fn default() -> Self {
        Self {
            telemetry: true,
            detections: true,
            swarm_events: true,
            simulation_state: true,
        }
    }
}

// ── Root config ───────────────────────────────────────────────────────────────

/// Root configuration for zones, missions, fleets, and engine knobs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub zones: Vec<Region>,
    #[serde(default)]
    pub missions: Vec<MissionConfig>,
    #[serde(default)]
    pub fleets: Vec<FleetConfig>,

    /// Enemies spawned per zone at startup; `0` means the engine default.
    #[serde(default)]
    pub enemy_count: usize,

    /// Sensor range in metres; `<= 0` means the engine default (1000 m).
    #[serde(default)]
    pub detection_radius_m: f64,
    /// Std-dev factor of the additive Gaussian confidence noise.
    #[serde(default)]
    pub sensor_noise: f64,
    /// Confidence attenuation factors in `[0, 1]`.
    #[serde(default)]
    pub terrain_occlusion: f64,
    #[serde(default)]
    pub weather_impact: f64,

    /// Minimum detection confidence that triggers follower assignment.
    #[serde(default)]
    pub follow_confidence: f64,
    /// Movement-pattern label → base follower count.  A negative count
    /// commits the whole fleet; an absent entry only the detecting drone.
    #[serde(default)]
    pub swarm_responses: HashMap<String, i32>,
    /// `low`, `medium`, or `high`; adds 0 / 1 / 2 followers.
    #[serde(default)]
    pub mission_criticality: String,

    /// Probability that any single command transmission is lost.
    #[serde(default)]
    pub communication_loss: f64,
    /// Commands admitted per tick; `0` means unlimited.
    #[serde(default)]
    pub bandwidth_limit: u32,

    /// Decoy lifetime in seconds; `None` means decoys never expire.
    #[serde(default)]
    pub decoy_lifespan_secs: Option<u64>,
    /// Maximum live decoys per parent enemy; `None` means uncapped.
    #[serde(default)]
    pub decoy_cap_per_parent: Option<usize>,

    #[serde(default)]
    pub streams: StreamToggles,
}

impl SimulationConfig {
    /// Reject configurations the simulator cannot start from.
    ///
    /// An empty zone list is fatal at construction; everything else is
    /// clamped or defaulted by the engine.
    pub fn validate(&self) -> CoreResult<()> {
        if self.zones.is_empty() {
            return Err(CoreError::Config("no zones defined".into()));
        }
        for fleet in &self.fleets {
            if fleet.count == 0 {
                return Err(CoreError::Config(format!(
                    "fleet {:?} has zero drones",
                    fleet.name
                )));
            }
        }
        Ok(())
    }

    /// The zone a fleet operates in: the one named by `home_region`, or the
    /// first zone when the name is empty or unknown.
    pub fn fleet_zone(&self, fleet: &FleetConfig) -> &Region {
        self.zones
            .iter()
            .find(|z| z.name == fleet.home_region)
            .unwrap_or(&self.zones[0])
    }

    /// Resolve a mission's zone by name, if configured.
    pub fn mission_zone(&self, mission: &MissionConfig) -> Option<&Region> {
        self.zones.iter().find(|z| z.name == mission.zone)
    }
}

//! Per-tick telemetry generation.

use std::time::Duration;

use swarm_core::{Position, SimRng, WallClock};

use crate::drone::{battery_drain, battery_status, Drone, DroneStatus};
use crate::movement::strategy_for;
use crate::row::TelemetryRow;

/// Advances drone state one tick and produces the matching telemetry row.
///
/// Deterministic given the injected clock and the caller's RNG.
pub struct Generator {
    cluster_id: String,
    clock: WallClock,
}

impl Generator {
    pub fn new(cluster_id: impl Into<String>, clock: WallClock) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            clock,
        }
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    /// Move the drone, drain its battery, derive its status, and return the
    /// telemetry row.
    ///
    /// `prev` is the drone's position as observed at the start of the tick;
    /// it feeds the row's `previous_position`, speed, and heading fields.
    pub fn generate(
        &self,
        drone: &mut Drone,
        prev: Position,
        tick_duration: Duration,
        rng: &mut SimRng,
    ) -> TelemetryRow {
        let next = {
            let strategy = strategy_for(drone);
            strategy.step(drone, &drone.home_region, &drone.waypoints, rng)
        };
        drone.position = next;

        drone.battery = (drone.battery - battery_drain(&drone.model)).max(0.0);
        // Failed is terminal within a run: only an external battery reset
        // revives a drone.
        if drone.status != DroneStatus::Failed {
            drone.status = battery_status(drone.battery);
        }

        let traversed_m = prev.distance_m(drone.position);
        let secs = tick_duration.as_secs_f64();
        let speed_mps = if secs > 0.0 { traversed_m / secs } else { 0.0 };
        let heading_deg = if traversed_m > 0.0 {
            prev.bearing_deg(drone.position)
        } else {
            0.0
        };

        TelemetryRow {
            cluster_id: self.cluster_id.clone(),
            drone_id: drone.id.clone(),
            mission_id: drone.mission_id.clone(),
            lat: drone.position.lat,
            lon: drone.position.lon,
            alt: drone.position.alt,
            battery: drone.battery,
            status: drone.status,
            follow: drone.follow_target.is_some(),
            movement_pattern: drone.movement_pattern.as_str().to_owned(),
            speed_mps,
            heading_deg,
            previous_position: prev,
            synced_from: String::new(),
            synced_id: String::new(),
            synced_at: None,
            ts: self.clock.now(),
        }
    }
}

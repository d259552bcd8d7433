//! Movement strategies.
//!
//! Each strategy computes the drone's next position from its current state,
//! home region, and waypoints.  Strategies never mutate the drone; the
//! generator applies the returned position.  All randomness comes from the
//! caller's `SimRng` so a seeded run replays exactly.

use swarm_core::{meters_per_deg_lon, Position, Region, SimRng, METERS_PER_DEG_LAT};

use crate::drone::{Drone, MovementPattern};

/// Pluggable drone movement.
pub trait MovementStrategy {
    /// Compute the next position for `drone`.
    fn step(
        &self,
        drone: &Drone,
        region: &Region,
        waypoints: &[Position],
        rng: &mut SimRng,
    ) -> Position;
}

/// Select the strategy for a drone: a set follow target overrides the
/// configured pattern.
pub fn strategy_for(drone: &Drone) -> Box<dyn MovementStrategy> {
    if let Some(target) = drone.follow_target {
        return Box::new(FollowMovement { target });
    }
    match drone.movement_pattern {
        MovementPattern::Patrol => Box::new(PatrolMovement),
        MovementPattern::PointToPoint => Box::new(PointToPointMovement),
        MovementPattern::Loiter => Box::new(LoiterMovement),
        MovementPattern::RandomWalk => Box::new(RandomWalkMovement),
    }
}

// ── Patrol ────────────────────────────────────────────────────────────────────

/// Circular movement on the home region's perimeter.
pub struct PatrolMovement;

impl MovementStrategy for PatrolMovement {
    fn step(&self, drone: &Drone, region: &Region, _: &[Position], rng: &mut SimRng) -> Position {
        // 0.99 keeps the position inside the region despite rounding.
        let radius = region.radius_km * 1000.0 * 0.99;
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let d_lat = (radius * angle.cos()) / METERS_PER_DEG_LAT;
        let d_lon = (radius * angle.sin()) / meters_per_deg_lon(region.center_lat);
        Position::new(
            region.center_lat + d_lat,
            region.center_lon + d_lon,
            drone.position.alt,
        )
    }
}

// ── Point-to-point ────────────────────────────────────────────────────────────

/// Gradual movement toward a randomly chosen waypoint.
pub struct PointToPointMovement;

impl MovementStrategy for PointToPointMovement {
    fn step(
        &self,
        drone: &Drone,
        _: &Region,
        waypoints: &[Position],
        rng: &mut SimRng,
    ) -> Position {
        if waypoints.is_empty() {
            return drone.position;
        }
        let target = waypoints[rng.gen_range(0..waypoints.len())];
        // One tenth of the remaining displacement per tick.
        let d_lat = (target.lat - drone.position.lat) / 10.0;
        let d_lon = (target.lon - drone.position.lon) / 10.0;
        Position::new(
            drone.position.lat + d_lat,
            drone.position.lon + d_lon,
            drone.position.alt,
        )
    }
}

// ── Loiter ────────────────────────────────────────────────────────────────────

/// Hovering within a few metres of the home region's centre.
pub struct LoiterMovement;

impl MovementStrategy for LoiterMovement {
    fn step(&self, drone: &Drone, region: &Region, _: &[Position], rng: &mut SimRng) -> Position {
        let d_lat = rng.gen_range(-0.00005..0.00005);
        let d_lon = rng.gen_range(-0.00005..0.00005);
        Position::new(
            region.center_lat + d_lat,
            region.center_lon + d_lon,
            drone.position.alt,
        )
    }
}

// ── Random walk ───────────────────────────────────────────────────────────────

/// A random heading at a model-dependent speed, with altitude jitter.
pub struct RandomWalkMovement;

/// Speed envelope in m/s for a model label.
fn speed_range(model: &str) -> (f64, f64) {
    match model {
        "small-fpv" => (15.0, 30.0),
        "medium-uav" => (25.0, 50.0),
        "large-uav" => (20.0, 40.0),
        _ => (15.0, 25.0),
    }
}

impl MovementStrategy for RandomWalkMovement {
    fn step(&self, drone: &Drone, _: &Region, _: &[Position], rng: &mut SimRng) -> Position {
        let (speed_min, speed_max) = speed_range(&drone.model);
        let heading = rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = rng.gen_range(speed_min..speed_max);

        let d_lat = (speed * heading.cos()) / METERS_PER_DEG_LAT;
        let d_lon = (speed * heading.sin()) / meters_per_deg_lon(drone.position.lat);
        let alt_delta = rng.gen_range(-1.0..1.0);

        Position::new(
            drone.position.lat + d_lat,
            drone.position.lon + d_lon,
            (drone.position.alt + alt_delta).max(0.0),
        )
    }
}

// ── Follow ────────────────────────────────────────────────────────────────────

/// Movement toward a fixed target, capped at 50 m per tick.
pub struct FollowMovement {
    pub target: Position,
}

/// Metres a following drone closes per tick.
const FOLLOW_STEP_M: f64 = 50.0;

impl MovementStrategy for FollowMovement {
    fn step(&self, drone: &Drone, _: &Region, _: &[Position], _: &mut SimRng) -> Position {
        let d_lat_m = (self.target.lat - drone.position.lat) * METERS_PER_DEG_LAT;
        let d_lon_m = (self.target.lon - drone.position.lon) * meters_per_deg_lon(drone.position.lat);
        let dist = d_lat_m.hypot(d_lon_m);
        if dist == 0.0 {
            return drone.position;
        }
        let factor = (FOLLOW_STEP_M / dist).min(1.0);
        let d_lat = (d_lat_m * factor) / METERS_PER_DEG_LAT;
        let d_lon = (d_lon_m * factor) / meters_per_deg_lon(drone.position.lat);
        Position::new(
            drone.position.lat + d_lat,
            drone.position.lon + d_lon,
            drone.position.alt,
        )
    }
}

//! Unit tests for swarm-telemetry.

use std::time::Duration;

use chrono::{TimeZone, Utc};

use swarm_core::{Position, Region, SimRng, WallClock};

use crate::drone::{battery_status, generate_drone_id, Drone, DroneStatus, MovementPattern};
use crate::generator::Generator;
use crate::movement::{strategy_for, FollowMovement, MovementStrategy};
use crate::row::TelemetryRow;

fn test_region() -> Region {
    Region {
        name: "alpha".into(),
        center_lat: 48.0,
        center_lon: 16.0,
        radius_km: 5.0,
    }
}

fn test_drone(pattern: MovementPattern) -> Drone {
    let region = test_region();
    let mut d = Drone::new(
        "d-1".into(),
        "small-fpv".into(),
        Position::new(region.center_lat, region.center_lon, 100.0),
        region,
    );
    d.movement_pattern = pattern;
    d
}

#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert_eq!(battery_status(100.0), DroneStatus::Ok);
        assert_eq!(battery_status(20.1), DroneStatus::Ok);
        assert_eq!(battery_status(20.0), DroneStatus::LowBattery);
        assert_eq!(battery_status(5.1), DroneStatus::LowBattery);
        assert_eq!(battery_status(5.0), DroneStatus::Failed);
        assert_eq!(battery_status(0.0), DroneStatus::Failed);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DroneStatus::LowBattery).unwrap(),
            "\"low_battery\""
        );
    }

    #[test]
    fn pattern_labels_round_trip() {
        for p in [
            MovementPattern::Patrol,
            MovementPattern::PointToPoint,
            MovementPattern::Loiter,
            MovementPattern::RandomWalk,
        ] {
            assert_eq!(MovementPattern::from_label(p.as_str()), p);
        }
        assert_eq!(
            MovementPattern::from_label("zigzag"),
            MovementPattern::RandomWalk
        );
    }
}

#[cfg(test)]
mod movement_tests {
    use super::*;

    #[test]
    fn patrol_lands_on_the_perimeter() {
        let drone = test_drone(MovementPattern::Patrol);
        let region = test_region();
        let mut rng = SimRng::new(1);
        let strategy = strategy_for(&drone);
        for _ in 0..20 {
            let p = strategy.step(&drone, &region, &[], &mut rng);
            let d = region.center().distance_m(p);
            let expect = region.radius_km * 1000.0 * 0.99;
            assert!((d - expect).abs() < expect * 0.02, "distance {d}");
        }
    }

    #[test]
    fn point_to_point_closes_a_tenth_of_the_gap() {
        let mut drone = test_drone(MovementPattern::PointToPoint);
        drone.waypoints = vec![Position::new(48.1, 16.0, 100.0)];
        let region = test_region();
        let mut rng = SimRng::new(1);
        let strategy = strategy_for(&drone);
        let p = strategy.step(&drone, &region, &drone.waypoints, &mut rng);
        assert!((p.lat - 48.01).abs() < 1e-9);
        assert_eq!(p.lon, 16.0);
    }

    #[test]
    fn point_to_point_without_waypoints_stays_put() {
        let drone = test_drone(MovementPattern::PointToPoint);
        let region = test_region();
        let mut rng = SimRng::new(1);
        let strategy = strategy_for(&drone);
        let p = strategy.step(&drone, &region, &[], &mut rng);
        assert_eq!(p, drone.position);
    }

    #[test]
    fn loiter_stays_within_meters_of_center() {
        let drone = test_drone(MovementPattern::Loiter);
        let region = test_region();
        let mut rng = SimRng::new(1);
        let strategy = strategy_for(&drone);
        for _ in 0..50 {
            let p = strategy.step(&drone, &region, &[], &mut rng);
            assert!(region.center().distance_m(p) < 12.0);
        }
    }

    #[test]
    fn random_walk_respects_model_speed_envelope() {
        let drone = test_drone(MovementPattern::RandomWalk);
        let region = test_region();
        let mut rng = SimRng::new(1);
        let strategy = strategy_for(&drone);
        for _ in 0..50 {
            let p = strategy.step(&drone, &region, &[], &mut rng);
            let d = drone.position.distance_m(p);
            // small-fpv travels 15–30 m per tick.
            assert!((14.0..31.0).contains(&d), "step of {d} m");
        }
    }

    #[test]
    fn random_walk_altitude_never_negative() {
        let mut drone = test_drone(MovementPattern::RandomWalk);
        drone.position.alt = 0.0;
        let region = test_region();
        let mut rng = SimRng::new(1);
        let strategy = strategy_for(&drone);
        for _ in 0..50 {
            let p = strategy.step(&drone, &region, &[], &mut rng);
            assert!(p.alt >= 0.0);
        }
    }

    #[test]
    fn follow_caps_the_step_at_fifty_meters() {
        let drone = test_drone(MovementPattern::RandomWalk);
        let target = Position::new(48.1, 16.0, 0.0); // ~11 km away
        let strategy = FollowMovement { target };
        let region = test_region();
        let mut rng = SimRng::new(1);
        let p = strategy.step(&drone, &region, &[], &mut rng);
        let d = drone.position.distance_m(p);
        assert!((d - 50.0).abs() < 0.5, "moved {d} m");
    }

    #[test]
    fn follow_covers_short_gaps_in_one_step() {
        let drone = test_drone(MovementPattern::RandomWalk);
        // ~11 m north of the drone.
        let target = Position::new(48.0001, 16.0, 0.0);
        let strategy = FollowMovement { target };
        let region = test_region();
        let mut rng = SimRng::new(1);
        let p = strategy.step(&drone, &region, &[], &mut rng);
        assert!(p.distance_m(target) < 0.5);
    }

    #[test]
    fn follow_target_overrides_pattern() {
        let mut drone = test_drone(MovementPattern::Patrol);
        drone.follow_target = Some(Position::new(48.001, 16.0, 0.0));
        let region = test_region();
        let mut rng = SimRng::new(1);
        // Patrol would jump to the perimeter (~4950 m); follow moves 50 m.
        let p = strategy_for(&drone).step(&drone, &region, &[], &mut rng);
        assert!(drone.position.distance_m(p) < 51.0);
    }
}

#[cfg(test)]
mod generator_tests {
    use super::*;

    fn fixed_clock() -> WallClock {
        WallClock::fixed(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
    }

    fn generate_one(drone: &mut Drone) -> TelemetryRow {
        let gen = Generator::new("mission-01", fixed_clock());
        let mut rng = SimRng::new(42);
        let prev = drone.position;
        gen.generate(drone, prev, Duration::from_secs(1), &mut rng)
    }

    #[test]
    fn row_reflects_drone_state() {
        let mut drone = test_drone(MovementPattern::RandomWalk);
        let row = generate_one(&mut drone);

        assert_eq!(row.cluster_id, "mission-01");
        assert_eq!(row.drone_id, "d-1");
        assert_eq!(row.lat, drone.position.lat);
        assert_eq!(row.lon, drone.position.lon);
        assert_eq!(row.battery, drone.battery);
        assert_eq!(row.status, drone.status);
        assert!(!row.follow);
        assert_eq!(row.movement_pattern, "random-walk");
        assert!(row.synced_from.is_empty());
        assert!(row.synced_at.is_none());
    }

    #[test]
    fn battery_drains_by_model_rate() {
        let mut drone = test_drone(MovementPattern::Loiter);
        generate_one(&mut drone);
        assert_eq!(drone.battery, 99.5); // small-fpv drains 0.5 per tick
    }

    #[test]
    fn battery_clamps_at_zero() {
        let mut drone = test_drone(MovementPattern::Loiter);
        drone.battery = 0.2;
        generate_one(&mut drone);
        assert_eq!(drone.battery, 0.0);
        assert_eq!(drone.status, DroneStatus::Failed);
    }

    #[test]
    fn failed_status_is_sticky() {
        let mut drone = test_drone(MovementPattern::Loiter);
        drone.status = DroneStatus::Failed; // e.g. a chaos flip
        generate_one(&mut drone);
        assert_eq!(
            drone.status,
            DroneStatus::Failed,
            "a full battery must not revive a failed drone"
        );
    }

    #[test]
    fn speed_and_heading_derive_from_displacement() {
        let mut drone = test_drone(MovementPattern::RandomWalk);
        drone.follow_target = Some(Position::new(48.1, 16.0, 100.0)); // due north
        let prev = drone.position;
        let gen = Generator::new("mission-01", fixed_clock());
        let mut rng = SimRng::new(42);
        let row = gen.generate(&mut drone, prev, Duration::from_secs(2), &mut rng);

        // Follow moves 50 m north in a 2 s tick → 25 m/s heading ~0°.
        assert!((row.speed_mps - 25.0).abs() < 0.3, "speed {}", row.speed_mps);
        assert!(row.heading_deg < 1.0 || row.heading_deg > 359.0);
        assert_eq!(row.previous_position, prev);
        assert!(row.follow);
    }

    #[test]
    fn same_seed_generates_identical_rows() {
        let run = || {
            let mut drone = test_drone(MovementPattern::RandomWalk);
            let gen = Generator::new("mission-01", fixed_clock());
            let mut rng = SimRng::new(7);
            let mut rows = Vec::new();
            for _ in 0..10 {
                let prev = drone.position;
                rows.push(gen.generate(&mut drone, prev, Duration::from_secs(1), &mut rng));
            }
            serde_json::to_string(&rows).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn drone_ids_are_unique_but_seed_stable() {
        let mut rng1 = SimRng::new(5);
        let mut rng2 = SimRng::new(5);
        let a = generate_drone_id("recon", 0, &mut rng1);
        let b = generate_drone_id("recon", 1, &mut rng1);
        assert_ne!(a, b);
        assert!(a.starts_with("recon-0-"));

        let a2 = generate_drone_id("recon", 0, &mut rng2);
        assert_eq!(a, a2);
    }
}

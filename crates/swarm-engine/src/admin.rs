//! Engine operations consumed by the external admin surface.
//!
//! The HTTP handlers and templates live outside the engine; they hold
//! `Arc<Mutex<Simulator>>` and call these operations, each of which takes
//! the lock (via `&mut self` / `&self`) for its entire execution.

use serde::Serialize;
use tracing::error;

use swarm_core::Position;
use swarm_enemy::{Enemy, EnemyKind, EnemyStatus};
use swarm_sink::EventSink;
use swarm_telemetry::{
    battery_status, generate_drone_id, Drone, DroneStatus, MissionRow, TelemetryRow,
};

use crate::sim::{DroneFleet, Simulator};

// ── Snapshot shapes ───────────────────────────────────────────────────────────

/// Aggregated status counts for one fleet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FleetHealth {
    pub name: String,
    pub total: usize,
    pub low_battery: usize,
    pub failed: usize,
}

/// One drone in the map view, with its follow target when committed.
#[derive(Clone, Debug, Serialize)]
pub struct MapDrone {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub battery: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_alt: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MapEnemy {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct MapMission {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

/// Drone, enemy, and mission positions for the map view.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MapData {
    pub drones: Vec<MapDrone>,
    pub enemies: Vec<MapEnemy>,
    pub missions: Vec<MapMission>,
}

/// One entry in the observer's mission log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObserverEvent {
    pub ts: chrono::DateTime<chrono::Utc>,
    pub kind: String,
    pub details: String,
}

// ── Operations ────────────────────────────────────────────────────────────────

impl Simulator {
    /// Flip chaos mode and return the new state.
    pub fn toggle_chaos(&mut self) -> bool {
        self.chaos_mode = !self.chaos_mode;
        self.chaos_mode
    }

    pub fn chaos(&self) -> bool {
        self.chaos_mode
    }

    /// Add a new fleet of `count` drones of `model` at the first zone's
    /// centre.  The fleet is named after the model.
    pub fn launch_swarm(&mut self, model: &str, count: usize) {
        let zone = self.cfg.zones[0].clone();
        let mut drones = Vec::with_capacity(count);
        for i in 0..count {
            drones.push(Drone::new(
                generate_drone_id(model, i, &mut self.rng),
                model.to_owned(),
                Position::new(zone.center_lat, zone.center_lon, 100.0),
                zone.clone(),
            ));
        }
        self.fleets.push(DroneFleet {
            name: model.to_owned(),
            model: model.to_owned(),
            drones,
        });
    }

    /// Status counts per fleet.
    pub fn health(&self) -> Vec<FleetHealth> {
        self.fleets
            .iter()
            .map(|fleet| {
                let mut h = FleetHealth {
                    name: fleet.name.clone(),
                    total: fleet.drones.len(),
                    low_battery: 0,
                    failed: 0,
                };
                for d in &fleet.drones {
                    match d.status {
                        DroneStatus::Failed => h.failed += 1,
                        DroneStatus::LowBattery => h.low_battery += 1,
                        DroneStatus::Ok => {}
                    }
                }
                h
            })
            .collect()
    }

    pub fn config(&self) -> &swarm_core::SimulationConfig {
        &self.cfg
    }

    /// The latest state of every drone as telemetry rows.
    pub fn telemetry_snapshot(&self) -> Vec<TelemetryRow> {
        let now = self.clock.now();
        self.fleets
            .iter()
            .flat_map(|fleet| fleet.drones.iter())
            .map(|d| TelemetryRow {
                cluster_id: self.cluster_id.clone(),
                drone_id: d.id.clone(),
                mission_id: d.mission_id.clone(),
                lat: d.position.lat,
                lon: d.position.lon,
                alt: d.position.alt,
                battery: d.battery,
                status: d.status,
                follow: d.follow_target.is_some(),
                movement_pattern: d.movement_pattern.as_str().to_owned(),
                speed_mps: 0.0,
                heading_deg: 0.0,
                previous_position: d.position,
                synced_from: String::new(),
                synced_id: String::new(),
                synced_at: None,
                ts: now,
            })
            .collect()
    }

    /// Drone, enemy, and mission positions for the 3-D map.
    pub fn map_snapshot(&self) -> MapData {
        let drones = self
            .fleets
            .iter()
            .flat_map(|fleet| fleet.drones.iter())
            .map(|d| MapDrone {
                id: d.id.clone(),
                lat: d.position.lat,
                lon: d.position.lon,
                alt: d.position.alt,
                battery: d.battery,
                follow_lat: d.follow_target.map(|t| t.lat),
                follow_lon: d.follow_target.map(|t| t.lon),
                follow_alt: d.follow_target.map(|t| t.alt),
            })
            .collect();

        let enemies = self
            .enemy
            .enemies
            .iter()
            .map(|e| MapEnemy {
                id: e.id.clone(),
                kind: e.kind,
                lat: e.position.lat,
                lon: e.position.lon,
                alt: e.position.alt,
            })
            .collect();

        let missions = self
            .cfg
            .missions
            .iter()
            .filter_map(|m| {
                self.cfg.mission_zone(m).map(|zone| MapMission {
                    id: if m.id.is_empty() { m.name.clone() } else { m.id.clone() },
                    name: m.name.clone(),
                    lat: zone.center_lat,
                    lon: zone.center_lon,
                    radius_km: zone.radius_km,
                })
            })
            .collect();

        MapData {
            drones,
            enemies,
            missions,
        }
    }

    /// Write one mission metadata row per configured mission.  Called once
    /// at startup by the embedding application.
    pub fn publish_missions(&mut self) {
        let now = self.clock.now();
        let rows: Vec<MissionRow> = self
            .cfg
            .missions
            .iter()
            .filter_map(|m| {
                self.cfg.mission_zone(m).map(|zone| MissionRow {
                    cluster_id: self.cluster_id.clone(),
                    mission_id: if m.id.is_empty() { m.name.clone() } else { m.id.clone() },
                    name: m.name.clone(),
                    lat: zone.center_lat,
                    lon: zone.center_lon,
                    radius_km: zone.radius_km,
                    ts: now,
                })
            })
            .collect();
        if rows.is_empty() {
            return;
        }
        if let Err(e) = self.sink.write_missions(&rows) {
            error!(err = %e, "mission metadata write failed");
        }
    }

    /// Forward admin-surface attachment to interactive sinks.
    pub fn set_admin_status(&mut self, active: bool) {
        self.sink.set_admin_status(active);
    }

    /// Reset a drone's battery, e.g. after a simulated swap.  Status is
    /// rederived from the new level.
    pub fn reset_battery(&mut self, drone_id: &str, level: f64) -> bool {
        match self.find_drone(drone_id) {
            Some((f, d)) => {
                let dr = &mut self.fleets[f].drones[d];
                dr.battery = level.clamp(0.0, 100.0);
                dr.status = battery_status(dr.battery);
                true
            }
            None => false,
        }
    }

    // ── Enemy hooks ───────────────────────────────────────────────────────

    /// Insert a scripted enemy.
    pub fn spawn_enemy(&mut self, enemy: Enemy) {
        self.enemy.spawn(enemy);
    }

    /// Remove an enemy; its committed followers drain on the next tick.
    pub fn remove_enemy(&mut self, id: &str) -> bool {
        self.enemy.remove(id)
    }

    pub fn set_enemy_status(&mut self, id: &str, status: EnemyStatus) -> bool {
        self.enemy.set_status(id, status)
    }

    // ── Observer log ──────────────────────────────────────────────────────

    /// A copy of all recorded mission events.
    pub fn observer_events(&self) -> Vec<ObserverEvent> {
        self.observer_events.clone()
    }

    /// Set the current event index and return the event at that position.
    pub fn observer_step(&mut self, idx: usize) -> Option<ObserverEvent> {
        let event = self.observer_events.get(idx)?.clone();
        self.observer_idx = idx;
        Some(event)
    }

    /// Select a drone to observe.
    pub fn set_perspective(&mut self, drone_id: &str) {
        self.observer_perspective = drone_id.to_owned();
        self.log_observer_event("perspective", drone_id);
    }

    pub fn perspective(&self) -> &str {
        &self.observer_perspective
    }

    /// The index selected by the last `observer_step`.
    pub fn observer_index(&self) -> usize {
        self.observer_idx
    }

    /// Record a scripted command.
    pub fn inject_command(&mut self, cmd: &str) {
        self.log_observer_event("command", cmd);
    }

    fn log_observer_event(&mut self, kind: &str, details: &str) {
        self.observer_events.push(ObserverEvent {
            ts: self.clock.now(),
            kind: kind.to_owned(),
            details: details.to_owned(),
        });
    }
}

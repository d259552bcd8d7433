//! The `Simulator`: world state, construction, and the tick pipeline.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand_distr::{Distribution, StandardNormal};
use tracing::{error, info};

use swarm_core::{Position, SimRng, SimulationConfig, StreamToggles, WallClock};
use swarm_enemy::{DetectionRow, EnemyEngine, EnemyKind};
use swarm_sink::{EventSink, MultiSink};
use swarm_telemetry::{
    generate_drone_id, Drone, DroneStatus, Generator, MovementPattern, SimulationStateRow,
    SwarmEventRow, TelemetryRow,
};

use crate::admin::ObserverEvent;
use crate::{EngineError, EngineResult, ShutdownToken};

/// Sensor-range default when the config leaves it unset.
const DEFAULT_DETECTION_RADIUS_M: f64 = 1000.0;
/// Enemies per region when the config leaves the count unset.
const DEFAULT_ENEMIES_PER_REGION: usize = 3;
/// Half-range of the sensor-error lat/lon perturbation, in degrees.
const SENSOR_ERROR_MAX_OFFSET_DEG: f64 = 0.005;
/// Probability that chaos mode flips a surviving drone to failed.
const CHAOS_FAILURE_PROB: f64 = 0.1;

// ── Fleet ─────────────────────────────────────────────────────────────────────

/// Runtime drones for one fleet.
#[derive(Clone, Debug)]
pub struct DroneFleet {
    pub name: String,
    pub model: String,
    pub drones: Vec<Drone>,
}

/// A per-tick view of one enemy, captured after the enemy engine steps so
/// the drone loop sees a consistent set.
#[derive(Clone, Debug)]
pub(crate) struct EnemyView {
    pub id: String,
    pub kind: EnemyKind,
    pub position: Position,
}

// ── Simulator ─────────────────────────────────────────────────────────────────

/// Owns all world state and drives the per-tick update pipeline.
///
/// Wrap it in a `Mutex`; every externally callable operation takes `&mut
/// self` and therefore the lock for its entire execution, so readers always
/// observe a between-ticks snapshot.
pub struct Simulator {
    pub(crate) cluster_id: String,
    pub(crate) cfg: SimulationConfig,
    pub(crate) fleets: Vec<DroneFleet>,
    pub(crate) generator: Generator,
    pub(crate) enemy: EnemyEngine,
    pub(crate) sink: MultiSink,
    pub(crate) clock: WallClock,
    pub(crate) rng: SimRng,
    pub(crate) tick_interval: Duration,

    pub(crate) chaos_mode: bool,
    pub(crate) follow_confidence: f64,
    pub(crate) detection_radius_m: f64,
    pub(crate) sensor_noise: f64,
    pub(crate) terrain_occlusion: f64,
    pub(crate) weather_impact: f64,
    pub(crate) comm_loss: f64,
    pub(crate) bandwidth_limit: u32,
    pub(crate) messages_sent: u32,
    pub(crate) mission_criticality: i32,
    pub(crate) streams: StreamToggles,

    /// Enemy positions as of the start of the current tick.
    pub(crate) enemy_prev: HashMap<String, Position>,
    /// enemy id → committed follower drone ids, in commitment order.
    pub(crate) followers: BTreeMap<String, Vec<String>>,
    /// enemy id → intended follower count.
    pub(crate) desired: BTreeMap<String, i32>,
    /// drone id → enemy id; the empty string is a reservation marker used
    /// during candidate selection.
    pub(crate) assignments: BTreeMap<String, String>,
    /// Swarm events produced during the current tick, flushed in order
    /// after the detection batch.
    pub(crate) pending_events: Vec<SwarmEventRow>,

    pub(crate) observer_events: Vec<ObserverEvent>,
    pub(crate) observer_idx: usize,
    pub(crate) observer_perspective: String,
}

impl Simulator {
    /// Build a simulator from config.
    ///
    /// Fleets and enemies are spawned here; an empty zone list is fatal.
    pub fn new(
        cluster_id: impl Into<String>,
        cfg: SimulationConfig,
        sink: MultiSink,
        tick_interval: Duration,
        seed: u64,
        clock: WallClock,
    ) -> EngineResult<Self> {
        cfg.validate()?;
        let cluster_id = cluster_id.into();
        let mut rng = SimRng::new(seed);

        let detection_radius_m = if cfg.detection_radius_m > 0.0 {
            cfg.detection_radius_m
        } else {
            DEFAULT_DETECTION_RADIUS_M
        };
        let sensor_noise = cfg.sensor_noise.max(0.0);
        let terrain_occlusion = cfg.terrain_occlusion.clamp(0.0, 1.0);
        let weather_impact = cfg.weather_impact.clamp(0.0, 1.0);
        let mission_criticality = match cfg.mission_criticality.to_lowercase().as_str() {
            "medium" => 1,
            "high" => 2,
            _ => 0,
        };

        // ── Fleets ────────────────────────────────────────────────────────
        let mut fleets = Vec::with_capacity(cfg.fleets.len());
        for fleet_cfg in &cfg.fleets {
            let zone = cfg.fleet_zone(fleet_cfg).clone();
            let mission_id = cfg
                .missions
                .iter()
                .find(|m| m.zone == zone.name)
                .map(|m| if m.id.is_empty() { m.name.clone() } else { m.id.clone() })
                .unwrap_or_default();

            let mut drones = Vec::with_capacity(fleet_cfg.count);
            for i in 0..fleet_cfg.count {
                let mut drone = Drone::new(
                    generate_drone_id(&fleet_cfg.name, i, &mut rng),
                    fleet_cfg.model.clone(),
                    Position::new(zone.center_lat, zone.center_lon, 100.0),
                    zone.clone(),
                );
                drone.mission_id = mission_id.clone();
                drone.movement_pattern = MovementPattern::from_label(&fleet_cfg.movement_pattern);
                drone.waypoints = fleet_cfg.waypoints.clone();
                drone.sensor_error_rate = fleet_cfg.behavior.sensor_error_rate;
                drone.dropout_rate = fleet_cfg.behavior.dropout_rate;
                drone.battery_anomaly_rate = fleet_cfg.behavior.battery_anomaly_rate;
                drones.push(drone);
            }
            fleets.push(DroneFleet {
                name: fleet_cfg.name.clone(),
                model: fleet_cfg.model.clone(),
                drones,
            });
        }

        // ── Enemy engine across all zones ─────────────────────────────────
        let per_region = if cfg.enemy_count > 0 {
            cfg.enemy_count
        } else {
            DEFAULT_ENEMIES_PER_REGION
        };
        let enemy = EnemyEngine::new(
            per_region,
            cfg.zones.clone(),
            cfg.decoy_lifespan_secs,
            cfg.decoy_cap_per_parent,
            &mut rng,
        );

        Ok(Self {
            generator: Generator::new(cluster_id.clone(), clock.clone()),
            cluster_id,
            fleets,
            enemy,
            sink,
            clock,
            rng,
            tick_interval,
            chaos_mode: false,
            follow_confidence: cfg.follow_confidence,
            detection_radius_m,
            sensor_noise,
            terrain_occlusion,
            weather_impact,
            comm_loss: cfg.communication_loss,
            bandwidth_limit: cfg.bandwidth_limit,
            messages_sent: 0,
            mission_criticality,
            streams: cfg.streams,
            enemy_prev: HashMap::new(),
            followers: BTreeMap::new(),
            desired: BTreeMap::new(),
            assignments: BTreeMap::new(),
            pending_events: Vec::new(),
            observer_events: Vec::new(),
            observer_idx: 0,
            observer_perspective: String::new(),
            cfg,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    // ── Tick pipeline ─────────────────────────────────────────────────────

    /// Advance the world by one tick and fan the resulting rows out.
    pub fn tick(&mut self) {
        let mut batch: Vec<TelemetryRow> = Vec::new();
        let mut detections: Vec<DetectionRow> = Vec::new();

        // ① Fresh command budget for this tick.
        self.messages_sent = 0;

        // ② Snapshot enemy positions, then ③ step the enemy engine against
        // the drones' start-of-tick positions.
        self.enemy_prev = self
            .enemy
            .enemies
            .iter()
            .map(|e| (e.id.clone(), e.position))
            .collect();
        let drone_positions: Vec<Position> = self
            .fleets
            .iter()
            .flat_map(|f| f.drones.iter().map(|d| d.position))
            .collect();
        let now = self.clock.now();
        self.enemy.step(&drone_positions, now, &mut self.rng);

        // Consistent enemy set for the whole drone loop.
        let enemy_views: Vec<EnemyView> = self
            .enemy
            .enemies
            .iter()
            .map(|e| EnemyView {
                id: e.id.clone(),
                kind: e.kind,
                position: e.position,
            })
            .collect();

        // ④ Per-drone update, injection, and detection scan.
        for f in 0..self.fleets.len() {
            for d in 0..self.fleets[f].drones.len() {
                let row = match self.update_drone(f, d) {
                    Some(row) => row,
                    None => continue, // dropout: state advanced, row withheld
                };
                let row = if self.chaos_mode {
                    self.inject_chaos(f, d, row)
                } else {
                    row
                };
                batch.push(row);
                self.scan_detections(f, d, &enemy_views, &mut detections);
            }
        }

        // ⑤ Follower failover and replacement selection.
        self.reassign_followers(&enemy_views);

        // ⑥ Fan-out in stream order; a sink error never aborts the tick.
        if self.streams.telemetry && !batch.is_empty() {
            if let Err(e) = self.sink.write_telemetry_batch(&batch) {
                error!(err = %e, "telemetry batch write failed");
            }
        }
        if self.streams.detections && !detections.is_empty() {
            if let Err(e) = self.sink.write_detections(&detections) {
                error!(err = %e, "detection batch write failed");
            }
        }
        let events = std::mem::take(&mut self.pending_events);
        if !events.is_empty() {
            if let Err(e) = self.sink.write_swarm_events(&events) {
                error!(err = %e, "swarm event write failed");
            }
        }
        if self.streams.simulation_state {
            let state = SimulationStateRow {
                cluster_id: self.cluster_id.clone(),
                communication_loss: self.comm_loss,
                messages_sent: self.messages_sent,
                sensor_noise: self.sensor_noise,
                weather_impact: self.weather_impact,
                chaos_mode: self.chaos_mode,
                ts: self.clock.now(),
            };
            if let Err(e) = self.sink.write_state(&state) {
                error!(err = %e, "state write failed");
            }
        }
    }

    /// Follow-drop check, telemetry generation, and stochastic injections
    /// for one drone.  Returns `None` when the row drops out.
    fn update_drone(&mut self, f: usize, d: usize) -> Option<TelemetryRow> {
        // A held assignment is lost to comm loss or drone failure before
        // the drone moves.
        if self.fleets[f].drones[d].follow_target.is_some() {
            let lost = self.rng.gen_bool(self.comm_loss)
                || self.fleets[f].drones[d].status == DroneStatus::Failed;
            if lost {
                self.remove_assignment(f, d);
            }
        }

        let prev = self.fleets[f].drones[d].position;
        let mut row = self.generator.generate(
            &mut self.fleets[f].drones[d],
            prev,
            self.tick_interval,
            &mut self.rng,
        );

        let (sensor_error_rate, battery_anomaly_rate, dropout_rate) = {
            let dr = &self.fleets[f].drones[d];
            (dr.sensor_error_rate, dr.battery_anomaly_rate, dr.dropout_rate)
        };

        if self.rng.gen_bool(sensor_error_rate) {
            row.lat += self
                .rng
                .gen_range(-SENSOR_ERROR_MAX_OFFSET_DEG..SENSOR_ERROR_MAX_OFFSET_DEG);
            row.lon += self
                .rng
                .gen_range(-SENSOR_ERROR_MAX_OFFSET_DEG..SENSOR_ERROR_MAX_OFFSET_DEG);
        }
        if self.rng.gen_bool(battery_anomaly_rate) {
            let drop = self.rng.gen_range(10.0..30.0);
            let dr = &mut self.fleets[f].drones[d];
            dr.battery = (dr.battery - drop).max(0.0);
            row.battery = dr.battery;
        }
        if self.rng.gen_bool(dropout_rate) {
            return None;
        }
        Some(row)
    }

    /// Chaos injection for a row that survived dropout.
    fn inject_chaos(&mut self, f: usize, d: usize, mut row: TelemetryRow) -> TelemetryRow {
        if self.rng.gen_bool(CHAOS_FAILURE_PROB) {
            row.status = DroneStatus::Failed;
            self.fleets[f].drones[d].status = DroneStatus::Failed;
        }
        let extra = self.rng.gen_range(0.0..5.0);
        let dr = &mut self.fleets[f].drones[d];
        dr.battery = (dr.battery - extra).max(0.0);
        row.battery = dr.battery;
        row
    }

    /// Scan all enemies from one drone and emit detection rows; detections
    /// above the confidence gate trigger follower assignment.
    fn scan_detections(
        &mut self,
        f: usize,
        d: usize,
        enemy_views: &[EnemyView],
        out: &mut Vec<DetectionRow>,
    ) {
        let (drone_id, drone_pos) = {
            let dr = &self.fleets[f].drones[d];
            (dr.id.clone(), dr.position)
        };
        let tick_secs = self.tick_interval.as_secs_f64();

        for enemy in enemy_views {
            let dist = drone_pos.distance_m(enemy.position);
            if dist > self.detection_radius_m {
                continue;
            }

            let mut conf = 100.0 * (1.0 - dist / self.detection_radius_m);
            conf *= 1.0 - self.terrain_occlusion;
            conf *= 1.0 - self.weather_impact;
            if self.sensor_noise > 0.0 {
                let z: f64 = StandardNormal.sample(self.rng.inner());
                conf += z * self.sensor_noise * conf;
            }
            conf = conf.clamp(0.0, 100.0);

            let enemy_velocity_mps = match self.enemy_prev.get(&enemy.id) {
                Some(prev) if tick_secs > 0.0 => prev.distance_m(enemy.position) / tick_secs,
                _ => 0.0,
            };

            out.push(DetectionRow {
                cluster_id: self.cluster_id.clone(),
                drone_id: drone_id.clone(),
                enemy_id: enemy.id.clone(),
                enemy_type: enemy.kind,
                lat: enemy.position.lat,
                lon: enemy.position.lon,
                alt: enemy.position.alt,
                drone_lat: drone_pos.lat,
                drone_lon: drone_pos.lon,
                drone_alt: drone_pos.alt,
                distance_m: dist,
                bearing_deg: drone_pos.bearing_deg(enemy.position),
                enemy_velocity_mps,
                confidence: conf,
                ts: self.clock.now(),
            });

            if conf >= self.follow_confidence {
                self.assign_follower(f, d, enemy, conf);
            }
        }
    }

    /// Flush sinks and release their resources.
    pub fn close(&mut self) -> EngineResult<()> {
        self.sink.close().map_err(EngineError::from)
    }
}

// ── Tick driver ───────────────────────────────────────────────────────────────

/// Blocking tick loop: sleep an interval, take the lock, tick.  Returns on
/// cancellation; the admin surface shares the same token.
pub fn run(sim: &Arc<Mutex<Simulator>>, token: &ShutdownToken) {
    let interval = match sim.lock() {
        Ok(s) => s.tick_interval(),
        Err(_) => return,
    };
    info!(interval_ms = interval.as_millis() as u64, "starting simulator");

    while !token.is_cancelled() {
        std::thread::sleep(interval);
        if token.is_cancelled() {
            break;
        }
        match sim.lock() {
            Ok(mut s) => s.tick(),
            Err(e) => {
                error!(err = %e, "engine mutex poisoned, stopping");
                break;
            }
        }
    }
    info!("stopping simulator");
}

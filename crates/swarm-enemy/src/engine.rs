//! The reactive enemy engine.
//!
//! Enemies random-walk until drones close in, then evade and sometimes drop
//! a short-lived decoy; occasionally one pursues another.  Every step is
//! clamped to the enemy's spawn region.  All thresholds are in degrees under
//! the flat-Earth approximation (0.005° ≈ 500 m of latitude).

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use swarm_core::{Position, Region, SimRng};

use crate::types::{Enemy, EnemyKind, EnemyStatus};

/// A drone closer than this (planar degrees) triggers evasion.
const NEAR_THRESHOLD_DEG: f64 = 0.005;
/// Displacement of one evade or pursue step, in degrees.
const REACT_STEP_DEG: f64 = 0.001;
/// Half-range of one random-walk step per axis, in degrees.
const WALK_STEP_DEG: f64 = 0.0005;
/// Probability of dropping a decoy after an evade step.
const DECOY_PROB: f64 = 0.3;
/// Probability of pursuing another enemy instead of walking.
const PURSUE_PROB: f64 = 0.1;

/// Maintains and advances the set of enemy entities.
pub struct EnemyEngine {
    regions: Vec<Region>,
    pub enemies: Vec<Enemy>,
    decoy_lifespan: Option<Duration>,
    decoy_cap: Option<usize>,
}

impl EnemyEngine {
    /// Spawn `per_region` enemies in each region.
    pub fn new(
        per_region: usize,
        regions: Vec<Region>,
        decoy_lifespan_secs: Option<u64>,
        decoy_cap: Option<usize>,
        rng: &mut SimRng,
    ) -> Self {
        let mut enemies = Vec::with_capacity(per_region * regions.len());
        for region in &regions {
            for _ in 0..per_region {
                enemies.push(Enemy {
                    id: random_id(rng),
                    kind: random_kind(rng),
                    parent_id: None,
                    status: EnemyStatus::Active,
                    position: region.random_point(rng),
                    region: region.clone(),
                    confidence: 100.0,
                    expires_at: None,
                });
            }
        }
        Self {
            regions,
            enemies,
            decoy_lifespan: decoy_lifespan_secs.map(|s| Duration::seconds(s as i64)),
            decoy_cap,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    // ── Tick step ─────────────────────────────────────────────────────────

    /// Advance every enemy by one tick.
    ///
    /// `drone_positions` are the friendly positions as of the start of the
    /// tick; they drive evasion.  Expired decoys are dropped before anyone
    /// moves.
    pub fn step(&mut self, drone_positions: &[Position], now: DateTime<Utc>, rng: &mut SimRng) {
        self.enemies.retain(|e| !e.expired(now));

        // Positions snapshot for pursuit targeting: pursuing an enemy that
        // already moved this tick is fine, but the nearest-other scan must
        // see one consistent set.
        let snapshot: Vec<Position> = self.enemies.iter().map(|e| e.position).collect();
        let mut spawned: Vec<Enemy> = Vec::new();

        for i in 0..self.enemies.len() {
            let pos = self.enemies[i].position;

            if let Some(threat) = nearest(pos, drone_positions.iter().copied()) {
                if planar_deg(pos, threat) < NEAR_THRESHOLD_DEG {
                    self.evade(i, threat);
                    if rng.gen_bool(DECOY_PROB) && self.decoy_slot_free(&spawned, i) {
                        spawned.push(self.spawn_decoy(i, now, rng));
                    }
                    self.clamp_to_region(i, rng);
                    continue;
                }
            }

            if rng.gen_bool(PURSUE_PROB) {
                let others = snapshot
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &p)| p);
                if let Some(target) = nearest(pos, others) {
                    self.step_toward(i, target);
                    self.clamp_to_region(i, rng);
                    continue;
                }
            }

            let e = &mut self.enemies[i];
            e.position.lat += rng.gen_range(-WALK_STEP_DEG..WALK_STEP_DEG);
            e.position.lon += rng.gen_range(-WALK_STEP_DEG..WALK_STEP_DEG);
            self.clamp_to_region(i, rng);
        }

        self.enemies.append(&mut spawned);
    }

    // ── Admin hooks ───────────────────────────────────────────────────────

    /// Insert an externally scripted enemy.
    pub fn spawn(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    /// Remove an enemy by id.  Orphaned decoys stay and expire on their own
    /// schedule.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|e| e.id != id);
        self.enemies.len() < before
    }

    pub fn set_status(&mut self, id: &str, status: EnemyStatus) -> bool {
        match self.enemies.iter_mut().find(|e| e.id == id) {
            Some(e) => {
                e.status = status;
                true
            }
            None => false,
        }
    }

    // ── Movement helpers ──────────────────────────────────────────────────

    fn evade(&mut self, i: usize, threat: Position) {
        let e = &mut self.enemies[i];
        let d_lat = e.position.lat - threat.lat;
        let d_lon = e.position.lon - threat.lon;
        let norm = d_lat.hypot(d_lon);
        if norm == 0.0 {
            return;
        }
        e.position.lat += (d_lat / norm) * REACT_STEP_DEG;
        e.position.lon += (d_lon / norm) * REACT_STEP_DEG;
    }

    fn step_toward(&mut self, i: usize, target: Position) {
        let e = &mut self.enemies[i];
        let d_lat = target.lat - e.position.lat;
        let d_lon = target.lon - e.position.lon;
        let norm = d_lat.hypot(d_lon);
        if norm == 0.0 {
            return;
        }
        e.position.lat += (d_lat / norm) * REACT_STEP_DEG;
        e.position.lon += (d_lon / norm) * REACT_STEP_DEG;
    }

    fn clamp_to_region(&mut self, i: usize, rng: &mut SimRng) {
        let e = &mut self.enemies[i];
        if e.region.center().distance_m(e.position) > e.region.radius_km * 1000.0 {
            let alt = e.position.alt;
            e.position = e.region.random_point(rng);
            e.position.alt = alt;
        }
    }

    // ── Decoys ────────────────────────────────────────────────────────────

    fn decoy_slot_free(&self, pending: &[Enemy], parent_idx: usize) -> bool {
        let cap = match self.decoy_cap {
            Some(c) => c,
            None => return true,
        };
        let parent_id = &self.enemies[parent_idx].id;
        let live = self
            .enemies
            .iter()
            .chain(pending)
            .filter(|e| e.parent_id.as_deref() == Some(parent_id))
            .count();
        live < cap
    }

    fn spawn_decoy(&self, parent_idx: usize, now: DateTime<Utc>, rng: &mut SimRng) -> Enemy {
        let parent = &self.enemies[parent_idx];
        let mut position = parent.position;
        position.lat += rng.gen_range(-WALK_STEP_DEG..WALK_STEP_DEG);
        position.lon += rng.gen_range(-WALK_STEP_DEG..WALK_STEP_DEG);
        Enemy {
            id: random_id(rng),
            kind: EnemyKind::Decoy,
            parent_id: Some(parent.id.clone()),
            status: EnemyStatus::Active,
            position,
            region: parent.region.clone(),
            confidence: parent.confidence * 0.5,
            expires_at: self.decoy_lifespan.map(|l| now + l),
        }
    }
}

// ── Free helpers ──────────────────────────────────────────────────────────────

/// Planar degree distance, the cheap metric behind the reaction thresholds.
fn planar_deg(a: Position, b: Position) -> f64 {
    (a.lat - b.lat).hypot(a.lon - b.lon)
}

fn nearest(from: Position, candidates: impl Iterator<Item = Position>) -> Option<Position> {
    candidates.min_by(|a, b| {
        planar_deg(from, *a)
            .partial_cmp(&planar_deg(from, *b))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

fn random_kind(rng: &mut SimRng) -> EnemyKind {
    match rng.gen_range(0..3) {
        0 => EnemyKind::Vehicle,
        1 => EnemyKind::Person,
        _ => EnemyKind::Drone,
    }
}

fn random_id(rng: &mut SimRng) -> String {
    let bytes: [u8; 16] = rng.inner().gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
}

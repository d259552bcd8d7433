//! The swarm coordinator: follower bookkeeping, command admission,
//! intercept geometry, reassignment, and formation rebalance.
//!
//! Bookkeeping invariant: `assignments[drone] = enemy` iff `drone ∈
//! followers[enemy]`; empty follower lists are removed together with their
//! desired-count entry.  The empty string in `assignments` is a reservation
//! marker that keeps a single selection scan from returning duplicates.

use swarm_core::{meters_per_deg_lon, Position, METERS_PER_DEG_LAT};
use swarm_enemy::EnemyKind;
use swarm_telemetry::{DroneStatus, SwarmEventKind, SwarmEventRow};

use crate::sim::{EnemyView, Simulator};

/// Intercept points are predicted this many ticks ahead.
const PREDICTION_TICKS: f64 = 5.0;
/// Lateral spacing between flanking intercept points, in metres.
const INTERCEPT_LATERAL_M: f64 = 50.0;

impl Simulator {
    // ── Command admission ─────────────────────────────────────────────────

    /// One command transmission: debit the tick's bandwidth budget, then
    /// lose the command with probability `comm_loss`.
    pub(crate) fn send_command(&mut self) -> bool {
        if self.bandwidth_limit > 0 && self.messages_sent >= self.bandwidth_limit {
            return false;
        }
        self.messages_sent += 1;
        !self.rng.gen_bool(self.comm_loss)
    }

    // ── Event buffering ───────────────────────────────────────────────────

    /// Buffer a swarm event for this tick; flushed after the detection
    /// batch in production order.
    pub(crate) fn log_swarm_event(
        &mut self,
        kind: SwarmEventKind,
        drone_ids: Vec<String>,
        enemy_id: &str,
    ) {
        if drone_ids.is_empty() || !self.streams.swarm_events {
            return;
        }
        self.pending_events.push(SwarmEventRow {
            cluster_id: self.cluster_id.clone(),
            event_type: kind,
            drone_ids,
            enemy_id: enemy_id.to_owned(),
            ts: self.clock.now(),
        });
    }

    // ── Bookkeeping primitives ────────────────────────────────────────────

    pub(crate) fn find_drone(&self, id: &str) -> Option<(usize, usize)> {
        for (f, fleet) in self.fleets.iter().enumerate() {
            if let Some(d) = fleet.drones.iter().position(|dr| dr.id == id) {
                return Some((f, d));
            }
        }
        None
    }

    /// Unlink a drone from its current enemy (if any) without touching its
    /// follow target.  Keeps the maps reciprocal when a committed drone is
    /// re-selected for a different enemy.
    fn detach(&mut self, drone_id: &str) {
        let Some(enemy_id) = self.assignments.get(drone_id).cloned() else {
            return;
        };
        if enemy_id.is_empty() {
            return;
        }
        if let Some(list) = self.followers.get_mut(&enemy_id) {
            list.retain(|id| id != drone_id);
            if list.is_empty() {
                self.followers.remove(&enemy_id);
                self.desired.remove(&enemy_id);
            }
        }
    }

    /// Drop a drone's commitment and repair both maps.
    pub(crate) fn remove_assignment(&mut self, f: usize, d: usize) {
        let drone_id = self.fleets[f].drones[d].id.clone();
        if let Some(enemy_id) = self.assignments.remove(&drone_id) {
            if let Some(list) = self.followers.get_mut(&enemy_id) {
                list.retain(|id| id != &drone_id);
                if list.is_empty() {
                    self.followers.remove(&enemy_id);
                    self.desired.remove(&enemy_id);
                }
            }
        }
        self.fleets[f].drones[d].follow_target = None;
    }

    // ── Initial assignment ────────────────────────────────────────────────

    /// Commit followers to a freshly detected enemy.
    ///
    /// The desired count comes from the movement-pattern policy, adjusted
    /// by confidence, enemy kind, and mission criticality.  Every admitted
    /// candidate costs one `send_command`; a failed send silently skips
    /// that candidate and the rest of the batch stands.
    pub(crate) fn assign_follower(
        &mut self,
        f: usize,
        detecting: usize,
        enemy: &EnemyView,
        conf: f64,
    ) {
        let pattern = self.fleets[f].drones[detecting].movement_pattern.as_str();
        let mut count = self.cfg.swarm_responses.get(pattern).copied().unwrap_or(0);
        if count >= 0 {
            if conf > 90.0 {
                count += 1;
            }
            match enemy.kind {
                EnemyKind::Vehicle | EnemyKind::Drone => count += 1,
                EnemyKind::Decoy => count = (count - 1).max(0),
                EnemyKind::Person => {}
            }
            count += self.mission_criticality;
        }

        let fleet_len = self.fleets[f].drones.len();
        let candidates: Vec<usize> = if count == 0 {
            vec![detecting]
        } else if count < 0 {
            // Whole-fleet response: every uncommitted drone.
            (0..fleet_len)
                .filter(|&i| self.fleets[f].drones[i].follow_target.is_none())
                .collect()
        } else {
            let mut picked = Vec::new();
            for i in 0..fleet_len {
                if i == detecting {
                    continue;
                }
                if self.fleets[f].drones[i].follow_target.is_none() {
                    picked.push(i);
                    if picked.len() >= count as usize {
                        break;
                    }
                }
            }
            if picked.is_empty() {
                // No free wingmen: the detecting drone follows alone.
                vec![detecting]
            } else {
                picked
            }
        };

        // Admit candidates through the command channel and reserve them.
        let mut selected = Vec::new();
        for i in candidates {
            if self.send_command() {
                let id = self.fleets[f].drones[i].id.clone();
                self.detach(&id);
                self.assignments.insert(id, String::new());
                selected.push(i);
            }
        }

        self.apply_assignments(f, &selected, enemy);
        if !selected.is_empty() {
            let ids: Vec<String> = selected
                .iter()
                .map(|&i| self.fleets[f].drones[i].id.clone())
                .collect();
            self.log_swarm_event(SwarmEventKind::Assignment, ids, &enemy.id);
            self.rebalance_formation(f);
        }

        // Desired count records what was actually achieved, so failover
        // restores to it.
        match self.followers.get(&enemy.id) {
            Some(list) => {
                let len = list.len() as i32;
                self.desired.insert(enemy.id.clone(), len);
            }
            None => {
                self.desired.remove(&enemy.id);
            }
        }
    }

    /// Hand each selected drone its intercept point and record the
    /// commitment in both maps.
    fn apply_assignments(&mut self, f: usize, selected: &[usize], enemy: &EnemyView) {
        if selected.is_empty() {
            return;
        }
        let points = self.intercept_points(enemy, selected.len());
        for (k, &i) in selected.iter().enumerate() {
            let id = {
                let dr = &mut self.fleets[f].drones[i];
                dr.follow_target = Some(points[k]);
                dr.id.clone()
            };
            self.followers
                .entry(enemy.id.clone())
                .or_default()
                .push(id.clone());
            self.assignments.insert(id, enemy.id.clone());
        }
    }

    // ── Intercept geometry ────────────────────────────────────────────────

    /// Predict the enemy's position `PREDICTION_TICKS` ahead and spread `n`
    /// points laterally (perpendicular to its velocity) at 50 m intervals
    /// centred on the prediction.  Zero velocity collapses all points onto
    /// the prediction.
    pub(crate) fn intercept_points(&self, enemy: &EnemyView, n: usize) -> Vec<Position> {
        let target = enemy.position;
        let (v_lat, v_lon) = match self.enemy_prev.get(&enemy.id) {
            Some(prev) => (target.lat - prev.lat, target.lon - prev.lon),
            None => (0.0, 0.0),
        };
        let predicted = Position::new(
            target.lat + v_lat * PREDICTION_TICKS,
            target.lon + v_lon * PREDICTION_TICKS,
            target.alt,
        );
        if n <= 1 {
            return vec![predicted];
        }

        let norm = v_lat.hypot(v_lon);
        let (perp_lat, perp_lon) = if norm != 0.0 {
            (-v_lon / norm, v_lat / norm)
        } else {
            (0.0, 0.0)
        };
        let lat_step = INTERCEPT_LATERAL_M / METERS_PER_DEG_LAT;
        let lon_step = INTERCEPT_LATERAL_M / meters_per_deg_lon(predicted.lat);

        (0..n)
            .map(|i| {
                let offset = i as f64 - (n as f64 - 1.0) / 2.0;
                Position::new(
                    predicted.lat + offset * perp_lat * lat_step,
                    predicted.lon + offset * perp_lon * lon_step,
                    predicted.alt,
                )
            })
            .collect()
    }

    // ── Reassignment / failover ───────────────────────────────────────────

    /// Per enemy: drop followers that lost their target or failed, then
    /// refill toward the desired count from the healthiest free drones.
    pub(crate) fn reassign_followers(&mut self, enemy_views: &[EnemyView]) {
        let enemy_ids: Vec<String> = self.followers.keys().cloned().collect();

        for enemy_id in enemy_ids {
            let committed = self.followers.get(&enemy_id).cloned().unwrap_or_default();

            // ── Cleanup ───────────────────────────────────────────────────
            let mut active = Vec::new();
            let mut removed = Vec::new();
            for id in &committed {
                let healthy = match self.find_drone(id) {
                    Some((f, d)) => {
                        let dr = &self.fleets[f].drones[d];
                        dr.follow_target.is_some() && dr.status == DroneStatus::Ok
                    }
                    None => false,
                };
                if healthy {
                    active.push(id.clone());
                } else {
                    removed.push(id.clone());
                    self.assignments.remove(id);
                    if let Some((f, d)) = self.find_drone(id) {
                        self.fleets[f].drones[d].follow_target = None;
                    }
                }
            }
            if !removed.is_empty() {
                self.log_swarm_event(SwarmEventKind::Unassignment, removed, &enemy_id);
            }

            let desired = self.desired.get(&enemy_id).copied().unwrap_or(0);
            let mut missing = desired - active.len() as i32;
            if missing <= 0 {
                if active.is_empty() {
                    self.followers.remove(&enemy_id);
                    self.desired.remove(&enemy_id);
                } else {
                    self.followers.insert(enemy_id.clone(), active);
                }
                continue;
            }
            self.followers.insert(enemy_id.clone(), active);

            // ── Replacement selection ─────────────────────────────────────
            //
            // The enemy must still be alive to compute intercepts; a dead
            // enemy's entry simply drains through cleanup.
            if let Some(enemy) = enemy_views.iter().find(|e| e.id == enemy_id).cloned() {
                let mut selected: Vec<(usize, usize)> = Vec::new();
                while missing > 0 {
                    let Some((f, d)) = self.select_replacement() else {
                        break;
                    };
                    if !self.send_command() {
                        break;
                    }
                    let id = self.fleets[f].drones[d].id.clone();
                    self.assignments.insert(id, String::new());
                    selected.push((f, d));
                    missing -= 1;
                }

                if !selected.is_empty() {
                    let points = self.intercept_points(&enemy, selected.len());
                    let mut ids = Vec::new();
                    for (k, &(f, d)) in selected.iter().enumerate() {
                        let id = {
                            let dr = &mut self.fleets[f].drones[d];
                            dr.follow_target = Some(points[k]);
                            dr.id.clone()
                        };
                        self.followers
                            .entry(enemy_id.clone())
                            .or_default()
                            .push(id.clone());
                        self.assignments.insert(id.clone(), enemy_id.clone());
                        ids.push(id);
                    }
                    self.log_swarm_event(SwarmEventKind::Assignment, ids, &enemy_id);
                }
            }

            if self.followers.get(&enemy_id).is_none_or(|l| l.is_empty()) {
                self.followers.remove(&enemy_id);
                self.desired.remove(&enemy_id);
            }
        }
    }

    /// The healthiest uncommitted drone across all fleets: status ok, no
    /// follow target, not already reserved, highest battery.
    fn select_replacement(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for (f, fleet) in self.fleets.iter().enumerate() {
            for (d, dr) in fleet.drones.iter().enumerate() {
                if dr.status != DroneStatus::Ok || dr.follow_target.is_some() {
                    continue;
                }
                if self.assignments.contains_key(&dr.id) {
                    continue;
                }
                if best.is_none_or(|(_, _, b)| dr.battery > b) {
                    best = Some((f, d, dr.battery));
                }
            }
        }
        best.map(|(f, d, _)| (f, d))
    }

    // ── Formation rebalance ───────────────────────────────────────────────

    /// Spread a fleet's uncommitted drones on a circle of half the region
    /// radius by rewriting each drone's home-region centre.  The mutation
    /// is not reverted when the enemy is later dropped.
    pub(crate) fn rebalance_formation(&mut self, f: usize) {
        let remaining: Vec<usize> = (0..self.fleets[f].drones.len())
            .filter(|&i| self.fleets[f].drones[i].follow_target.is_none())
            .collect();
        let n = remaining.len();
        if n == 0 {
            return;
        }

        let region = self.fleets[f].drones[remaining[0]].home_region.clone();
        let radius = region.radius_km * 1000.0 * 0.5;
        for (i, &d) in remaining.iter().enumerate() {
            let angle = i as f64 / n as f64 * std::f64::consts::TAU;
            let d_lat = (radius * angle.cos()) / METERS_PER_DEG_LAT;
            let d_lon = (radius * angle.sin()) / meters_per_deg_lon(region.center_lat);
            let dr = &mut self.fleets[f].drones[d];
            dr.home_region.center_lat = region.center_lat + d_lat;
            dr.home_region.center_lon = region.center_lon + d_lon;
        }

        let ids: Vec<String> = remaining
            .iter()
            .map(|&i| self.fleets[f].drones[i].id.clone())
            .collect();
        self.log_swarm_event(SwarmEventKind::FormationChange, ids, "");
    }
}

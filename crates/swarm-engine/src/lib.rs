//! `swarm-engine` — the tick engine and swarm coordinator.
//!
//! # The tick pipeline
//!
//! ```text
//! tick():                          (entire tick under the engine mutex)
//!   ① Reset the per-tick command budget.
//!   ② Snapshot enemy positions (velocity estimation for intercepts).
//!   ③ Step the enemy engine (evade / decoy / pursue / walk / clamp).
//!   ④ Per drone: drop lost followers → generate telemetry → inject
//!      sensor error, battery anomaly, dropout, chaos → scan for
//!      detections → assign followers above the confidence gate.
//!   ⑤ Reassign/fail-over followers per enemy.
//!   ⑥ Fan out: telemetry batch, detection batch, swarm events in
//!      production order, then one simulation-state row.
//! ```
//!
//! The [`Simulator`] owns all world state; callers wrap it in a
//! `Mutex` and every externally callable operation takes the lock for its
//! whole execution.  Determinism comes from the injected [`SimRng`] and
//! [`WallClock`] — two engines built with the same seed, clock, and config
//! produce byte-identical streams.
//!
//! [`SimRng`]: swarm_core::SimRng
//! [`WallClock`]: swarm_core::WallClock

pub mod admin;
pub mod coordinator;
pub mod error;
pub mod replay;
pub mod shutdown;
pub mod sim;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use admin::{FleetHealth, MapData, MapDrone, MapEnemy, MapMission, ObserverEvent};
pub use error::{EngineError, EngineResult};
pub use replay::{replay, replay_file};
pub use shutdown::ShutdownToken;
pub use sim::{run, DroneFleet, Simulator};

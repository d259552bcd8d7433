//! `swarm-telemetry` — drone state, movement, and telemetry generation.
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`drone`]     | `Drone`, `DroneStatus`, battery model                 |
//! | [`movement`]  | `MovementStrategy` trait and the five strategies      |
//! | [`generator`] | Per-tick telemetry generation                         |
//! | [`row`]       | Serde row types for every output stream               |

pub mod drone;
pub mod generator;
pub mod movement;
pub mod row;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use drone::{
    battery_drain, battery_status, generate_drone_id, Drone, DroneStatus, MovementPattern,
    BATTERY_FAILURE_THRESHOLD, BATTERY_LOW_THRESHOLD,
};
pub use generator::Generator;
pub use movement::{
    strategy_for, FollowMovement, LoiterMovement, MovementStrategy, PatrolMovement,
    PointToPointMovement, RandomWalkMovement,
};
pub use row::{MissionRow, SimulationStateRow, SwarmEventKind, SwarmEventRow, TelemetryRow};

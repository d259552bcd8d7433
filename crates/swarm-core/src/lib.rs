//! `swarm-core` — foundational types for the swarmsim simulator.
//!
//! This crate is a dependency of every other `swarm-*` crate.  It
//! intentionally has no `swarm-*` dependencies and a small external surface
//! (`rand`, `chrono`, `serde`, `thiserror`).
//!
//! # What lives here
//!
//! | Module     | Contents                                               |
//! |------------|--------------------------------------------------------|
//! | [`geo`]    | `Position`, `Region`, haversine distance, bearing      |
//! | [`rng`]    | `SimRng` — seedable deterministic randomness           |
//! | [`clock`]  | `WallClock` — injectable wall-clock source             |
//! | [`config`] | Typed simulation configuration                         |
//! | [`error`]  | `CoreError`, `CoreResult`                              |

pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use clock::WallClock;
pub use config::{
    BehaviorConfig, FleetConfig, MissionConfig, SimulationConfig, StreamToggles,
};
pub use error::{CoreError, CoreResult};
pub use geo::{meters_per_deg_lon, Position, Region, EARTH_RADIUS_M, METERS_PER_DEG_LAT};
pub use rng::SimRng;

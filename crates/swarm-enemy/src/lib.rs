//! `swarm-enemy` — simulated hostile entities.
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`types`]  | `Enemy`, `EnemyKind`, `EnemyStatus`, `DetectionRow`       |
//! | [`engine`] | The reactive enemy engine (evade / decoy / pursue / walk) |

pub mod engine;
pub mod types;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use engine::EnemyEngine;
pub use types::{DetectionRow, Enemy, EnemyKind, EnemyStatus};

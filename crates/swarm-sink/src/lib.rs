//! `swarm-sink` — output sinks for the four simulator streams.
//!
//! Four stream kinds flow out of the engine: telemetry, detections, swarm
//! events, and simulation state (plus one-shot mission metadata).  A sink
//! implements [`EventSink`] and overrides the methods for the streams it
//! carries; everything else defaults to a no-op, which is how a sink
//! "advertises" its capabilities.  [`MultiSink`] fans every row out to an
//! ordered sink list.
//!
//! | Module     | Sink                                                      |
//! |------------|-----------------------------------------------------------|
//! | [`file`]   | Newline-delimited JSON files (one per stream)             |
//! | [`stdout`] | One JSON object per line on standard output               |
//! | [`color`]  | ANSI-colorized human-friendly stdout lines                |
//! | [`store`]  | Columnar time-series store over HTTP (GreptimeDB)         |
//! | [`tui`]    | Channel into a terminal UI's own event loop               |
//! | [`multi`]  | Ordered fan-out over any of the above                     |

pub mod color;
pub mod error;
pub mod file;
pub mod multi;
pub mod sink;
pub mod stdout;
pub mod store;
pub mod tui;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use color::ColorStdoutSink;
pub use error::{SinkError, SinkResult};
pub use file::FileSink;
pub use multi::MultiSink;
pub use sink::EventSink;
pub use stdout::StdoutSink;
pub use store::{GreptimeSink, StoreTables};
pub use tui::{TuiSink, TuiState};

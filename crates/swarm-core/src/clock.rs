//! Injectable wall-clock source.
//!
//! Row timestamps come from a `WallClock` handed to the simulator at
//! construction.  Production code uses [`WallClock::system`]; tests pin the
//! clock with [`WallClock::fixed`] and assert byte-identical output streams.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A source of "now" in UTC.  Cheap to clone; clones share the same source.
#[derive(Clone)]
pub struct WallClock(Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>);

impl WallClock {
    /// The real system clock.
    pub fn system() -> Self {
        WallClock(Arc::new(Utc::now))
    }

    /// A clock frozen at `t`.
    pub fn fixed(t: DateTime<Utc>) -> Self {
        WallClock(Arc::new(move || t))
    }

    /// A clock driven by an arbitrary closure (e.g. a stepping test clock).
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        WallClock(Arc::new(f))
    }

    #[inline]
    pub fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for WallClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WallClock")
    }
}

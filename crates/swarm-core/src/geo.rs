//! Geographic value types and spatial helpers.
//!
//! All geometry in the simulator uses a flat-Earth small-angle approximation
//! for local displacements (111,000 m per degree of latitude, longitude
//! scaled by `cos(lat)`) and the haversine formula for distances.  That is
//! plenty for regions a few tens of kilometres across; authoritative geodesy
//! is a non-goal.

use serde::{Deserialize, Serialize};

use crate::SimRng;

/// Mean Earth radius in metres, used by the haversine distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of latitude under the flat-Earth approximation.
pub const METERS_PER_DEG_LAT: f64 = 111_000.0;

/// Metres per degree of longitude at the given latitude.
#[inline]
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    METERS_PER_DEG_LAT * lat_deg.to_radians().cos()
}

// ── Position ──────────────────────────────────────────────────────────────────

/// A geographic coordinate: decimal degrees plus altitude in metres.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    /// Metres above ground level; never negative.
    pub alt: f64,
}

impl Position {
    #[inline]
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: Position) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Initial bearing from `self` to `other` in degrees: 0° = north,
    /// clockwise, normalised to `[0, 360)`.
    pub fn bearing_deg(self, other: Position) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.1} m)", self.lat, self.lon, self.alt)
    }
}

// ── Region ────────────────────────────────────────────────────────────────────

/// A circular operational area: a named centre point plus a radius.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_km: f64,
}

impl Region {
    /// The region centre at ground level.
    #[inline]
    pub fn center(&self) -> Position {
        Position::new(self.center_lat, self.center_lon, 0.0)
    }

    /// A point is in the region iff its haversine distance to the centre is
    /// at most `radius_km`.
    pub fn contains(&self, p: Position) -> bool {
        self.center().distance_m(p) <= self.radius_km * 1000.0
    }

    /// A uniformly random angle and radius inside the region, at ground
    /// level.
    pub fn random_point(&self, rng: &mut SimRng) -> Position {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let r = rng.gen_range(0.0..self.radius_km * 1000.0);
        let d_lat = (r * angle.cos()) / METERS_PER_DEG_LAT;
        let d_lon = (r * angle.sin()) / meters_per_deg_lon(self.center_lat);
        Position::new(self.center_lat + d_lat, self.center_lon + d_lon, 0.0)
    }
}

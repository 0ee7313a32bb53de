//! Source and receiver positions on a spherical earth.
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const TWO_PI: f64 = 2.0 * PI;

/// Distances below this (radians) leave azimuth undefined.
pub const MIN_AZIMUTH_DISTANCE: f64 = 1e-7;

/// A point given by latitude and longitude in radians and depth in km.
///
/// Serialized with latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LocationDegrees", into = "LocationDegrees")]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LocationDegrees {
    lat: f64,
    lon: f64,
    #[serde(default)]
    depth: f64,
}

impl From<LocationDegrees> for Location {
    fn from(d: LocationDegrees) -> Self {
        Location::from_degrees(d.lat, d.lon, d.depth)
    }
}

impl From<Location> for LocationDegrees {
    fn from(l: Location) -> Self {
        LocationDegrees {
            lat: l.lat_degrees(),
            lon: l.lon_degrees(),
            depth: l.depth,
        }
    }
}

impl Location {
    pub fn new(lat: f64, lon: f64, depth: f64) -> Self {
        Self { lat, lon, depth }
    }

    pub fn from_degrees(lat: f64, lon: f64, depth: f64) -> Self {
        Self::new(lat.to_radians(), lon.to_radians(), depth)
    }

    pub fn lat_degrees(&self) -> f64 {
        self.lat.to_degrees()
    }

    pub fn lon_degrees(&self) -> f64 {
        self.lon.to_degrees()
    }

    /// Great-circle separation from `self` to `other`, in radians.
    pub fn distance(&self, other: &Location) -> f64 {
        let dlon = other.lon - self.lon;
        let (sin1, cos1) = self.lat.sin_cos();
        let (sin2, cos2) = other.lat.sin_cos();
        let y = ((cos2 * dlon.sin()).powi(2)
            + (cos1 * sin2 - sin1 * cos2 * dlon.cos()).powi(2))
        .sqrt();
        let x = sin1 * sin2 + cos1 * cos2 * dlon.cos();
        y.atan2(x)
    }

    /// Azimuth from `self` toward `other`, radians clockwise from north in
    /// [0, 2π). `None` when the points coincide.
    pub fn azimuth(&self, other: &Location) -> Option<f64> {
        if self.distance(other) < MIN_AZIMUTH_DISTANCE {
            return None;
        }
        let dlon = other.lon - self.lon;
        let y = dlon.sin() * other.lat.cos();
        let x = self.lat.cos() * other.lat.sin() - self.lat.sin() * other.lat.cos() * dlon.cos();
        Some((y.atan2(x) + TWO_PI) % TWO_PI)
    }
}

//! Pixel and geographic positions.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPos {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPos {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && self.lat.abs() <= 90.0
    }

    /// Position on the unit sphere.
    pub fn to_unit_vector(&self) -> Vector3<f64> {
        let (lon, lat) = (self.lon.to_radians(), self.lat.to_radians());
        Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    /// Inverse of [`to_unit_vector`](Self::to_unit_vector); the vector need
    /// not be normalized.
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        let horizontal = (v.x * v.x + v.y * v.y).sqrt();
        Self {
            lon: v.y.atan2(v.x).to_degrees(),
            lat: v.z.atan2(horizontal).to_degrees(),
        }
    }
}

/// A position in scene raster coordinates; pixel `(i, j)` spans
/// `[i, i + 1) x [j, j + 1)` and has its centre at `(i + 0.5, j + 0.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: f64,
    pub y: f64,
}

impl PixelPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Centre of pixel `(i, j)`.
    pub fn center_of(i: usize, j: usize) -> Self {
        Self::new(i as f64 + 0.5, j as f64 + 0.5)
    }

    pub fn distance(&self, other: &PixelPos) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Wrap a longitude difference into `[-180, 180)`.
pub fn wrap_lon_delta(delta: f64) -> f64 {
    (delta + 180.0).rem_euclid(360.0) - 180.0
}

//! Generators for synthetic swath geolocation and sample grids.
//!
//! All generators are deterministic so tests can recompute the expected
//! value of any sample from its position.

/// Creates an encoded count grid: `base + row * width + col`, wrapping at
/// `u16::MAX - 1` so the fill value 65535 never appears.
pub fn create_count_grid(width: usize, height: usize, base: u16) -> Vec<u16> {
    (0..width * height)
        .map(|k| ((base as usize + k) % (u16::MAX as usize - 1)) as u16)
        .collect()
}

/// Wraps a longitude into (-180, 180].
pub fn wrap_lon(lon: f64) -> f64 {
    let mut wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        wrapped = 180.0;
    }
    wrapped
}

/// Tie-point grid size for a scene: `ceil(width / cx)` x `ceil(height / ry)`.
pub fn tie_point_grid_size(width: usize, height: usize, cx: usize, ry: usize) -> (usize, usize) {
    (width.div_ceil(cx), height.div_ceil(ry))
}

/// Shape of a synthetic swath's geolocation.
///
/// Positions are a smooth function of continuous scene coordinates, so
/// pixel-level and tie-point-level samples of the same swath agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Swath {
    /// A locally flat swath centred on a position, rotated clockwise by
    /// `rotation` degrees. Lines run southwards.
    Regular {
        center_lon: f64,
        center_lat: f64,
        /// Degrees of arc per scene pixel.
        step: f64,
        rotation: f64,
    },
    /// An azimuthal swath centred on the north pole.
    Polar { step: f64 },
}

impl Swath {
    pub fn regular(center_lon: f64, center_lat: f64, step: f64) -> Self {
        Swath::Regular {
            center_lon,
            center_lat,
            step,
            rotation: 0.0,
        }
    }

    pub fn tilted(center_lon: f64, center_lat: f64, step: f64, rotation: f64) -> Self {
        Swath::Regular {
            center_lon,
            center_lat,
            step,
            rotation,
        }
    }

    pub fn polar(step: f64) -> Self {
        Swath::Polar { step }
    }

    /// Longitude and latitude at continuous scene position `(x, y)` of a
    /// `width` x `height` scene.
    pub fn position(&self, width: usize, height: usize, x: f64, y: f64) -> (f64, f64) {
        let u = x - width as f64 / 2.0;
        let v = y - height as f64 / 2.0;
        match *self {
            Swath::Regular {
                center_lon,
                center_lat,
                step,
                rotation,
            } => {
                let (sin, cos) = rotation.to_radians().sin_cos();
                let east = (u * cos - v * sin) * step;
                let north = -(u * sin + v * cos) * step;
                let lat = center_lat + north;
                let lon = center_lon + east / center_lat.to_radians().cos();
                (wrap_lon(lon), lat)
            }
            Swath::Polar { step } => {
                let dx = u * step;
                let dy = v * step;
                let lat = 90.0 - dx.hypot(dy);
                let lon = dx.atan2(-dy).to_degrees();
                (wrap_lon(lon), lat)
            }
        }
    }

    /// Longitudes and latitudes at every pixel centre.
    pub fn pixel_grid(&self, width: usize, height: usize) -> (Vec<f64>, Vec<f64>) {
        let mut lons = Vec::with_capacity(width * height);
        let mut lats = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let (lon, lat) = self.position(width, height, col as f64 + 0.5, row as f64 + 0.5);
                lons.push(lon);
                lats.push(lat);
            }
        }
        (lons, lats)
    }

    /// Longitudes and latitudes at tie points `(i * cx, j * ry)`.
    pub fn tie_point_grid(
        &self,
        width: usize,
        height: usize,
        cx: usize,
        ry: usize,
    ) -> (Vec<f64>, Vec<f64>) {
        let (grid_width, grid_height) = tie_point_grid_size(width, height, cx, ry);
        let mut lons = Vec::with_capacity(grid_width * grid_height);
        let mut lats = Vec::with_capacity(grid_width * grid_height);
        for j in 0..grid_height {
            for i in 0..grid_width {
                let (lon, lat) = self.position(width, height, (i * cx) as f64, (j * ry) as f64);
                lons.push(lon);
                lats.push(lat);
            }
        }
        (lons, lats)
    }
}

impl Default for Swath {
    fn default() -> Self {
        Swath::tilted(10.0, 45.0, 0.01, 12.0)
    }
}

/// Encodes degrees as micro-degrees, the way geolocation variables store them.
pub fn to_micro_degrees(values: &[f64]) -> Vec<i32> {
    values.iter().map(|v| (v * 1e6).round() as i32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_grid_skips_fill_value() {
        let grid = create_count_grid(4, 4, 65530);
        assert!(!grid.contains(&u16::MAX));
        assert_eq!(grid[0], 65530);
    }

    #[test]
    fn test_wrap_lon() {
        assert_eq!(wrap_lon(190.0), -170.0);
        assert_eq!(wrap_lon(-180.0), 180.0);
        assert_eq!(wrap_lon(45.0), 45.0);
    }

    #[test]
    fn test_regular_swath_is_centred() {
        let swath = Swath::regular(10.0, 45.0, 0.01);
        let (lon, lat) = swath.position(100, 50, 50.0, 25.0);
        assert!((lon - 10.0).abs() < 1e-12);
        assert!((lat - 45.0).abs() < 1e-12);

        // Lines run south.
        let (_, lat_below) = swath.position(100, 50, 50.0, 35.0);
        assert!(lat_below < lat);
    }

    #[test]
    fn test_tie_points_sample_the_same_surface() {
        let swath = Swath::default();
        let (pixel_lons, _) = swath.pixel_grid(16, 8);
        let (tp_lons, tp_lats) = swath.tie_point_grid(16, 8, 4, 2);
        assert_eq!(tp_lons.len(), 4 * 4);
        assert_eq!(tp_lats.len(), 4 * 4);

        let (lon, _) = swath.position(16, 8, 4.5, 0.5);
        assert_eq!(pixel_lons[4], lon);
    }

    #[test]
    fn test_polar_swath_contains_pole() {
        let (_, lats) = Swath::polar(0.05).pixel_grid(21, 21);
        let max = lats.iter().cloned().fold(f64::MIN, f64::max);
        assert!(max > 89.9);
    }
}

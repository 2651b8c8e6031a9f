//! Consistency checks run when a geocoding is built.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::raster::GeoRaster;
use crate::types::wrap_lon_delta;

/// Which checks to run on the geolocation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoChecks {
    None,
    /// Detect antimeridian crossing and pole containment.
    Poles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pole {
    North,
    South,
}

/// Outcome of [`GeoChecks::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub crosses_antimeridian: bool,
    pub pole: Option<Pole>,
}

impl CheckResult {
    /// Whether plain lon/lat interpolation would be wrong for this grid.
    pub fn needs_vector_interpolation(&self) -> bool {
        self.crosses_antimeridian || self.pole.is_some()
    }
}

impl GeoChecks {
    pub fn run(&self, raster: &GeoRaster) -> CheckResult {
        match self {
            GeoChecks::None => CheckResult::default(),
            GeoChecks::Poles => {
                let result = CheckResult {
                    crosses_antimeridian: crosses_antimeridian(raster),
                    pole: contained_pole(raster),
                };
                debug!(
                    lon = %raster.lon_variable_name,
                    antimeridian = result.crosses_antimeridian,
                    pole = ?result.pole,
                    "Geolocation checks"
                );
                result
            }
        }
    }
}

/// Any two neighbouring nodes more than 180 degrees of longitude apart.
pub fn crosses_antimeridian(raster: &GeoRaster) -> bool {
    let (w, h) = (raster.raster_width, raster.raster_height);
    let lons = &raster.longitudes;
    let jump = |a: f64, b: f64| (a - b).abs() > 180.0;

    for j in 0..h {
        for i in 0..w {
            let here = lons[raster.index(i, j)];
            if i + 1 < w && jump(here, lons[raster.index(i + 1, j)]) {
                return true;
            }
            if j + 1 < h && jump(here, lons[raster.index(i, j + 1)]) {
                return true;
            }
        }
    }
    false
}

/// Grid indices of the border, walked once around.
fn border_indices(raster: &GeoRaster) -> Vec<usize> {
    let (w, h) = (raster.raster_width, raster.raster_height);
    let mut indices = Vec::with_capacity(2 * (w + h));
    indices.extend((0..w).map(|i| raster.index(i, 0)));
    indices.extend((1..h).map(|j| raster.index(w - 1, j)));
    if h > 1 {
        indices.extend((0..w.saturating_sub(1)).rev().map(|i| raster.index(i, h - 1)));
    }
    if w > 1 {
        indices.extend((1..h.saturating_sub(1)).rev().map(|j| raster.index(0, j)));
    }
    indices
}

/// Pole enclosed by the grid border, found from the border's longitude winding.
pub fn contained_pole(raster: &GeoRaster) -> Option<Pole> {
    if raster.raster_width < 2 || raster.raster_height < 2 {
        return None;
    }

    let border: Vec<f64> = border_indices(raster)
        .into_iter()
        .map(|k| raster.longitudes[k])
        .filter(|lon| lon.is_finite())
        .collect();
    if border.len() < 3 {
        return None;
    }

    let winding: f64 = border
        .iter()
        .zip(border.iter().cycle().skip(1))
        .map(|(a, b)| wrap_lon_delta(b - a))
        .sum();
    if winding.abs() < 180.0 {
        return None;
    }

    let (sum, count) = raster
        .latitudes
        .iter()
        .filter(|lat| lat.is_finite())
        .fold((0.0, 0usize), |(s, c), lat| (s + lat, c + 1));
    if count == 0 {
        return None;
    }
    Some(if sum >= 0.0 { Pole::North } else { Pole::South })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(lons: Vec<f64>, lats: Vec<f64>, w: usize, h: usize) -> GeoRaster {
        GeoRaster::pixel(lons, lats, "lon", "lat", w, h, 1.0).unwrap()
    }

    #[test]
    fn test_regular_grid_passes() {
        let lons = vec![10.0, 11.0, 12.0, 10.0, 11.0, 12.0];
        let lats = vec![50.0, 50.0, 50.0, 49.0, 49.0, 49.0];
        let result = GeoChecks::Poles.run(&raster(lons, lats, 3, 2));
        assert_eq!(result, CheckResult::default());
        assert!(!result.needs_vector_interpolation());
    }

    #[test]
    fn test_antimeridian_detected() {
        let lons = vec![178.0, 179.5, -179.0, 178.0, 179.5, -179.0];
        let lats = vec![10.0, 10.0, 10.0, 9.0, 9.0, 9.0];
        let result = GeoChecks::Poles.run(&raster(lons, lats, 3, 2));
        assert!(result.crosses_antimeridian);
        assert_eq!(result.pole, None);
    }

    #[test]
    fn test_pole_detected_from_border_winding() {
        // 3x3 grid centred on the north pole.
        let lons = vec![-135.0, 180.0, 135.0, -90.0, 0.0, 90.0, -45.0, 0.0, 45.0];
        let lats = vec![88.0, 88.5, 88.0, 88.5, 90.0, 88.5, 88.0, 88.5, 88.0];
        let result = GeoChecks::Poles.run(&raster(lons, lats, 3, 3));
        assert_eq!(result.pole, Some(Pole::North));
        assert!(result.needs_vector_interpolation());
    }

    #[test]
    fn test_no_checks() {
        let lons = vec![178.0, -179.0];
        let lats = vec![0.0, 0.0];
        assert_eq!(GeoChecks::None.run(&raster(lons, lats, 2, 1)), CheckResult::default());
    }
}

//! Prepared geolocation grid shared by the coding components.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::checks::CheckResult;
use crate::raster::GeoRaster;
use crate::types::{GeoPos, PixelPos};

/// A [`GeoRaster`] with per-node unit vectors and the check outcome.
#[derive(Debug, Clone)]
pub struct GeoGrid {
    raster: GeoRaster,
    vectors: Vec<Vector3<f64>>,
    checks: CheckResult,
}

impl GeoGrid {
    pub fn new(raster: GeoRaster, checks: CheckResult) -> Self {
        let vectors = raster
            .longitudes
            .par_iter()
            .zip(raster.latitudes.par_iter())
            .map(|(&lon, &lat)| {
                let pos = GeoPos::new(lon, lat);
                if pos.is_valid() {
                    pos.to_unit_vector()
                } else {
                    Vector3::new(f64::NAN, f64::NAN, f64::NAN)
                }
            })
            .collect();
        Self {
            raster,
            vectors,
            checks,
        }
    }

    pub fn raster(&self) -> &GeoRaster {
        &self.raster
    }

    pub fn checks(&self) -> &CheckResult {
        &self.checks
    }

    pub fn width(&self) -> usize {
        self.raster.raster_width
    }

    pub fn height(&self) -> usize {
        self.raster.raster_height
    }

    /// Whether `pixel` lies inside the scene raster.
    pub fn contains(&self, pixel: PixelPos) -> bool {
        pixel.x >= 0.0
            && pixel.y >= 0.0
            && pixel.x < self.raster.scene_width as f64
            && pixel.y < self.raster.scene_height as f64
    }

    pub fn node(&self, i: usize, j: usize) -> GeoPos {
        let k = self.raster.index(i, j);
        GeoPos::new(self.raster.longitudes[k], self.raster.latitudes[k])
    }

    pub fn node_vector(&self, i: usize, j: usize) -> &Vector3<f64> {
        &self.vectors[self.raster.index(i, j)]
    }

    /// Grid node nearest to a scene position.
    pub fn nearest_node(&self, pixel: PixelPos) -> (usize, usize) {
        let (gx, gy) = self.raster.grid_coordinates(pixel.x, pixel.y);
        let clamp = |g: f64, n: usize| (g + 0.5).floor().clamp(0.0, (n - 1) as f64) as usize;
        (clamp(gx, self.width()), clamp(gy, self.height()))
    }

    /// Bilinear interpolation at a scene position.
    ///
    /// Positions beyond the outermost nodes are extrapolated from the edge
    /// cell. Interpolates unit vectors when the checks found an antimeridian
    /// crossing or a pole, longitude and latitude otherwise.
    pub fn interpolate(&self, pixel: PixelPos) -> Option<GeoPos> {
        let (gx, gy) = self.raster.grid_coordinates(pixel.x, pixel.y);
        let (i0, fx) = cell(gx, self.width());
        let (j0, fy) = cell(gy, self.height());
        let i1 = (i0 + 1).min(self.width() - 1);
        let j1 = (j0 + 1).min(self.height() - 1);

        let weights = [
            (i0, j0, (1.0 - fx) * (1.0 - fy)),
            (i1, j0, fx * (1.0 - fy)),
            (i0, j1, (1.0 - fx) * fy),
            (i1, j1, fx * fy),
        ];

        let pos = if self.checks.needs_vector_interpolation() {
            let v = weights
                .iter()
                .fold(Vector3::<f64>::zeros(), |acc, &(i, j, w)| acc + self.node_vector(i, j) * w);
            if v.norm() < 1e-12 {
                return None;
            }
            GeoPos::from_vector(&v)
        } else {
            let (lon, lat) = weights.iter().fold((0.0, 0.0), |(lon, lat), &(i, j, w)| {
                let node = self.node(i, j);
                (lon + node.lon * w, lat + node.lat * w)
            });
            GeoPos::new(lon, lat.clamp(-90.0, 90.0))
        };

        pos.is_valid().then_some(pos)
    }
}

/// Lower cell index and fractional offset along one axis of `n` nodes.
fn cell(g: f64, n: usize) -> (usize, f64) {
    if n < 2 {
        return (0, 0.0);
    }
    let i0 = g.floor().clamp(0.0, (n - 2) as f64);
    (i0 as usize, g - i0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GeoGrid {
        // lon = 10 + i, lat = 50 - j on a 3x3 tie-point grid, subsampling 4.
        let mut lons = Vec::new();
        let mut lats = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                lons.push(10.0 + i as f64);
                lats.push(50.0 - j as f64);
            }
        }
        let raster = GeoRaster::tie_point(
            lons, lats, "TP_longitude", "TP_latitude", 3, 3, 9, 9, 1.2, 0.5, 0.5, 4.0, 4.0,
        )
        .unwrap();
        GeoGrid::new(raster, CheckResult::default())
    }

    #[test]
    fn test_interpolation_hits_nodes() {
        let grid = grid();
        let pos = grid.interpolate(PixelPos::new(4.5, 8.5)).unwrap();
        assert!((pos.lon - 11.0).abs() < 1e-12);
        assert!((pos.lat - 48.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_between_and_beyond_nodes() {
        let grid = grid();
        let pos = grid.interpolate(PixelPos::new(2.5, 0.5)).unwrap();
        assert!((pos.lon - 10.5).abs() < 1e-12);

        // Past the last node: extrapolated from the edge cell.
        let pos = grid.interpolate(PixelPos::new(9.0, 0.5)).unwrap();
        assert!((pos.lon - 12.125).abs() < 1e-12);
    }

    #[test]
    fn test_contains_excludes_far_edges() {
        let grid = grid();
        assert!(grid.contains(PixelPos::new(0.0, 0.0)));
        assert!(grid.contains(PixelPos::new(8.99, 8.99)));
        assert!(!grid.contains(PixelPos::new(9.0, 4.0)));
        assert!(!grid.contains(PixelPos::new(4.0, 9.0)));
    }

    #[test]
    fn test_nearest_node() {
        let grid = grid();
        assert_eq!(grid.nearest_node(PixelPos::new(0.0, 0.0)), (0, 0));
        assert_eq!(grid.nearest_node(PixelPos::new(2.6, 0.0)), (1, 0));
        assert_eq!(grid.nearest_node(PixelPos::new(100.0, 100.0)), (2, 2));
    }
}

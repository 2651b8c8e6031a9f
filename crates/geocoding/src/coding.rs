//! Geocoding assembled from a raster and coding components.

use tracing::debug;

use crate::checks::{CheckResult, GeoChecks};
use crate::forward::ForwardCoding;
use crate::grid::GeoGrid;
use crate::inverse::InverseCoding;
use crate::raster::GeoRaster;
use crate::types::{GeoPos, PixelPos};

/// A geocoding built from a [`GeoRaster`], one forward and one inverse coding.
#[derive(Debug)]
pub struct ComponentGeoCoding {
    grid: GeoGrid,
    forward: Box<dyn ForwardCoding>,
    inverse: Box<dyn InverseCoding>,
    checks: GeoChecks,
}

impl ComponentGeoCoding {
    /// Run the checks on `raster` and initialize the inverse coding.
    pub fn new(
        raster: GeoRaster,
        forward: Box<dyn ForwardCoding>,
        mut inverse: Box<dyn InverseCoding>,
        checks: GeoChecks,
    ) -> Self {
        let check_result = checks.run(&raster);
        let grid = GeoGrid::new(raster, check_result);
        inverse.initialize(&grid);

        debug!(
            forward = forward.key(),
            inverse = inverse.key(),
            grid_width = grid.width(),
            grid_height = grid.height(),
            "Initialized geocoding"
        );

        Self {
            grid,
            forward,
            inverse,
            checks,
        }
    }

    pub fn pixel_to_geo(&self, pixel: PixelPos) -> Option<GeoPos> {
        self.forward.pixel_to_geo(&self.grid, pixel)
    }

    pub fn geo_to_pixel(&self, geo: GeoPos) -> Option<PixelPos> {
        self.inverse
            .geo_to_pixel(&self.grid, self.forward.as_ref(), geo)
    }

    pub fn raster(&self) -> &GeoRaster {
        self.grid.raster()
    }

    pub fn check_result(&self) -> &CheckResult {
        self.grid.checks()
    }

    pub fn checks(&self) -> GeoChecks {
        self.checks
    }

    pub fn forward_key(&self) -> &'static str {
        self.forward.key()
    }

    pub fn inverse_key(&self) -> &'static str {
        self.inverse.key()
    }

    pub fn scene_width(&self) -> usize {
        self.grid.raster().scene_width
    }

    pub fn scene_height(&self) -> usize {
        self.grid.raster().scene_height
    }

    /// Whether this coding was built on full-resolution geolocation.
    pub fn is_pixel_based(&self) -> bool {
        self.grid.raster().is_pixel_based()
    }
}

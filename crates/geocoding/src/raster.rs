//! Longitude/latitude sources for geocodings.

use crate::error::{GeoCodingError, GeoCodingResult};

/// Resolved longitude and latitude samples plus the geometry relating their
/// grid to the scene raster.
///
/// Grid node `(i, j)` sits at scene position
/// `(offset_x + i * subsampling_x, offset_y + j * subsampling_y)`. Pixel
/// geolocation uses offsets of 0.5 and subsampling 1, so nodes are pixel
/// centres.
#[derive(Debug, Clone)]
pub struct GeoRaster {
    pub longitudes: Vec<f64>,
    pub latitudes: Vec<f64>,
    pub lon_variable_name: String,
    pub lat_variable_name: String,
    pub raster_width: usize,
    pub raster_height: usize,
    pub scene_width: usize,
    pub scene_height: usize,
    /// Nominal ground resolution of a scene pixel.
    pub resolution_km: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub subsampling_x: f64,
    pub subsampling_y: f64,
}

impl GeoRaster {
    /// Geolocation given for every scene pixel.
    pub fn pixel(
        longitudes: Vec<f64>,
        latitudes: Vec<f64>,
        lon_variable_name: impl Into<String>,
        lat_variable_name: impl Into<String>,
        width: usize,
        height: usize,
        resolution_km: f64,
    ) -> GeoCodingResult<Self> {
        Self {
            longitudes,
            latitudes,
            lon_variable_name: lon_variable_name.into(),
            lat_variable_name: lat_variable_name.into(),
            raster_width: width,
            raster_height: height,
            scene_width: width,
            scene_height: height,
            resolution_km,
            offset_x: 0.5,
            offset_y: 0.5,
            subsampling_x: 1.0,
            subsampling_y: 1.0,
        }
        .validated()
    }

    /// Geolocation given on a subsampled tie-point grid.
    #[allow(clippy::too_many_arguments)]
    pub fn tie_point(
        longitudes: Vec<f64>,
        latitudes: Vec<f64>,
        lon_variable_name: impl Into<String>,
        lat_variable_name: impl Into<String>,
        grid_width: usize,
        grid_height: usize,
        scene_width: usize,
        scene_height: usize,
        resolution_km: f64,
        offset_x: f64,
        offset_y: f64,
        subsampling_x: f64,
        subsampling_y: f64,
    ) -> GeoCodingResult<Self> {
        Self {
            longitudes,
            latitudes,
            lon_variable_name: lon_variable_name.into(),
            lat_variable_name: lat_variable_name.into(),
            raster_width: grid_width,
            raster_height: grid_height,
            scene_width,
            scene_height,
            resolution_km,
            offset_x,
            offset_y,
            subsampling_x,
            subsampling_y,
        }
        .validated()
    }

    fn validated(self) -> GeoCodingResult<Self> {
        let expected = self.raster_width * self.raster_height;
        if expected == 0 {
            return Err(GeoCodingError::InvalidRaster(format!(
                "empty grid {}x{}",
                self.raster_width, self.raster_height
            )));
        }
        if self.longitudes.len() != expected || self.latitudes.len() != expected {
            return Err(GeoCodingError::InvalidRaster(format!(
                "expected {} samples for {}x{}, got {} longitudes and {} latitudes",
                expected,
                self.raster_width,
                self.raster_height,
                self.longitudes.len(),
                self.latitudes.len()
            )));
        }
        if !(self.subsampling_x > 0.0 && self.subsampling_y > 0.0) {
            return Err(GeoCodingError::InvalidRaster(format!(
                "subsampling must be positive, got ({}, {})",
                self.subsampling_x, self.subsampling_y
            )));
        }
        if self.scene_width == 0 || self.scene_height == 0 {
            return Err(GeoCodingError::InvalidRaster("empty scene".to_string()));
        }
        Ok(self)
    }

    /// Whether every scene pixel has its own grid node.
    pub fn is_pixel_based(&self) -> bool {
        self.subsampling_x == 1.0
            && self.subsampling_y == 1.0
            && self.raster_width == self.scene_width
            && self.raster_height == self.scene_height
    }

    /// Continuous grid coordinates of a scene position.
    pub fn grid_coordinates(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.offset_x) / self.subsampling_x,
            (y - self.offset_y) / self.subsampling_y,
        )
    }

    /// Scene position of grid node `(i, j)`.
    pub fn scene_position(&self, i: usize, j: usize) -> (f64, f64) {
        (
            self.offset_x + i as f64 * self.subsampling_x,
            self.offset_y + j as f64 * self.subsampling_y,
        )
    }

    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.raster_width + i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_raster_geometry() {
        let raster =
            GeoRaster::pixel(vec![0.0; 6], vec![0.0; 6], "longitude", "latitude", 3, 2, 0.3).unwrap();
        assert!(raster.is_pixel_based());
        assert_eq!(raster.grid_coordinates(0.5, 1.5), (0.0, 1.0));
        assert_eq!(raster.scene_position(2, 1), (2.5, 1.5));
    }

    #[test]
    fn test_tie_point_raster_geometry() {
        let raster = GeoRaster::tie_point(
            vec![0.0; 6],
            vec![0.0; 6],
            "TP_longitude",
            "TP_latitude",
            3,
            2,
            129,
            2,
            0.3,
            0.0,
            0.0,
            64.0,
            1.0,
        )
        .unwrap();
        assert!(!raster.is_pixel_based());
        assert_eq!(raster.grid_coordinates(96.0, 1.0), (1.5, 1.0));
        assert_eq!(raster.scene_position(2, 0), (128.0, 0.0));
    }

    #[test]
    fn test_sample_count_mismatch() {
        let err = GeoRaster::pixel(vec![0.0; 5], vec![0.0; 6], "lon", "lat", 3, 2, 0.3).unwrap_err();
        assert!(matches!(err, GeoCodingError::InvalidRaster(_)));
    }
}

//! Forward codings: scene pixel to geographic position.

use std::fmt::Debug;

use crate::grid::GeoGrid;
use crate::types::{GeoPos, PixelPos};

pub const FWD_PIXEL: &str = "FWD_PIXEL";
pub const FWD_PIXEL_INTERPOLATING: &str = "FWD_PIXEL_INTERPOLATING";
pub const FWD_TIE_POINT_BILINEAR: &str = "FWD_TIE_POINT_BILINEAR";

/// Maps scene pixel positions to geographic positions.
pub trait ForwardCoding: Send + Sync + Debug {
    fn key(&self) -> &'static str;

    /// Whether the mapping is continuous across pixel boundaries.
    fn is_interpolating(&self) -> bool;

    /// Geographic position of a scene position, `None` outside the scene or
    /// where geolocation is missing.
    fn pixel_to_geo(&self, grid: &GeoGrid, pixel: PixelPos) -> Option<GeoPos>;
}

/// Position of the nearest geolocation node.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelForward;

impl ForwardCoding for PixelForward {
    fn key(&self) -> &'static str {
        FWD_PIXEL
    }

    fn is_interpolating(&self) -> bool {
        false
    }

    fn pixel_to_geo(&self, grid: &GeoGrid, pixel: PixelPos) -> Option<GeoPos> {
        if !grid.contains(pixel) {
            return None;
        }
        let (i, j) = grid.nearest_node(pixel);
        let pos = grid.node(i, j);
        pos.is_valid().then_some(pos)
    }
}

/// Bilinear interpolation between geolocation nodes.
///
/// Serves both full-resolution pixel grids and tie-point grids; only the key
/// differs.
#[derive(Debug, Clone, Copy)]
pub struct BilinearForward {
    key: &'static str,
}

impl BilinearForward {
    pub fn pixel_interpolating() -> Self {
        Self {
            key: FWD_PIXEL_INTERPOLATING,
        }
    }

    pub fn tie_point() -> Self {
        Self {
            key: FWD_TIE_POINT_BILINEAR,
        }
    }
}

impl ForwardCoding for BilinearForward {
    fn key(&self) -> &'static str {
        self.key
    }

    fn is_interpolating(&self) -> bool {
        true
    }

    fn pixel_to_geo(&self, grid: &GeoGrid, pixel: PixelPos) -> Option<GeoPos> {
        if !grid.contains(pixel) {
            return None;
        }
        grid.interpolate(pixel)
    }
}

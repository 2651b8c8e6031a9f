//! Geocodings for swath satellite rasters.
//!
//! A [`ComponentGeoCoding`] maps scene pixels to geographic positions and
//! back. It is assembled from a [`GeoRaster`] holding longitude/latitude
//! samples, either one per pixel or on a subsampled tie-point grid, and a
//! forward and an inverse coding component selected by key through the
//! [`ComponentFactory`].

pub mod checks;
pub mod coding;
pub mod error;
pub mod factory;
pub mod forward;
pub mod grid;
pub mod inverse;
pub mod raster;
pub mod types;

pub use checks::{CheckResult, GeoChecks, Pole};
pub use coding::ComponentGeoCoding;
pub use error::{GeoCodingError, GeoCodingResult};
pub use factory::{ComponentFactory, FORWARD_KEYS, INVERSE_KEYS};
pub use forward::{ForwardCoding, FWD_PIXEL, FWD_PIXEL_INTERPOLATING, FWD_TIE_POINT_BILINEAR};
pub use grid::GeoGrid;
pub use inverse::{InverseCoding, INV_PIXEL_QUAD_TREE, INV_TIE_POINT};
pub use raster::GeoRaster;
pub use types::{wrap_lon_delta, GeoPos, PixelPos};

//! Inspection of level-1 products.
//!
//! The binary opens a product, then prints:
//! - its structure: bands, tie-point grids and masks;
//! - optionally the statistics of one band over a window;
//! - optionally the geolocation of a pixel and its inverse round trip.

pub mod args;
pub mod report;

pub use args::{Args, PixelArg, WindowArg};
pub use report::{PixelLocation, ProductSummary, Report, WindowStats};

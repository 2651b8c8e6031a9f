//! Descriptor-driven reader for OLCI and MERIS level-1 products.
//!
//! A product is a set of self-describing array files plus an XFDU manifest.
//! This crate turns one into a uniform raster model:
//!
//! - **Classification**: catalog descriptors of every declared file are
//!   sorted into variables, tie-point grids, metadata and special variables
//! - **Layer naming**: multi-layer variables are exposed as synthetic bands
//!   or grids named `<variable><token><index>`
//! - **Caching**: file handles and decoded arrays are loaded once per product
//!   and shared between reader threads
//! - **Extraction**: strided windows, layer slices and line broadcasts, raw or
//!   scaled to geophysical values
//! - **Geocoding**: pixel or tie-point geolocation, chosen per sensor and
//!   configuration
//!
//! # Architecture
//!
//! ```text
//! Level1Reader::open(store, config)
//!      │
//!      ├─► XfduManifest ──► Sensor / SensorContext
//!      │
//!      ├─► Catalog ──► ClassifiedDescriptors
//!      │
//!      └─► Product { bands, tie-point grids, masks, metadata }
//!
//! read_band_raster_data(name, window)
//!      │
//!      ├─► LayerName::parse ──► special line broadcast
//!      │
//!      └─► ExtractionEngine ──► KeyedCache<file> ──► KeyedCache<array> ──► section
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use raster_reader::{Level1Reader, ReaderConfig};
//! use product_common::RasterWindow;
//!
//! let reader = Level1Reader::open(store, ReaderConfig::from_env())?;
//! let window = RasterWindow::new(0, 0, 256, 256)?;
//! let counts = reader.read_band_raster_data("Oa08_radiance", &window)?;
//! let geocoding = reader.read_geocoding()?;
//! reader.close()?;
//! ```

pub mod attributes;
pub mod cache;
pub mod classify;
pub mod config;
pub mod extract;
pub mod layers;
pub mod masks;
pub mod product;
pub mod reader;
pub mod sensor;

// Re-export commonly used types at crate root
pub use cache::{CacheStats, KeyedCache};
pub use classify::ClassifiedDescriptors;
pub use config::{GeoCodingKeys, ReaderConfig};
pub use extract::{EngineStats, ExtractionEngine, SampleMode};
pub use layers::LayerName;
pub use masks::ColorProvider;
pub use product::{Band, Mask, Product, Rgb, Sample, SampleCoding, TiePointGrid};
pub use reader::{Level1Reader, ReaderStats};
pub use sensor::{BandDescription, Sensor, SensorContext};

pub use product_common::{ProductError, ProductResult, RasterWindow};

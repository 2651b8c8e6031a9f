//! Descriptor catalog for Level-1 satellite products.
//!
//! Maps a product type and baseline collection to the ordered list of files
//! making up the product and to the variable descriptors of each file, and
//! resolves descriptor geometry that has to be read from the manifest.

pub mod catalog;
pub mod error;
pub mod geometry;

pub use catalog::{Catalog, CatalogEntry, FileEntry};
pub use error::{CatalogError, CatalogResult};
pub use geometry::{ensure_product_size, ensure_width_and_height, tie_point_grid_size};

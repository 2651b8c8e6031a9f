//! Common types shared by the product reader crates.
//!
//! Everything that more than one crate needs to agree on lives here: the
//! variable and product descriptors, the raster window, the in-memory
//! n-dimensional array with its sectioning and scaling, the metadata tree,
//! the manifest interface and the error taxonomy.

pub mod array;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod window;

pub use array::{Array, ArrayData, Scaling};
pub use descriptor::{
    DataType, ProductDescriptor, ResolvedGeometry, VariableDescriptor, VariableRole, UNRESOLVED,
};
pub use error::{ProductError, ProductResult};
pub use manifest::Manifest;
pub use metadata::{AttributeValue, MetadataAttribute, MetadataElement};
pub use window::RasterWindow;

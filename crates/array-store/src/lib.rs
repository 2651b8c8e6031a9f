//! Storage access for multi-file satellite products.
//!
//! A product is a directory, a zip archive of one, or an in-memory equivalent
//! holding one XFDU manifest and a set of self-describing array files. This crate provides:
//!
//! - [`BackingStore`] implementations that locate files by name
//! - [`ZipStore`], which extracts members of zipped products on demand
//! - the [`ArrayFile`] interface with an in-memory implementation and, behind
//!   the `netcdf` feature, a NetCDF one
//! - [`XfduManifest`], the manifest reader

pub mod archive;
pub mod directory;
pub mod error;
pub mod file;
pub mod manifest;
pub mod memory;
#[cfg(feature = "netcdf")]
pub mod native;
pub mod store;

pub use archive::{is_zip, ZipStore};
pub use directory::DirectoryStore;
pub use error::{StoreError, StoreResult};
pub use file::{ArrayFile, ArrayFileOpener, Dimension, VariableInfo};
pub use manifest::XfduManifest;
pub use memory::{MemoryArrayFile, MemoryFileHandle, MemoryStore};
#[cfg(feature = "netcdf")]
pub use native::{silence_hdf5_errors, NetcdfArrayFile, NetcdfOpener};
pub use store::{find_entry, last_path_component, BackingStore, MANIFEST_FILE_NAME};

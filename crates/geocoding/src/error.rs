//! Error types for geocoding construction.

use product_common::ProductError;
use thiserror::Error;

/// Result type for geocoding operations.
pub type GeoCodingResult<T> = Result<T, GeoCodingError>;

#[derive(Debug, Error)]
pub enum GeoCodingError {
    /// Longitude/latitude arrays inconsistent with the declared geometry
    #[error("invalid geo raster: {0}")]
    InvalidRaster(String),

    /// Forward or inverse component key not known to the factory
    #[error("unknown geocoding component: {0}")]
    UnknownComponent(String),
}

impl From<GeoCodingError> for ProductError {
    fn from(err: GeoCodingError) -> Self {
        match err {
            GeoCodingError::InvalidRaster(message) => ProductError::Format(message),
            GeoCodingError::UnknownComponent(key) => {
                ProductError::Config(format!("unknown geocoding component: {}", key))
            }
        }
    }
}

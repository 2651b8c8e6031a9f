//! Error types for backing stores and array files.

use product_common::ProductError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error types for backing stores, array files and manifests.
#[derive(Error, Debug)]
pub enum StoreError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Product location does not exist or cannot be listed
    #[error("invalid product location: {0}")]
    InvalidLocation(String),

    /// Variable missing from an array file
    #[error("requested variable not found: {name} in {location}")]
    VariableNotFound { name: String, location: String },

    /// Invalid or unsupported data in an array file
    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    /// Malformed manifest document or failed manifest lookup
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Read from a file handle after it was closed
    #[error("file closed: {0}")]
    Closed(String),
}

impl StoreError {
    pub fn variable_not_found(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::VariableNotFound {
            name: name.into(),
            location: location.into(),
        }
    }
}

impl From<quick_xml::Error> for StoreError {
    fn from(err: quick_xml::Error) -> Self {
        StoreError::Manifest(format!("XML error: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for StoreError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        StoreError::Manifest(format!("XML attribute error: {}", err))
    }
}

impl From<zip::result::ZipError> for StoreError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => StoreError::Io(e),
            other => StoreError::InvalidFormat(format!("zip archive: {}", other)),
        }
    }
}

impl From<StoreError> for ProductError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => ProductError::Io(e),
            StoreError::VariableNotFound { name, location } => {
                ProductError::VariableNotFound { name, location }
            }
            StoreError::Manifest(message) => ProductError::Manifest(message),
            StoreError::Closed(_) => ProductError::Closed,
            other => ProductError::Format(other.to_string()),
        }
    }
}

//! Error types for product reading.

use thiserror::Error;

/// Result type alias using ProductError.
pub type ProductResult<T> = Result<T, ProductError>;

/// Primary error type for product open and raster reads.
#[derive(Debug, Error)]
pub enum ProductError {
    // === Configuration Errors ===
    #[error("descriptor not found for product type '{product_type}', baseline '{baseline}'")]
    DescriptorNotFound {
        product_type: String,
        baseline: String,
    },

    #[error("unknown product type: {0}")]
    UnknownProductType(String),

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("configuration error: {0}")]
    Config(String),

    // === Resource Errors ===
    #[error("file not found: {name}")]
    FileNotFound { name: String },

    #[error("requested variable not found: {name} in {location}")]
    VariableNotFound { name: String, location: String },

    // === Range Errors ===
    #[error("invalid range: requested {requested} from array of shape {shape:?}")]
    Range { requested: String, shape: Vec<usize> },

    #[error("invalid raster window: {0}")]
    InvalidWindow(String),

    // === Lifecycle ===
    #[error("product closed")]
    Closed,

    // === Plumbing ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("invalid data format: {0}")]
    Format(String),
}

impl ProductError {
    /// Create a VariableNotFound error.
    pub fn variable_not_found(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::VariableNotFound {
            name: name.into(),
            location: location.into(),
        }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(name: impl Into<String>) -> Self {
        Self::FileNotFound { name: name.into() }
    }

    /// Create a Range error.
    pub fn range(requested: impl Into<String>, shape: &[usize]) -> Self {
        Self::Range {
            requested: requested.into(),
            shape: shape.to_vec(),
        }
    }

    /// Create a DescriptorNotFound error.
    pub fn descriptor_not_found(product_type: impl Into<String>, baseline: impl Into<String>) -> Self {
        Self::DescriptorNotFound {
            product_type: product_type.into(),
            baseline: baseline.into(),
        }
    }

    /// Whether this failure is an I/O failure for the caller.
    ///
    /// Configuration errors abort product opening; everything else is
    /// reported as a failed read of one variable.
    pub fn is_io_failure(&self) -> bool {
        !self.is_configuration()
    }

    /// Whether this is a configuration error (unknown product type, missing descriptor).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProductError::DescriptorNotFound { .. }
                | ProductError::UnknownProductType(_)
                | ProductError::InvalidDescriptor(_)
                | ProductError::Config(_)
        )
    }

    /// Whether this is a range error from windowed extraction.
    pub fn is_range(&self) -> bool {
        matches!(self, ProductError::Range { .. } | ProductError::InvalidWindow(_))
    }
}

impl From<serde_json::Error> for ProductError {
    fn from(err: serde_json::Error) -> Self {
        ProductError::Format(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let config = ProductError::descriptor_not_found("OL_1_EFR", "999");
        assert!(config.is_configuration());
        assert!(!config.is_io_failure());

        let missing = ProductError::file_not_found("Oa01_radiance.nc");
        assert!(missing.is_io_failure());
        assert!(!missing.is_range());

        let range = ProductError::range("y 0..51", &[50, 100]);
        assert!(range.is_io_failure());
        assert!(range.is_range());

        assert!(ProductError::Closed.is_io_failure());
    }

    #[test]
    fn test_error_messages() {
        let err = ProductError::variable_not_found("Oa01_radiance", "/data/Oa01_radiance.nc");
        assert_eq!(
            err.to_string(),
            "requested variable not found: Oa01_radiance in /data/Oa01_radiance.nc"
        );
        assert_eq!(ProductError::Closed.to_string(), "product closed");
    }
}

//! Error types for catalog loading.

use std::path::PathBuf;

use product_common::ProductError;
use thiserror::Error;

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while loading or validating catalog files.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog '{origin}': {message}")]
    Parse { origin: String, message: String },

    #[error("duplicate catalog entry for product type '{product_type}', baseline '{baseline}'")]
    Duplicate {
        product_type: String,
        baseline: String,
    },

    #[error("invalid catalog entry {product_type}/{baseline}: {message}")]
    Invalid {
        product_type: String,
        baseline: String,
        message: String,
    },
}

impl CatalogError {
    pub fn invalid(
        product_type: impl Into<String>,
        baseline: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            product_type: product_type.into(),
            baseline: baseline.into(),
            message: message.into(),
        }
    }
}

impl From<CatalogError> for ProductError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Read { .. } => ProductError::Config(err.to_string()),
            other => ProductError::InvalidDescriptor(other.to_string()),
        }
    }
}

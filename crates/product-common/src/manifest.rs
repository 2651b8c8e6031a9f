//! Interface to a product manifest.

use chrono::{DateTime, Utc};

use crate::error::ProductResult;
use crate::metadata::MetadataElement;

/// Read access to the product manifest.
///
/// Paths passed to [`xpath_int`](Manifest::xpath_int) are the lookup keys
/// stored in descriptors; their syntax is defined by the implementation.
pub trait Manifest: Send + Sync {
    /// Integer value at a manifest path.
    fn xpath_int(&self, path: &str) -> ProductResult<i64>;

    fn product_type(&self) -> &str;

    fn product_name(&self) -> &str;

    fn baseline_collection(&self) -> &str;

    fn description(&self) -> &str;

    fn start_time(&self) -> Option<DateTime<Utc>>;

    fn stop_time(&self) -> Option<DateTime<Utc>>;

    /// Names of the backing files, skipping data objects with excluded ids.
    fn file_names(&self, excluded_ids: &[String]) -> Vec<String>;

    /// The manifest's own metadata tree.
    fn metadata(&self) -> MetadataElement;
}

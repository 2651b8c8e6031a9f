//! Backing stores: where the files of a product live.

use std::sync::Arc;

use crate::error::StoreResult;
use crate::file::ArrayFile;

/// Name of the manifest document at the root of a product.
pub const MANIFEST_FILE_NAME: &str = "xfdumanifest.xml";

/// Read access to the files of one product.
pub trait BackingStore: Send + Sync {
    /// Location of the product, used in logs and error messages.
    fn location(&self) -> &str;

    /// Relative paths of every file in the product, `/`-separated.
    fn list_files(&self) -> Vec<String>;

    /// Open the file stored under `name`.
    ///
    /// Returns `Ok(None)` when no such file exists. Every call opens a new
    /// handle; callers cache handles themselves.
    fn get_file(&self, name: &str) -> StoreResult<Option<Arc<dyn ArrayFile>>>;

    /// Text of the product manifest.
    fn read_manifest(&self) -> StoreResult<String>;
}

/// Last `/`-separated component of a path.
pub fn last_path_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Find the entry stored under `name`.
///
/// An exact match wins; otherwise the entry whose last path component equals
/// the last component of `name` is used, which covers products packed below
/// an extra directory level. Names are never matched partially.
pub fn find_entry<'a>(entries: &'a [String], name: &str) -> Option<&'a str> {
    if let Some(exact) = entries.iter().find(|e| e.as_str() == name) {
        return Some(exact);
    }
    let wanted = last_path_component(name);
    entries
        .iter()
        .find(|e| last_path_component(e) == wanted)
        .map(|e| e.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<String> {
        vec![
            "S3A_OL_1_EFR.SEN3/be_two".to_string(),
            "S3A_OL_1_EFR.SEN3/Oa01_radiance.nc".to_string(),
            "geo_coordinates.nc".to_string(),
        ]
    }

    #[test]
    fn test_exact_match() {
        let entries = entries();
        assert_eq!(find_entry(&entries, "geo_coordinates.nc"), Some("geo_coordinates.nc"));
    }

    #[test]
    fn test_match_below_prefix_directory() {
        let entries = entries();
        assert_eq!(
            find_entry(&entries, "Oa01_radiance.nc"),
            Some("S3A_OL_1_EFR.SEN3/Oa01_radiance.nc")
        );
    }

    #[test]
    fn test_no_partial_match() {
        let entries = entries();
        assert_eq!(find_entry(&entries, "e_two"), None);
        assert_eq!(find_entry(&entries, "be_two"), Some("S3A_OL_1_EFR.SEN3/be_two"));
        assert_eq!(find_entry(&entries, "radiance.nc"), None);
    }

    #[test]
    fn test_last_path_component() {
        assert_eq!(last_path_component("a/b/c.nc"), "c.nc");
        assert_eq!(last_path_component("c.nc"), "c.nc");
    }
}

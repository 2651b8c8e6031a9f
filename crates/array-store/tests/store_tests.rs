//! Tests for the directory backing store.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use array_store::{
    ArrayFile, ArrayFileOpener, BackingStore, DirectoryStore, MemoryArrayFile, MemoryStore,
    StoreError, StoreResult,
};
use product_common::Array;

/// Opens every file as an in-memory file with one variable named after it.
struct StubOpener;

impl ArrayFileOpener for StubOpener {
    fn open(&self, path: &Path) -> StoreResult<Arc<dyn ArrayFile>> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| StoreError::InvalidLocation(path.display().to_string()))?;
        let mut file = MemoryArrayFile::new();
        let array = Array::new(vec![2], vec![1u8, 2])
            .map_err(|e| StoreError::InvalidFormat(e.to_string()))?;
        file.add_variable(&name, &["x"], array)?;
        let store = MemoryStore::new(path.display().to_string(), "");
        store.insert("file", file);
        Ok(store.get_file("file")?.expect("file just inserted"))
    }
}

fn product_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("S3A_TEST.SEN3");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("xfdumanifest.xml"), "<XFDU/>").unwrap();
    fs::write(nested.join("Oa01_radiance.nc"), b"").unwrap();
    fs::write(nested.join("be_two"), b"").unwrap();
    dir
}

#[test]
fn test_lists_files_relative_to_root() {
    let dir = product_dir();
    let store = DirectoryStore::open(dir.path(), Arc::new(StubOpener)).unwrap();
    assert_eq!(
        store.list_files(),
        vec![
            "S3A_TEST.SEN3/Oa01_radiance.nc".to_string(),
            "S3A_TEST.SEN3/be_two".to_string(),
            "S3A_TEST.SEN3/xfdumanifest.xml".to_string(),
        ]
    );
}

#[test]
fn test_get_file_by_last_component_only() {
    let dir = product_dir();
    let store = DirectoryStore::open(dir.path(), Arc::new(StubOpener)).unwrap();

    let file = store.get_file("Oa01_radiance.nc").unwrap().unwrap();
    assert!(file.variable("Oa01_radiance").is_some());

    assert!(store.get_file("e_two").unwrap().is_none());
    assert!(store.get_file("Oa02_radiance.nc").unwrap().is_none());
}

#[test]
fn test_manifest_path_opens_parent_directory() {
    let dir = product_dir();
    let manifest = dir.path().join("S3A_TEST.SEN3").join("xfdumanifest.xml");
    let store = DirectoryStore::open(&manifest, Arc::new(StubOpener)).unwrap();
    assert_eq!(store.root(), manifest.parent().unwrap());
    assert_eq!(store.read_manifest().unwrap(), "<XFDU/>");
}

#[test]
fn test_missing_directory_fails() {
    let result = DirectoryStore::open("/nonexistent/product.SEN3", Arc::new(StubOpener));
    assert!(matches!(result, Err(StoreError::InvalidLocation(_))));
}

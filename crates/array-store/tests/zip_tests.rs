//! Tests for zipped products.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use array_store::{
    is_zip, ArrayFile, ArrayFileOpener, BackingStore, MemoryArrayFile, MemoryStore, StoreError,
    StoreResult, ZipStore,
};
use parking_lot::Mutex;
use product_common::Array;

/// Opens every file as an in-memory file with one variable named after it,
/// remembering the bytes found on disk at open time.
#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<(PathBuf, Vec<u8>)>>,
}

impl ArrayFileOpener for RecordingOpener {
    fn open(&self, path: &Path) -> StoreResult<Arc<dyn ArrayFile>> {
        self.opened.lock().push((path.to_path_buf(), fs::read(path)?));
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

fn zipped_product(dir: &Path) -> PathBuf {
    let path = dir.join("S3A_TEST.zip");
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = zip::write::FileOptions::default();
    writer.add_directory("S3A_TEST.SEN3/", options).unwrap();
    for (name, content) in [
        ("S3A_TEST.SEN3/xfdumanifest.xml", "<XFDU/>"),
        ("S3A_TEST.SEN3/Oa01_radiance.nc", "radiance bytes"),
        ("S3A_TEST.SEN3/be_two", "two"),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

fn open(dir: &Path) -> (ZipStore, Arc<RecordingOpener>) {
    let opener = Arc::new(RecordingOpener::default());
    let store = ZipStore::open(zipped_product(dir), opener.clone()).unwrap();
    (store, opener)
}

// ============================================================================
// Listing and lookup
// ============================================================================

#[test]
fn test_lists_members_without_directories() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = open(dir.path());

    assert_eq!(
        store.list_files(),
        vec![
            "S3A_TEST.SEN3/Oa01_radiance.nc".to_string(),
            "S3A_TEST.SEN3/be_two".to_string(),
            "S3A_TEST.SEN3/xfdumanifest.xml".to_string(),
        ]
    );
    assert!(store.location().ends_with("S3A_TEST.zip"));
}

#[test]
fn test_get_file_extracts_member() {
    let dir = tempfile::tempdir().unwrap();
    let (store, opener) = open(dir.path());

    let file = store.get_file("Oa01_radiance.nc").unwrap().unwrap();
    assert_eq!(file.variable_names(), vec!["Oa01_radiance".to_string()]);

    let opened = opener.opened.lock();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].0.starts_with(store.scratch_dir()));
    assert_eq!(opened[0].1, b"radiance bytes");
}

#[test]
fn test_member_is_extracted_once() {
    let dir = tempfile::tempdir().unwrap();
    let (store, opener) = open(dir.path());

    store.get_file("Oa01_radiance.nc").unwrap().unwrap();
    store.get_file("Oa01_radiance.nc").unwrap().unwrap();

    let opened = opener.opened.lock();
    assert_eq!(opened.len(), 2);
    assert_eq!(opened[0].0, opened[1].0);
}

#[test]
fn test_no_partial_match() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = open(dir.path());

    assert!(store.get_file("e_two").unwrap().is_none());
    assert!(store.get_file("be_two").unwrap().is_some());
    assert!(store.get_file("missing.nc").unwrap().is_none());
}

#[test]
fn test_read_manifest_from_archive() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = open(dir.path());

    assert_eq!(store.read_manifest().unwrap(), "<XFDU/>");
}

#[test]
fn test_scratch_dir_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = open(dir.path());
    store.get_file("be_two").unwrap().unwrap();
    let scratch = store.scratch_dir().to_path_buf();
    assert!(scratch.exists());

    drop(store);
    assert!(!scratch.exists());
}

// ============================================================================
// Detection
// ============================================================================

#[test]
fn test_is_zip() {
    let dir = tempfile::tempdir().unwrap();
    let zipped = zipped_product(dir.path());
    let plain = dir.path().join("plain.txt");
    fs::write(&plain, "not an archive").unwrap();

    assert!(is_zip(&zipped));
    assert!(!is_zip(&plain));
    assert!(!is_zip(dir.path()));
    assert!(!is_zip(dir.path().join("missing.zip")));
}

#[test]
fn test_open_rejects_non_archive() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain.zip");
    fs::write(&plain, "not an archive").unwrap();

    let result = ZipStore::open(&plain, Arc::new(RecordingOpener::default()));
    assert!(matches!(result, Err(StoreError::InvalidFormat(_))));
}

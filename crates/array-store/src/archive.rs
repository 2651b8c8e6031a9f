//! Products packed into a zip archive, such as a zipped `.SEN3` directory.
//!
//! Array libraries open files by path, so members are extracted into a
//! temporary directory owned by the store the first time they are requested.
//! The directory is removed when the store is dropped.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{StoreError, StoreResult};
use crate::file::{ArrayFile, ArrayFileOpener};
use crate::store::{find_entry, BackingStore, MANIFEST_FILE_NAME};

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Whether `path` is a file starting with the zip local-header signature.
pub fn is_zip<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if !path.is_file() {
        return false;
    }
    let mut magic = [0u8; 4];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .map(|_| magic == ZIP_MAGIC)
        .unwrap_or(false)
}

struct Extraction {
    archive: ZipArchive<File>,
    extracted: HashMap<String, PathBuf>,
}

/// A zipped product.
pub struct ZipStore {
    location: String,
    entries: Vec<String>,
    extraction: Mutex<Extraction>,
    scratch: TempDir,
    opener: Arc<dyn ArrayFileOpener>,
}

impl ZipStore {
    pub fn open<P: AsRef<Path>>(path: P, opener: Arc<dyn ArrayFileOpener>) -> StoreResult<Self> {
        let path = path.as_ref();
        let location = path.display().to_string();
        let file = File::open(path).map_err(|_| StoreError::InvalidLocation(location.clone()))?;
        let archive = ZipArchive::new(file)?;

        let mut entries: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect();
        entries.sort();

        let scratch = tempfile::Builder::new().prefix("product-").tempdir()?;
        debug!(
            location = %location,
            files = entries.len(),
            scratch = %scratch.path().display(),
            "Listed zipped product"
        );

        Ok(Self {
            location,
            entries,
            extraction: Mutex::new(Extraction {
                archive,
                extracted: HashMap::new(),
            }),
            scratch,
            opener,
        })
    }

    /// Open a zipped product whose array files are NetCDF.
    #[cfg(feature = "netcdf")]
    pub fn open_netcdf<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open(path, Arc::new(crate::native::NetcdfOpener))
    }

    /// Directory that extracted members are written to.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Path of the extracted member, extracting it on first use.
    fn extract(&self, entry: &str) -> StoreResult<PathBuf> {
        let mut extraction = self.extraction.lock();
        if let Some(path) = extraction.extracted.get(entry) {
            return Ok(path.clone());
        }

        let target = entry
            .split('/')
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .fold(self.scratch.path().to_path_buf(), |path, part| path.join(part));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut member = extraction.archive.by_name(entry)?;
        let mut out = File::create(&target)?;
        let bytes = std::io::copy(&mut member, &mut out)?;
        drop(member);
        debug!(entry, bytes, path = %target.display(), "Extracted archive member");

        extraction.extracted.insert(entry.to_string(), target.clone());
        Ok(target)
    }
}

fn read_member<R: Read + Seek>(archive: &mut ZipArchive<R>, entry: &str) -> StoreResult<String> {
    let mut text = String::new();
    archive.by_name(entry)?.read_to_string(&mut text)?;
    Ok(text)
}

impl BackingStore for ZipStore {
    fn location(&self) -> &str {
        &self.location
    }

    fn list_files(&self) -> Vec<String> {
        self.entries.clone()
    }

    fn get_file(&self, name: &str) -> StoreResult<Option<Arc<dyn ArrayFile>>> {
        let Some(entry) = find_entry(&self.entries, name) else {
            return Ok(None);
        };
        let path = self.extract(entry)?;
        self.opener.open(&path).map(Some)
    }

    fn read_manifest(&self) -> StoreResult<String> {
        let entry = find_entry(&self.entries, MANIFEST_FILE_NAME).ok_or_else(|| {
            StoreError::Manifest(format!("no {} in {}", MANIFEST_FILE_NAME, self.location))
        })?;
        read_member(&mut self.extraction.lock().archive, entry)
    }
}

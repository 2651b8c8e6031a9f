//! Products unpacked into a directory on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::file::{ArrayFile, ArrayFileOpener};
use crate::store::{find_entry, BackingStore, MANIFEST_FILE_NAME};

/// A product directory such as `S3A_OL_1_EFR____...SEN3/`.
pub struct DirectoryStore {
    root: PathBuf,
    location: String,
    entries: Vec<String>,
    opener: Arc<dyn ArrayFileOpener>,
}

impl DirectoryStore {
    /// Open the product at `path`.
    ///
    /// `path` may name the product directory or any file directly inside it,
    /// typically the manifest; the parent directory is used in that case.
    pub fn open<P: AsRef<Path>>(path: P, opener: Arc<dyn ArrayFileOpener>) -> StoreResult<Self> {
        let path = path.as_ref();
        let root = if path.is_file() {
            path.parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StoreError::InvalidLocation(path.display().to_string()))?
        } else if path.is_dir() {
            path.to_path_buf()
        } else {
            return Err(StoreError::InvalidLocation(path.display().to_string()));
        };

        let mut entries = Vec::new();
        for entry in walkdir::WalkDir::new(&root) {
            let entry = entry.map_err(|e| StoreError::InvalidLocation(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&root)
                .map_err(|e| StoreError::InvalidLocation(e.to_string()))?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            entries.push(name);
        }
        entries.sort();

        let location = root.display().to_string();
        debug!(location = %location, files = entries.len(), "Listed product directory");

        Ok(Self {
            root,
            location,
            entries,
            opener,
        })
    }

    /// Open a product directory whose array files are NetCDF.
    #[cfg(feature = "netcdf")]
    pub fn open_netcdf<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open(path, Arc::new(crate::native::NetcdfOpener))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        find_entry(&self.entries, name).map(|entry| {
            entry
                .split('/')
                .fold(self.root.clone(), |path, part| path.join(part))
        })
    }
}

impl BackingStore for DirectoryStore {
    fn location(&self) -> &str {
        &self.location
    }

    fn list_files(&self) -> Vec<String> {
        self.entries.clone()
    }

    fn get_file(&self, name: &str) -> StoreResult<Option<Arc<dyn ArrayFile>>> {
        match self.resolve(name) {
            Some(path) => {
                debug!(path = %path.display(), "Opening array file");
                self.opener.open(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    fn read_manifest(&self) -> StoreResult<String> {
        let path = self.resolve(MANIFEST_FILE_NAME).ok_or_else(|| {
            StoreError::Manifest(format!("no {} in {}", MANIFEST_FILE_NAME, self.location))
        })?;
        Ok(fs::read_to_string(path)?)
    }
}

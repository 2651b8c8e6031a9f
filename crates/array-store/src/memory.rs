//! In-memory array files and backing store.
//!
//! Used to assemble synthetic products for tests and fixtures. The store
//! counts opens and closes so callers can check that file handles are opened
//! and released exactly once.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use product_common::{Array, AttributeValue, MetadataAttribute};
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::file::{ArrayFile, Dimension, VariableInfo};
use crate::store::{find_entry, BackingStore};

#[derive(Debug, Clone)]
struct StoredVariable {
    info: VariableInfo,
    array: Array,
}

/// Contents of an in-memory array file.
#[derive(Debug, Clone, Default)]
pub struct MemoryArrayFile {
    variables: BTreeMap<String, StoredVariable>,
}

impl MemoryArrayFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable; one dimension name per array axis.
    pub fn add_variable(
        &mut self,
        name: &str,
        dimension_names: &[&str],
        array: Array,
    ) -> StoreResult<()> {
        if dimension_names.len() != array.rank() {
            return Err(StoreError::InvalidFormat(format!(
                "variable '{}' has rank {} but {} dimension names",
                name,
                array.rank(),
                dimension_names.len()
            )));
        }
        let dimensions = dimension_names
            .iter()
            .zip(array.shape())
            .map(|(dim, &len)| Dimension::new(*dim, len))
            .collect();
        let info = VariableInfo {
            name: name.to_string(),
            data_type: array.data_type(),
            dimensions,
            attributes: Vec::new(),
        };
        self.variables
            .insert(name.to_string(), StoredVariable { info, array });
        Ok(())
    }

    pub fn add_attribute(
        &mut self,
        variable: &str,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> StoreResult<()> {
        let stored = self
            .variables
            .get_mut(variable)
            .ok_or_else(|| StoreError::variable_not_found(variable, "memory"))?;
        stored.info.attributes.push(MetadataAttribute {
            name: name.to_string(),
            value: value.into(),
        });
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Counters {
    opens: AtomicUsize,
    closes: AtomicUsize,
}

/// An open handle on a [`MemoryArrayFile`].
pub struct MemoryFileHandle {
    location: String,
    contents: Arc<MemoryArrayFile>,
    closed: AtomicBool,
    counters: Arc<Counters>,
}

impl ArrayFile for MemoryFileHandle {
    fn location(&self) -> &str {
        &self.location
    }

    fn variable_names(&self) -> Vec<String> {
        self.contents.variables.keys().cloned().collect()
    }

    fn variable(&self, name: &str) -> Option<VariableInfo> {
        self.contents.variables.get(name).map(|v| v.info.clone())
    }

    fn read(&self, name: &str) -> StoreResult<Array> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed(self.location.clone()));
        }
        self.contents
            .variables
            .get(name)
            .map(|v| v.array.clone())
            .ok_or_else(|| StoreError::variable_not_found(name, &self.location))
    }

    fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// A product held entirely in memory.
pub struct MemoryStore {
    location: String,
    manifest: String,
    files: Mutex<BTreeMap<String, Arc<MemoryArrayFile>>>,
    counters: Arc<Counters>,
}

impl MemoryStore {
    pub fn new(location: impl Into<String>, manifest: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            manifest: manifest.into(),
            files: Mutex::new(BTreeMap::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Store a file under a relative path.
    pub fn insert(&self, name: impl Into<String>, file: MemoryArrayFile) {
        self.files.lock().insert(name.into(), Arc::new(file));
    }

    /// Number of handles handed out by [`get_file`](BackingStore::get_file).
    pub fn open_count(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }

    /// Number of handles closed so far.
    pub fn close_count(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }
}

impl BackingStore for MemoryStore {
    fn location(&self) -> &str {
        &self.location
    }

    fn list_files(&self) -> Vec<String> {
        self.files.lock().keys().cloned().collect()
    }

    fn get_file(&self, name: &str) -> StoreResult<Option<Arc<dyn ArrayFile>>> {
        let files = self.files.lock();
        let names: Vec<String> = files.keys().cloned().collect();
        let Some(entry) = find_entry(&names, name) else {
            return Ok(None);
        };
        let Some(contents) = files.get(entry).cloned() else {
            return Ok(None);
        };
        drop(files);

        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        trace!(store = %self.location, file = name, "Opened in-memory file");
        Ok(Some(Arc::new(MemoryFileHandle {
            location: format!("{}/{}", self.location, name),
            contents,
            closed: AtomicBool::new(false),
            counters: self.counters.clone(),
        })))
    }

    fn read_manifest(&self) -> StoreResult<String> {
        Ok(self.manifest.clone())
    }
}

//! Windowed extraction from cached backing arrays.
//!
//! The engine owns the two caches of an open product: file handles keyed by
//! file name and fully decoded arrays keyed by logical variable name. Every
//! windowed read is a section of the cached full array, so each variable is
//! decoded at most once per product.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use array_store::{ArrayFile, BackingStore, VariableInfo};
use product_common::{Array, ProductError, ProductResult, RasterWindow, VariableDescriptor};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::attributes::scaling_of;
use crate::cache::{CacheStats, KeyedCache};

/// Whether to return encoded samples or geophysical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    Raw,
    Scaled,
}

/// Cache counters of an open product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub files: CacheStats,
    pub arrays: CacheStats,
}

/// Reads windows of product variables through the file and array caches.
pub struct ExtractionEngine {
    store: Arc<dyn BackingStore>,
    files: KeyedCache<Arc<dyn ArrayFile>>,
    arrays: KeyedCache<Arc<Array>>,
    closed: AtomicBool,
}

impl ExtractionEngine {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            files: KeyedCache::new("files"),
            arrays: KeyedCache::new("arrays"),
            closed: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> ProductResult<()> {
        if self.is_closed() {
            return Err(ProductError::Closed);
        }
        Ok(())
    }

    /// Handle of `file_name`, opened on first request.
    pub fn open_file(&self, file_name: &str) -> ProductResult<Arc<dyn ArrayFile>> {
        self.ensure_open()?;
        self.files.get_or_try_load(file_name, || {
            let file = self
                .store
                .get_file(file_name)?
                .ok_or_else(|| ProductError::file_not_found(file_name))?;
            debug!(file = file_name, location = file.location(), "Opened backing file");
            Ok(file)
        })
    }

    /// Header of the variable backing `name`.
    pub fn variable_info(&self, descriptor: &VariableDescriptor, name: &str) -> ProductResult<VariableInfo> {
        let file = self.open_file(&descriptor.file_name)?;
        let variable = descriptor.backing_variable_name(name);
        file.variable(variable)
            .ok_or_else(|| ProductError::variable_not_found(variable, file.location()))
    }

    /// The full decoded array behind `name`, cached under `name`.
    pub fn read_full(&self, descriptor: &VariableDescriptor, name: &str) -> ProductResult<Arc<Array>> {
        self.ensure_open()?;
        self.arrays.get_or_try_load(name, || {
            let file = self.open_file(&descriptor.file_name)?;
            let variable = descriptor.backing_variable_name(name);
            let array = file.read(variable)?;
            debug!(
                name,
                variable,
                shape = ?array.shape(),
                "Decoded variable"
            );
            Ok(Arc::new(array))
        })
    }

    /// Extract a window of `name`, optionally scaled to geophysical values.
    ///
    /// A window with a layer selects that index along the third axis.
    /// Windows leaving the array fail with a range error.
    pub fn extract(
        &self,
        descriptor: &VariableDescriptor,
        name: &str,
        window: &RasterWindow,
        mode: SampleMode,
    ) -> ProductResult<Array> {
        let full = self.read_full(descriptor, name)?;
        let (origin, lengths, strides) = window.section_spec();
        let section = full.section(&origin, &lengths, &strides)?;
        self.apply_mode(descriptor, name, section, mode)
    }

    /// Extract one line of a special variable and repeat it over `window`.
    ///
    /// The line is row `line` of a `[lines, columns]` array, or the whole of a
    /// 1-D one, cut to the window's columns. The output has the window's shape
    /// and holds the line repeated until full; the final copy is cut short if
    /// the window does not hold a whole number of lines.
    pub fn extract_broadcast(
        &self,
        descriptor: &VariableDescriptor,
        name: &str,
        window: &RasterWindow,
        line: usize,
        mode: SampleMode,
    ) -> ProductResult<Array> {
        let full = self.read_full(descriptor, name)?;
        let strip = match full.rank() {
            1 => full.section(&[window.x_offset], &[window.width], &[window.x_stride])?,
            2 => full.section(&[line, window.x_offset], &[1, window.width], &[1, window.x_stride])?,
            rank => {
                return Err(ProductError::Format(format!(
                    "cannot broadcast {}-dimensional variable '{}'",
                    rank, name
                )))
            }
        };
        let strip = self.apply_mode(descriptor, name, strip, mode)?;
        let data = strip.data().repeated_to(window.output_len());
        Array::new(vec![window.output_height(), window.output_width()], data)
    }

    fn apply_mode(
        &self,
        descriptor: &VariableDescriptor,
        name: &str,
        array: Array,
        mode: SampleMode,
    ) -> ProductResult<Array> {
        match mode {
            SampleMode::Raw => Ok(array),
            SampleMode::Scaled => {
                let info = self.variable_info(descriptor, name)?;
                Ok(array.scaled(&scaling_of(descriptor, Some(&info))))
            }
        }
    }

    /// Release every file handle and cached array.
    ///
    /// Each handle is closed once. Closing again does nothing; reads after
    /// close fail with [`ProductError::Closed`].
    pub fn close(&self) -> ProductResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.arrays.clear();

        let files = self.files.drain();
        let count = files.len();
        let mut first_error = None;
        for file in files {
            if let Err(err) = file.close() {
                warn!(location = file.location(), error = %err, "Failed to close backing file");
                first_error.get_or_insert(err);
            }
        }
        info!(store = self.store.location(), files = count, "Closed product files");

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            files: self.files.stats(),
            arrays: self.arrays.stats(),
        }
    }
}

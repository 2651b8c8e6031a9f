//! Self-describing array files.

use std::path::Path;
use std::sync::Arc;

use product_common::{Array, AttributeValue, DataType, MetadataAttribute};

use crate::error::StoreResult;

/// A named dimension of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
}

impl Dimension {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }
}

/// Header information of one variable: everything but the data.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub data_type: DataType,
    pub dimensions: Vec<Dimension>,
    pub attributes: Vec<MetadataAttribute>,
}

impl VariableInfo {
    /// Dimension lengths in declaration order.
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.len).collect()
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// First numeric value of an attribute.
    pub fn attribute_f64(&self, name: &str) -> Option<f64> {
        self.attribute(name).and_then(|v| v.as_f64())
    }

    pub fn attribute_text(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(|v| v.as_text())
    }
}

/// An open array file.
///
/// Implementations are shared between reader threads, so reads take `&self`.
/// `close` is idempotent; reads after close fail.
pub trait ArrayFile: Send + Sync {
    /// Location the file was opened from, used in error messages.
    fn location(&self) -> &str;

    fn variable_names(&self) -> Vec<String>;

    fn variable(&self, name: &str) -> Option<VariableInfo>;

    /// Read and decode a variable in full.
    fn read(&self, name: &str) -> StoreResult<Array>;

    fn close(&self) -> StoreResult<()>;
}

/// Opens array files found in a directory store.
pub trait ArrayFileOpener: Send + Sync {
    fn open(&self, path: &Path) -> StoreResult<Arc<dyn ArrayFile>>;
}

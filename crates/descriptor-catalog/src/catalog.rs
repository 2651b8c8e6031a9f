//! The descriptor catalog.
//!
//! One catalog entry per (product type, baseline collection) pair lists the
//! files of the product in order and the variables each file carries. Entries
//! are loaded from YAML, either the set compiled into the crate or a
//! directory of `*.yaml` files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use product_common::{ProductDescriptor, ProductError, ProductResult, VariableDescriptor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CatalogError, CatalogResult};

/// Catalog files compiled into the crate.
const BUILTIN_CATALOG: &[(&str, &str)] = &[
    (
        "OL_1_EFR_004.yaml",
        include_str!("../resources/catalog/OL_1_EFR_004.yaml"),
    ),
    (
        "OL_1_ERR_004.yaml",
        include_str!("../resources/catalog/OL_1_ERR_004.yaml"),
    ),
    (
        "ME_1_RRG_001.yaml",
        include_str!("../resources/catalog/ME_1_RRG_001.yaml"),
    ),
];

/// Variables declared for one backing file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(default)]
    pub variables: Vec<VariableDescriptor>,
}

/// A catalog file: the product descriptor plus its file list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub product: ProductDescriptor,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl CatalogEntry {
    /// Parse an entry from YAML and attach file names to its variables.
    pub fn from_yaml(origin: &str, content: &str) -> CatalogResult<Self> {
        let mut entry: CatalogEntry =
            serde_yaml::from_str(content).map_err(|e| CatalogError::Parse {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;

        for file in &mut entry.files {
            for variable in &mut file.variables {
                variable.file_name = file.name.clone();
            }
        }

        entry.validate()?;
        Ok(entry)
    }

    fn validate(&self) -> CatalogResult<()> {
        let invalid = |message: String| {
            CatalogError::invalid(&self.product.product_type, &self.product.baseline, message)
        };

        if self.product.product_type.is_empty() {
            return Err(invalid("product_type is empty".to_string()));
        }
        if !self.product.has_size()
            && (self.product.width_xpath.is_none() || self.product.height_xpath.is_none())
        {
            return Err(invalid(
                "product size needs either width/height or both xpaths".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for file in &self.files {
            if !seen.insert(file.name.as_str()) {
                return Err(invalid(format!("file '{}' listed twice", file.name)));
            }
            for variable in &file.variables {
                if variable.is_tie_point()
                    && !variable.has_subsampling()
                    && (variable.tp_x_subsampling_xpath.is_none()
                        || variable.tp_y_subsampling_xpath.is_none())
                {
                    return Err(invalid(format!(
                        "tie-point grid '{}' has no subsampling source",
                        variable.name
                    )));
                }
                if variable.layer_token().is_some() && variable.depth.unwrap_or(0) == 0 {
                    return Err(invalid(format!(
                        "layered grid '{}' declares a token but no depth",
                        variable.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of declared variables across all files.
    pub fn num_variables(&self) -> usize {
        self.files.iter().map(|f| f.variables.len()).sum()
    }
}

/// Lookup of descriptors by product type and baseline collection.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<(String, String), CatalogEntry>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for (origin, content) in BUILTIN_CATALOG {
            catalog.insert(CatalogEntry::from_yaml(origin, content)?)?;
        }
        debug!(entries = catalog.len(), "Loaded builtin descriptor catalog");
        Ok(catalog)
    }

    /// Load every `*.yaml` file in a directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> CatalogResult<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| CatalogError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            let content = fs::read_to_string(&path).map_err(|source| CatalogError::Read {
                path: path.clone(),
                source,
            })?;
            catalog.insert(CatalogEntry::from_yaml(&path.display().to_string(), &content)?)?;
        }

        info!(
            dir = %dir.display(),
            entries = catalog.len(),
            "Loaded descriptor catalog"
        );
        Ok(catalog)
    }

    /// Add an entry; a second entry for the same type and baseline is rejected.
    pub fn insert(&mut self, entry: CatalogEntry) -> CatalogResult<()> {
        let key = (
            entry.product.product_type.clone(),
            entry.product.baseline.clone(),
        );
        if self.entries.contains_key(&key) {
            return Err(CatalogError::Duplicate {
                product_type: key.0,
                baseline: key.1,
            });
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All (product type, baseline) pairs, sorted.
    pub fn product_types(&self) -> Vec<(String, String)> {
        self.entries.keys().cloned().collect()
    }

    /// Whether any baseline of `product_type` is known.
    pub fn knows_product_type(&self, product_type: &str) -> bool {
        self.entries.keys().any(|(t, _)| t == product_type)
    }

    pub fn entry(&self, product_type: &str, baseline: &str) -> ProductResult<&CatalogEntry> {
        self.entries
            .get(&(product_type.to_string(), baseline.to_string()))
            .ok_or_else(|| {
                if self.knows_product_type(product_type) {
                    ProductError::descriptor_not_found(product_type, baseline)
                } else {
                    ProductError::UnknownProductType(product_type.to_string())
                }
            })
    }

    pub fn product_descriptor(
        &self,
        product_type: &str,
        baseline: &str,
    ) -> ProductResult<&ProductDescriptor> {
        self.entry(product_type, baseline).map(|e| &e.product)
    }

    /// Ordered file names declared for the product.
    pub fn resolve(&self, product_type: &str, baseline: &str) -> ProductResult<Vec<String>> {
        Ok(self
            .entry(product_type, baseline)?
            .files
            .iter()
            .map(|f| f.name.clone())
            .collect())
    }

    /// Descriptors of the variables declared for `file_name`.
    ///
    /// A file the catalog does not list yields no descriptors.
    pub fn variables_for(
        &self,
        file_name: &str,
        product_type: &str,
        baseline: &str,
    ) -> ProductResult<Vec<VariableDescriptor>> {
        let entry = self.entry(product_type, baseline)?;
        Ok(entry
            .files
            .iter()
            .find(|f| f.name == file_name)
            .map(|f| f.variables.clone())
            .unwrap_or_default())
    }
}

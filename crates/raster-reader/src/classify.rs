//! Sorting descriptors into variable, tie-point, metadata and special maps.

use std::collections::BTreeMap;

use descriptor_catalog::Catalog;
use product_common::{ProductResult, VariableDescriptor, VariableRole};
use tracing::debug;

/// The four descriptor maps of an open product, keyed by descriptor name.
///
/// Maps iterate in lexicographic key order, which fixes the order in which
/// bands and tie-point grids are created.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedDescriptors {
    pub variables: BTreeMap<String, VariableDescriptor>,
    pub tie_points: BTreeMap<String, VariableDescriptor>,
    pub metadata: BTreeMap<String, VariableDescriptor>,
    pub specials: BTreeMap<String, VariableDescriptor>,
}

impl ClassifiedDescriptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the descriptors of every file in `file_names`.
    pub fn from_catalog(
        catalog: &Catalog,
        file_names: &[String],
        product_type: &str,
        baseline: &str,
    ) -> ProductResult<Self> {
        let mut classified = Self::new();
        for file_name in file_names {
            for descriptor in catalog.variables_for(file_name, product_type, baseline)? {
                classified.insert(descriptor);
            }
        }
        debug!(
            variables = classified.variables.len(),
            tie_points = classified.tie_points.len(),
            metadata = classified.metadata.len(),
            specials = classified.specials.len(),
            "Classified descriptors"
        );
        Ok(classified)
    }

    /// Insert one descriptor into the map for its role. A descriptor whose
    /// name is already present replaces the earlier one.
    pub fn insert(&mut self, descriptor: VariableDescriptor) {
        let map = match descriptor.role {
            VariableRole::Ordinary | VariableRole::Flag => &mut self.variables,
            VariableRole::TiePoint => &mut self.tie_points,
            VariableRole::Metadata => &mut self.metadata,
            VariableRole::Special => &mut self.specials,
        };
        let key = descriptor.name.clone();
        if let Some(previous) = map.insert(key, descriptor) {
            debug!(
                name = %previous.name,
                previous_file = %previous.file_name,
                "Descriptor replaced by a later one with the same name"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.variables.len() + self.tie_points.len() + self.metadata.len() + self.specials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.variables.clear();
        self.tie_points.clear();
        self.metadata.clear();
        self.specials.clear();
    }
}

//! Variable and product descriptors.
//!
//! Descriptors are declared once in the catalog and never mutated. Geometry
//! that has to be looked up in a product manifest is computed separately as a
//! [`ResolvedGeometry`] and joined back by name when needed.

use serde::{Deserialize, Serialize};

/// Sentinel for width, height or subsampling that must come from the manifest.
pub const UNRESOLVED: i32 = -1;

fn unresolved() -> i32 {
    UNRESOLVED
}

/// The role a variable plays in a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    /// A full-resolution band.
    #[serde(alias = "variable")]
    Ordinary,
    /// A sample-coded flag band, rendered like an ordinary band.
    Flag,
    /// A subsampled tie-point grid.
    TiePoint,
    /// A variable exposed only as a metadata element.
    Metadata,
    /// A multi-layer or broadcast variable expanded into synthetic bands.
    Special,
}

impl VariableRole {
    /// Get the role name as used in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::Flag => "flag",
            Self::TiePoint => "tie_point",
            Self::Metadata => "metadata",
            Self::Special => "special",
        }
    }
}

/// Physical sample type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl DataType {
    /// Size of one sample in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Whether this is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Get the type name as used in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

/// Catalog entry describing one variable of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Logical name, also the classification key.
    pub name: String,
    /// File the variable lives in. Filled in from the catalog file entry.
    #[serde(default)]
    pub file_name: String,
    pub role: VariableRole,
    pub data_type: DataType,
    #[serde(default = "unresolved")]
    pub width: i32,
    #[serde(default = "unresolved")]
    pub height: i32,
    #[serde(default)]
    pub width_xpath: Option<String>,
    #[serde(default)]
    pub height_xpath: Option<String>,
    #[serde(default = "unresolved")]
    pub tp_subsampling_x: i32,
    #[serde(default = "unresolved")]
    pub tp_subsampling_y: i32,
    #[serde(default)]
    pub tp_x_subsampling_xpath: Option<String>,
    #[serde(default)]
    pub tp_y_subsampling_xpath: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Number of layers along a third dimension.
    #[serde(default)]
    pub depth: Option<usize>,
    /// Token between variable name and 1-based layer index of layered grids.
    #[serde(default)]
    pub depth_prefix_token: Option<String>,
    /// Name of the backing variable in the file, when it differs from `name`.
    #[serde(default)]
    pub nc_var_name: Option<String>,
    /// Scale factor hint; overrides the backing variable's attribute.
    #[serde(default)]
    pub scale_factor: Option<f64>,
    /// Add offset hint; overrides the backing variable's attribute.
    #[serde(default)]
    pub add_offset: Option<f64>,
}

impl VariableDescriptor {
    /// Create a descriptor with unresolved geometry.
    pub fn new(
        name: impl Into<String>,
        file_name: impl Into<String>,
        role: VariableRole,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            role,
            data_type,
            width: UNRESOLVED,
            height: UNRESOLVED,
            width_xpath: None,
            height_xpath: None,
            tp_subsampling_x: UNRESOLVED,
            tp_subsampling_y: UNRESOLVED,
            tp_x_subsampling_xpath: None,
            tp_y_subsampling_xpath: None,
            units: None,
            description: None,
            depth: None,
            depth_prefix_token: None,
            nc_var_name: None,
            scale_factor: None,
            add_offset: None,
        }
    }

    /// Name of the variable to look up in the backing file.
    pub fn backing_variable_name<'a>(&'a self, requested: &'a str) -> &'a str {
        match self.nc_var_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => requested,
        }
    }

    /// Whether width and height are known without a manifest.
    pub fn has_size(&self) -> bool {
        self.width >= 0 && self.height >= 0
    }

    /// Whether tie-point subsampling is known without a manifest.
    pub fn has_subsampling(&self) -> bool {
        self.tp_subsampling_x >= 0 && self.tp_subsampling_y >= 0
    }

    pub fn is_tie_point(&self) -> bool {
        self.role == VariableRole::TiePoint
    }

    /// Depth-layered tie-point grids carry a layer count and a naming token.
    pub fn layer_token(&self) -> Option<&str> {
        self.depth_prefix_token.as_deref().filter(|t| !t.is_empty())
    }

    /// A copy of this descriptor with the resolved geometry applied.
    ///
    /// Resolving the returned descriptor again is a no-op.
    pub fn with_geometry(&self, geometry: &ResolvedGeometry) -> Self {
        let mut resolved = self.clone();
        resolved.width = geometry.width as i32;
        resolved.height = geometry.height as i32;
        if let Some((x, y)) = geometry.subsampling {
            resolved.tp_subsampling_x = x as i32;
            resolved.tp_subsampling_y = y as i32;
        }
        resolved
    }
}

/// Geometry of a variable after manifest lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedGeometry {
    pub width: usize,
    pub height: usize,
    /// Tie-point subsampling factors (x, y).
    pub subsampling: Option<(usize, usize)>,
}

/// Catalog entry describing one product type at one baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub product_type: String,
    pub baseline: String,
    #[serde(default = "unresolved")]
    pub width: i32,
    #[serde(default = "unresolved")]
    pub height: i32,
    #[serde(default)]
    pub width_xpath: Option<String>,
    #[serde(default)]
    pub height_xpath: Option<String>,
    /// Manifest data-object ids whose files are not read.
    #[serde(default)]
    pub excluded_ids: Vec<String>,
    /// Colon separated band auto-grouping pattern.
    #[serde(default)]
    pub band_grouping_pattern: String,
}

impl ProductDescriptor {
    pub fn has_size(&self) -> bool {
        self.width >= 0 && self.height >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_variable_name_override() {
        let mut descriptor =
            VariableDescriptor::new("TP_latitude", "tie_geo_coordinates.nc", VariableRole::TiePoint, DataType::Int32);
        assert_eq!(descriptor.backing_variable_name("TP_latitude"), "TP_latitude");

        descriptor.nc_var_name = Some("latitude".to_string());
        assert_eq!(descriptor.backing_variable_name("TP_latitude"), "latitude");

        descriptor.nc_var_name = Some(String::new());
        assert_eq!(descriptor.backing_variable_name("TP_latitude"), "TP_latitude");
    }

    #[test]
    fn test_with_geometry() {
        let descriptor = VariableDescriptor::new("SZA", "tie_geometries.nc", VariableRole::TiePoint, DataType::UInt32);
        assert!(!descriptor.has_size());
        assert!(!descriptor.has_subsampling());

        let geometry = ResolvedGeometry {
            width: 77,
            height: 1200,
            subsampling: Some((64, 1)),
        };
        let resolved = descriptor.with_geometry(&geometry);
        assert_eq!(resolved.width, 77);
        assert_eq!(resolved.height, 1200);
        assert_eq!(resolved.tp_subsampling_x, 64);
        assert_eq!(resolved.tp_subsampling_y, 1);
        assert!(resolved.has_size());
        assert!(resolved.has_subsampling());
    }

    #[test]
    fn test_role_deserialize_alias() {
        let role: VariableRole = serde_json::from_str("\"variable\"").unwrap();
        assert_eq!(role, VariableRole::Ordinary);
        let role: VariableRole = serde_json::from_str("\"tie_point\"").unwrap();
        assert_eq!(role, VariableRole::TiePoint);
    }

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::UInt8.size_in_bytes(), 1);
        assert_eq!(DataType::Int16.size_in_bytes(), 2);
        assert_eq!(DataType::Float32.size_in_bytes(), 4);
        assert_eq!(DataType::Float64.size_in_bytes(), 8);
        assert!(DataType::Float32.is_float());
        assert!(!DataType::UInt16.is_float());
    }
}

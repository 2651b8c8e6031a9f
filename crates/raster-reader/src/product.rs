//! The product model populated by the reader.

use chrono::{DateTime, Utc};
use product_common::{DataType, MetadataElement, ProductError, ProductResult, Scaling};
use serde::Serialize;

/// One named sample of a flag or index coding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub name: String,
    pub value: i64,
}

/// Meaning of the sample values of a band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "samples", rename_all = "snake_case")]
pub enum SampleCoding {
    /// Bit masks; several may be set at once.
    Flags(Vec<Sample>),
    /// Exclusive values.
    Index(Vec<Sample>),
}

impl SampleCoding {
    pub fn samples(&self) -> &[Sample] {
        match self {
            SampleCoding::Flags(samples) | SampleCoding::Index(samples) => samples,
        }
    }

    pub fn is_flags(&self) -> bool {
        matches!(self, SampleCoding::Flags(_))
    }

    pub fn sample(&self, name: &str) -> Option<&Sample> {
        self.samples().iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A full-resolution band of the scene raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub name: String,
    pub data_type: DataType,
    pub width: usize,
    pub height: usize,
    pub scaling_factor: f64,
    pub scaling_offset: f64,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub spectral_wavelength: Option<f64>,
    pub spectral_bandwidth: Option<f64>,
    pub spectral_band_index: Option<usize>,
    pub no_data_value: Option<f64>,
    /// Synthetic bands are expanded layers of a special variable.
    pub synthetic: bool,
    pub sample_coding: Option<SampleCoding>,
    pub valid_pixel_expression: Option<String>,
}

impl Band {
    pub fn new(name: impl Into<String>, data_type: DataType, width: usize, height: usize) -> Self {
        Self {
            name: name.into(),
            data_type,
            width,
            height,
            scaling_factor: 1.0,
            scaling_offset: 0.0,
            unit: None,
            description: None,
            spectral_wavelength: None,
            spectral_bandwidth: None,
            spectral_band_index: None,
            no_data_value: None,
            synthetic: false,
            sample_coding: None,
            valid_pixel_expression: None,
        }
    }

    /// Transform from the band's raw samples to geophysical values.
    pub fn scaling(&self) -> Scaling {
        Scaling::new(self.scaling_factor, self.scaling_offset).with_fill_value(self.no_data_value)
    }

    pub fn is_spectral(&self) -> bool {
        self.spectral_wavelength.is_some()
    }
}

/// A subsampled grid interpolated to the scene raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiePointGrid {
    pub name: String,
    pub grid_width: usize,
    pub grid_height: usize,
    pub offset_x: f64,
    pub offset_y: f64,
    pub subsampling_x: f64,
    pub subsampling_y: f64,
    pub unit: Option<String>,
    pub description: Option<String>,
    /// Backing variable of a layered grid; `None` when it equals `name`.
    pub variable_name: Option<String>,
}

impl TiePointGrid {
    /// Name of the variable holding this grid's data.
    pub fn backing_name(&self) -> &str {
        self.variable_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_layered(&self) -> bool {
        self.variable_name.is_some()
    }
}

/// A boolean mask over the scene, defined by an expression on a band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mask {
    pub name: String,
    pub expression: String,
    pub description: String,
    pub color: Rgb,
    pub transparency: f64,
}

/// An open product: rasters, masks and metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub name: String,
    pub product_type: String,
    pub scene_width: usize,
    pub scene_height: usize,
    pub description: String,
    /// Band name patterns used to group bands in a tree view.
    pub auto_grouping: Vec<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub bands: Vec<Band>,
    pub tie_point_grids: Vec<TiePointGrid>,
    pub masks: Vec<Mask>,
    pub metadata_root: MetadataElement,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        product_type: impl Into<String>,
        scene_width: usize,
        scene_height: usize,
    ) -> Self {
        Self {
            name: name.into(),
            product_type: product_type.into(),
            scene_width,
            scene_height,
            description: String::new(),
            auto_grouping: Vec::new(),
            start_time: None,
            end_time: None,
            bands: Vec::new(),
            tie_point_grids: Vec::new(),
            masks: Vec::new(),
            metadata_root: MetadataElement::new("metadata"),
        }
    }

    /// Set the auto-grouping from a colon separated pattern list.
    pub fn set_auto_grouping(&mut self, pattern: &str) {
        self.auto_grouping = pattern
            .split(':')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Whether any raster (band or tie-point grid) has this name.
    pub fn contains_raster(&self, name: &str) -> bool {
        self.band(name).is_some() || self.tie_point_grid(name).is_some()
    }

    pub fn add_band(&mut self, band: Band) -> ProductResult<&Band> {
        if self.contains_raster(&band.name) {
            return Err(ProductError::InvalidDescriptor(format!(
                "duplicate raster name '{}'",
                band.name
            )));
        }
        self.bands.push(band);
        Ok(&self.bands[self.bands.len() - 1])
    }

    pub fn add_tie_point_grid(&mut self, grid: TiePointGrid) -> ProductResult<&TiePointGrid> {
        if self.contains_raster(&grid.name) {
            return Err(ProductError::InvalidDescriptor(format!(
                "duplicate raster name '{}'",
                grid.name
            )));
        }
        self.tie_point_grids.push(grid);
        Ok(&self.tie_point_grids[self.tie_point_grids.len() - 1])
    }

    pub fn add_mask(&mut self, mask: Mask) {
        self.masks.push(mask);
    }

    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.name == name)
    }

    pub fn tie_point_grid(&self, name: &str) -> Option<&TiePointGrid> {
        self.tie_point_grids.iter().find(|g| g.name == name)
    }

    pub fn mask(&self, name: &str) -> Option<&Mask> {
        self.masks.iter().find(|m| m.name == name)
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn tie_point_grid_names(&self) -> Vec<&str> {
        self.tie_point_grids.iter().map(|g| g.name.as_str()).collect()
    }
}

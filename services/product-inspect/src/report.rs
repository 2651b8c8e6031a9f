//! Report building and rendering.

use std::fmt::Write;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use geocoding::PixelPos;
use raster_reader::{Level1Reader, RasterWindow, SampleMode};
use serde::Serialize;
use tracing::{debug, warn};

/// Structure of an open product.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub name: String,
    pub product_type: String,
    pub sensor: &'static str,
    pub width: usize,
    pub height: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub bands: Vec<BandSummary>,
    pub tie_point_grids: Vec<GridSummary>,
    pub masks: Vec<MaskSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BandSummary {
    pub name: String,
    pub data_type: &'static str,
    pub unit: Option<String>,
    pub wavelength: Option<f64>,
    pub synthetic: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridSummary {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub subsampling_x: f64,
    pub subsampling_y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaskSummary {
    pub name: String,
    pub expression: String,
}

/// Statistics of the geophysical values of one band over a window.
///
/// Fill samples scale to NaN and are left out of `min`, `max` and `mean`.
#[derive(Debug, Clone, Serialize)]
pub struct WindowStats {
    pub band: String,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub count: usize,
    pub valid: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Geolocation of a pixel centre and where the inverse coding maps it back.
#[derive(Debug, Clone, Serialize)]
pub struct PixelLocation {
    pub x: usize,
    pub y: usize,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub round_trip: Option<(f64, f64)>,
    pub geocoding: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub product: ProductSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel: Option<PixelLocation>,
}

impl ProductSummary {
    pub fn from_reader(reader: &Level1Reader) -> Self {
        let product = reader.product();
        Self {
            name: product.name.clone(),
            product_type: product.product_type.clone(),
            sensor: reader.sensor().sensor.as_str(),
            width: product.scene_width,
            height: product.scene_height,
            start_time: product.start_time,
            end_time: product.end_time,
            bands: product
                .bands
                .iter()
                .map(|band| BandSummary {
                    name: band.name.clone(),
                    data_type: band.data_type.as_str(),
                    unit: band.unit.clone(),
                    wavelength: band.spectral_wavelength,
                    synthetic: band.synthetic,
                })
                .collect(),
            tie_point_grids: product
                .tie_point_grids
                .iter()
                .map(|grid| GridSummary {
                    name: grid.name.clone(),
                    width: grid.grid_width,
                    height: grid.grid_height,
                    subsampling_x: grid.subsampling_x,
                    subsampling_y: grid.subsampling_y,
                })
                .collect(),
            masks: product
                .masks
                .iter()
                .map(|mask| MaskSummary {
                    name: mask.name.clone(),
                    expression: mask.expression.clone(),
                })
                .collect(),
        }
    }
}

/// The band summarised when none is named: the first spectral band, or the
/// first band.
pub fn default_band(reader: &Level1Reader) -> Option<&str> {
    let bands = &reader.product().bands;
    bands
        .iter()
        .find(|band| band.is_spectral())
        .or_else(|| bands.first())
        .map(|band| band.name.as_str())
}

pub fn window_stats(reader: &Level1Reader, band: &str, window: &RasterWindow) -> Result<WindowStats> {
    let data = reader
        .read_band_data(band, window, SampleMode::Scaled)
        .with_context(|| format!("Failed to read band '{}'", band))?;
    let values = data.data().to_f64_vec();

    let valid: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (min, max, mean) = if valid.is_empty() {
        (None, None, None)
    } else {
        let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
        let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = valid.iter().sum::<f64>() / valid.len() as f64;
        (Some(min), Some(max), Some(mean))
    };
    debug!(band, count = values.len(), valid = valid.len(), "Summarised window");

    Ok(WindowStats {
        band: band.to_string(),
        x: window.x_offset,
        y: window.y_offset,
        width: window.width,
        height: window.height,
        count: values.len(),
        valid: valid.len(),
        min,
        max,
        mean,
    })
}

pub fn locate_pixel(reader: &Level1Reader, x: usize, y: usize) -> Result<PixelLocation> {
    let product = reader.product();
    if x >= product.scene_width || y >= product.scene_height {
        return Err(anyhow!(
            "pixel ({}, {}) outside the {}x{} scene",
            x,
            y,
            product.scene_width,
            product.scene_height
        ));
    }

    let mut location = PixelLocation {
        x,
        y,
        lon: None,
        lat: None,
        round_trip: None,
        geocoding: None,
    };
    let Some(coding) = reader.read_geocoding().context("Failed to build geocoding")? else {
        warn!(product = %product.name, "Product has no geolocation");
        return Ok(location);
    };
    location.geocoding = Some(format!("{}/{}", coding.forward_key(), coding.inverse_key()));

    if let Some(geo) = coding.pixel_to_geo(PixelPos::center_of(x, y)) {
        location.lon = Some(geo.lon);
        location.lat = Some(geo.lat);
        location.round_trip = coding.geo_to_pixel(geo).map(|p| (p.x, p.y));
    }
    Ok(location)
}

impl Report {
    /// Text form of the report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let p = &self.product;

        let _ = writeln!(out, "{} ({}, {})", p.name, p.product_type, p.sensor);
        let _ = writeln!(out, "  scene: {} x {}", p.width, p.height);
        if let (Some(start), Some(end)) = (p.start_time, p.end_time) {
            let _ = writeln!(out, "  time:  {} .. {}", start.to_rfc3339(), end.to_rfc3339());
        }

        let _ = writeln!(out, "\nBands ({}):", p.bands.len());
        for band in &p.bands {
            let _ = write!(out, "  {:<40} {:<8}", band.name, band.data_type);
            if let Some(wavelength) = band.wavelength {
                let _ = write!(out, " {:>8.2} nm", wavelength);
            }
            if let Some(unit) = &band.unit {
                let _ = write!(out, " [{}]", unit);
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "\nTie-point grids ({}):", p.tie_point_grids.len());
        for grid in &p.tie_point_grids {
            let _ = writeln!(
                out,
                "  {:<56} {} x {} (every {} x {})",
                grid.name, grid.width, grid.height, grid.subsampling_x, grid.subsampling_y
            );
        }

        let _ = writeln!(out, "\nMasks ({}):", p.masks.len());
        for mask in &p.masks {
            let _ = writeln!(out, "  {:<40} {}", mask.name, mask.expression);
        }

        if let Some(stats) = &self.window {
            let _ = writeln!(
                out,
                "\nWindow {},{} {}x{} of {}:",
                stats.x, stats.y, stats.width, stats.height, stats.band
            );
            let _ = writeln!(out, "  samples: {} ({} valid)", stats.count, stats.valid);
            if let (Some(min), Some(max), Some(mean)) = (stats.min, stats.max, stats.mean) {
                let _ = writeln!(out, "  min {:.6}  max {:.6}  mean {:.6}", min, max, mean);
            }
        }

        if let Some(pixel) = &self.pixel {
            let _ = writeln!(out, "\nPixel {},{}:", pixel.x, pixel.y);
            match (pixel.lon, pixel.lat) {
                (Some(lon), Some(lat)) => {
                    let _ = writeln!(out, "  lon {:.6}  lat {:.6}", lon, lat);
                }
                _ => {
                    let _ = writeln!(out, "  no geolocation");
                }
            }
            if let Some((x, y)) = pixel.round_trip {
                let _ = writeln!(out, "  inverse: {:.3}, {:.3}", x, y);
            }
        }
        out
    }
}

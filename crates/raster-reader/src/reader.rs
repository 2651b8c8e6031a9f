//! The level-1 product reader.
//!
//! Opening a product reads the manifest, classifies the catalog descriptors
//! of every file it declares and builds the [`Product`] model. Raster data is
//! read on demand through the [`ExtractionEngine`].

use std::collections::HashMap;
use std::sync::Arc;

use array_store::{BackingStore, XfduManifest};
use descriptor_catalog::{ensure_product_size, ensure_width_and_height, Catalog};
use geocoding::{ComponentFactory, ComponentGeoCoding, GeoChecks, GeoRaster};
use parking_lot::RwLock;
use product_common::{
    Array, AttributeValue, Manifest, MetadataElement, ProductDescriptor, ProductError, ProductResult,
    RasterWindow, VariableDescriptor,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::attributes::{sample_coding_of, scaling_of, LONG_NAME, UNITS};
use crate::cache::{CacheStats, KeyedCache};
use crate::classify::ClassifiedDescriptors;
use crate::config::ReaderConfig;
use crate::extract::{ExtractionEngine, SampleMode};
use crate::layers::{self, LayerName};
use crate::masks::{masks_for_band, ColorProvider};
use crate::product::{Band, Product, TiePointGrid};
use crate::sensor::{BandDescription, Sensor, SensorContext};

/// Cache counters of an open product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReaderStats {
    pub files: CacheStats,
    pub arrays: CacheStats,
    pub tie_point_grids: CacheStats,
}

/// An open OLCI or MERIS level-1 product.
pub struct Level1Reader {
    config: ReaderConfig,
    context: SensorContext,
    manifest: XfduManifest,
    descriptor: ProductDescriptor,
    descriptors: RwLock<ClassifiedDescriptors>,
    engine: ExtractionEngine,
    tie_point_data: KeyedCache<Arc<Vec<f32>>>,
    product: Product,
}

impl Level1Reader {
    /// Open the product in `store` with the configured catalog.
    pub fn open(store: Arc<dyn BackingStore>, config: ReaderConfig) -> ProductResult<Self> {
        config.validate()?;
        let catalog = config.load_catalog()?;
        Self::open_with_catalog(store, config, &catalog)
    }

    /// Open the product in `store` with an explicit catalog.
    pub fn open_with_catalog(
        store: Arc<dyn BackingStore>,
        config: ReaderConfig,
        catalog: &Catalog,
    ) -> ProductResult<Self> {
        config.validate()?;
        let manifest = XfduManifest::parse(&store.read_manifest()?)?;
        let product_type = manifest.product_type().to_string();
        let baseline = manifest.baseline_collection().to_string();

        let context = Sensor::from_product_type(&product_type)?.context(&product_type);
        let band_descriptions = context.band_descriptions(&manifest.metadata());

        let descriptor = catalog.product_descriptor(&product_type, &baseline)?.clone();
        let (width, height) = ensure_product_size(&descriptor, &manifest)?;

        let mut product = Product::new(manifest.product_name(), &product_type, width, height);
        product.description = manifest.description().to_string();
        product.set_auto_grouping(&descriptor.band_grouping_pattern);
        product.start_time = manifest.start_time();
        product.end_time = manifest.stop_time();

        let file_names = manifest.file_names(&descriptor.excluded_ids);
        let descriptors =
            ClassifiedDescriptors::from_catalog(catalog, &file_names, &product_type, &baseline)?;

        let mut reader = Self {
            config,
            context,
            manifest,
            descriptor,
            descriptors: RwLock::new(descriptors),
            engine: ExtractionEngine::new(store),
            tie_point_data: KeyedCache::new("tie_point_grids"),
            product,
        };

        reader.add_bands(&band_descriptions)?;
        reader.add_tie_point_grids()?;
        reader.add_special_bands()?;
        reader.add_masks();
        reader.add_metadata();

        info!(
            product = %reader.product.name,
            product_type = %product_type,
            baseline = %baseline,
            width,
            height,
            bands = reader.product.bands.len(),
            tie_point_grids = reader.product.tie_point_grids.len(),
            masks = reader.product.masks.len(),
            "Opened product"
        );
        Ok(reader)
    }

    /// Open a product directory or zipped product of NetCDF files.
    #[cfg(feature = "netcdf")]
    pub fn open_path<P: AsRef<std::path::Path>>(path: P, config: ReaderConfig) -> ProductResult<Self> {
        let path = path.as_ref();
        if array_store::is_zip(path) {
            let store = array_store::ZipStore::open_netcdf(path)?;
            return Self::open(Arc::new(store), config);
        }
        let store = array_store::DirectoryStore::open_netcdf(path)?;
        Self::open(Arc::new(store), config)
    }

    fn add_bands(&mut self, band_descriptions: &HashMap<String, BandDescription>) -> ProductResult<()> {
        let variables: Vec<VariableDescriptor> =
            self.descriptors.read().variables.values().cloned().collect();

        for descriptor in variables {
            let name = descriptor.name.clone();
            let geometry = ensure_width_and_height(&descriptor, &self.manifest)?;
            let info = match self.engine.variable_info(&descriptor, &name) {
                Ok(info) => info,
                Err(err) if err.is_io_failure() => {
                    warn!(band = %name, error = %err, "Skipping band without backing variable");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let scaling = scaling_of(&descriptor, Some(&info));
            let mut band = Band::new(&name, descriptor.data_type, geometry.width, geometry.height);
            band.scaling_factor = scaling.factor;
            band.scaling_offset = scaling.offset;
            band.no_data_value = scaling.fill_value;
            band.unit = descriptor
                .units
                .clone()
                .or_else(|| info.attribute_text(UNITS).map(str::to_string));
            band.description = descriptor
                .description
                .clone()
                .or_else(|| info.attribute_text(LONG_NAME).map(str::to_string));
            band.sample_coding = sample_coding_of(&info);
            band.valid_pixel_expression = self.context.valid_pixel_expression(&name).map(str::to_string);

            if let Some(spectral) = self
                .context
                .band_key(&name)
                .and_then(|key| band_descriptions.get(key))
            {
                band.spectral_wavelength = Some(spectral.wavelength);
                band.spectral_bandwidth = Some(spectral.bandwidth);
                band.spectral_band_index = Some(spectral.index);
            }

            debug!(band = %name, width = band.width, height = band.height, "Added band");
            self.product.add_band(band)?;
        }
        Ok(())
    }

    fn add_tie_point_grids(&mut self) -> ProductResult<()> {
        let tie_points: Vec<VariableDescriptor> =
            self.descriptors.read().tie_points.values().cloned().collect();

        for descriptor in tie_points {
            let geometry = ensure_width_and_height(&descriptor, &self.manifest)?;
            let (subsampling_x, subsampling_y) = geometry.subsampling.unwrap_or((1, 1));
            let grid = |name: String, variable_name: Option<String>| TiePointGrid {
                name,
                grid_width: geometry.width,
                grid_height: geometry.height,
                offset_x: 0.0,
                offset_y: 0.0,
                subsampling_x: subsampling_x as f64,
                subsampling_y: subsampling_y as f64,
                unit: descriptor.units.clone(),
                description: descriptor.description.clone(),
                variable_name,
            };

            match (descriptor.depth, descriptor.layer_token()) {
                (Some(depth), Some(token)) if depth > 0 => {
                    for layer in 1..=depth {
                        let name = layers::tie_point_layer_name(&descriptor.name, token, layer);
                        self.product
                            .add_tie_point_grid(grid(name, Some(descriptor.name.clone())))?;
                    }
                    debug!(grid = %descriptor.name, depth, "Added layered tie-point grids");
                }
                _ => {
                    self.product.add_tie_point_grid(grid(descriptor.name.clone(), None))?;
                }
            }
        }
        Ok(())
    }

    fn add_special_bands(&mut self) -> ProductResult<()> {
        let specials: Vec<VariableDescriptor> =
            self.descriptors.read().specials.values().cloned().collect();
        let (width, height) = (self.product.scene_width, self.product.scene_height);

        for descriptor in specials {
            let name = descriptor.name.clone();
            let info = match self.engine.variable_info(&descriptor, &name) {
                Ok(info) => info,
                Err(err) if err.is_io_failure() => {
                    warn!(variable = %name, error = %err, "Skipping special variable");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let Some(layer_count) = info.dimension("bands").map(|d| d.len) else {
                warn!(variable = %name, "Special variable has no bands dimension");
                continue;
            };

            let scaling = scaling_of(&descriptor, Some(&info));
            let unit = descriptor
                .units
                .clone()
                .or_else(|| info.attribute_text(UNITS).map(str::to_string));
            let description = descriptor
                .description
                .clone()
                .or_else(|| info.attribute_text(LONG_NAME).map(str::to_string));
            for layer in 1..=layer_count {
                let mut band = Band::new(layers::layer_name(&name, layer), descriptor.data_type, width, height);
                band.synthetic = true;
                band.scaling_factor = scaling.factor;
                band.scaling_offset = scaling.offset;
                band.no_data_value = scaling.fill_value;
                band.unit = unit.clone();
                band.description = description.clone();
                self.product.add_band(band)?;
            }
            debug!(variable = %name, layers = layer_count, "Added special bands");
        }
        Ok(())
    }

    fn add_masks(&mut self) {
        let mut colors = ColorProvider::new();
        let masks: Vec<_> = self
            .product
            .bands
            .iter()
            .flat_map(|band| masks_for_band(band, &mut colors))
            .collect();
        for mask in masks {
            self.product.add_mask(mask);
        }
    }

    fn add_metadata(&mut self) {
        let mut root = MetadataElement::new("metadata");
        root.add_element(self.manifest.metadata());
        for name in self.descriptors.read().metadata.keys() {
            root.add_element(MetadataElement::new(name.clone()));
        }
        self.product.metadata_root = root;
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn manifest(&self) -> &XfduManifest {
        &self.manifest
    }

    pub fn product_descriptor(&self) -> &ProductDescriptor {
        &self.descriptor
    }

    pub fn sensor(&self) -> &SensorContext {
        &self.context
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    fn ensure_open(&self) -> ProductResult<()> {
        if self.engine.is_closed() {
            return Err(ProductError::Closed);
        }
        Ok(())
    }

    fn not_found(&self, name: &str) -> ProductError {
        ProductError::variable_not_found(name, self.engine.store().location())
    }

    /// Raw samples of a band in a window.
    pub fn read_band_raster_data(&self, band_name: &str, window: &RasterWindow) -> ProductResult<Array> {
        self.read_band_data(band_name, window, SampleMode::Raw)
    }

    /// Samples of a band in a window.
    ///
    /// Layer names of special variables resolve to one line of the special
    /// variable, repeated over the window.
    pub fn read_band_data(
        &self,
        band_name: &str,
        window: &RasterWindow,
        mode: SampleMode,
    ) -> ProductResult<Array> {
        self.ensure_open()?;
        let descriptors = self.descriptors.read();

        if let LayerName::Band { variable, index } = LayerName::parse(band_name) {
            if let Some(descriptor) = descriptors.specials.get(variable) {
                if index == 0 {
                    return Err(self.not_found(band_name));
                }
                return self
                    .engine
                    .extract_broadcast(descriptor, variable, window, index - 1, mode);
            }
        }

        let descriptor = descriptors
            .variables
            .get(band_name)
            .ok_or_else(|| self.not_found(band_name))?;
        self.engine.extract(descriptor, band_name, window, mode)
    }

    /// Geophysical values of a tie-point grid, cached per grid.
    pub fn read_tie_point_grid_data(&self, grid_name: &str) -> ProductResult<Arc<Vec<f32>>> {
        self.ensure_open()?;
        self.tie_point_data.get_or_try_load(grid_name, || {
            let values = self.tie_point_grid_values(grid_name)?;
            Ok(Arc::new(values.data().to_f32_vec()))
        })
    }

    fn tie_point_grid_values(&self, grid_name: &str) -> ProductResult<Array> {
        let grid = self
            .product
            .tie_point_grid(grid_name)
            .ok_or_else(|| self.not_found(grid_name))?;
        let variable = grid.backing_name();
        let descriptor = self
            .descriptors
            .read()
            .tie_points
            .get(variable)
            .cloned()
            .ok_or_else(|| self.not_found(variable))?;

        let mut window = RasterWindow::full(grid.grid_width, grid.grid_height)?;
        if grid.is_layered() {
            let layer = layers::layer_index_from_tie_point_name(grid_name, descriptor.layer_token())
                .filter(|&layer| layer > 0)
                .ok_or_else(|| ProductError::Format(format!("no layer index in '{}'", grid_name)))?;
            window = window.with_layer(layer - 1);
        }
        self.engine.extract(&descriptor, variable, &window, SampleMode::Scaled)
    }

    /// Metadata element built from a metadata variable; `None` for names
    /// that are not metadata variables.
    pub fn read_metadata_element(&self, name: &str) -> ProductResult<Option<MetadataElement>> {
        self.ensure_open()?;
        let Some(descriptor) = self.descriptors.read().metadata.get(name).cloned() else {
            return Ok(None);
        };

        let info = self.engine.variable_info(&descriptor, name)?;
        let array = self.engine.read_full(&descriptor, name)?;

        let mut element = MetadataElement::new(name);
        for attribute in &info.attributes {
            element.add_attribute(attribute.name.clone(), attribute.value.clone());
        }
        let mut dimensions = MetadataElement::new("dimensions");
        for dimension in &info.dimensions {
            dimensions.add_attribute(dimension.name.clone(), dimension.len as f64);
        }
        element.add_element(dimensions);
        element.add_attribute("data_type", descriptor.data_type.as_str());
        element.add_attribute("values", AttributeValue::Numbers(array.data().to_f64_vec()));
        Ok(Some(element))
    }

    /// Geocoding of the scene from pixel or tie-point geolocation.
    ///
    /// Returns `Ok(None)` when the longitude or latitude source is missing.
    pub fn read_geocoding(&self) -> ProductResult<Option<ComponentGeoCoding>> {
        self.ensure_open()?;
        let keys = self.config.geocoding_keys(&self.context);
        let raster = if keys.use_pixel {
            self.pixel_geo_raster()?
        } else {
            self.tie_point_geo_raster()?
        };
        let Some(raster) = raster else {
            info!(pixel = keys.use_pixel, "Geolocation sources missing, no geocoding");
            return Ok(None);
        };

        let forward = ComponentFactory::forward(&keys.forward)?;
        let inverse = ComponentFactory::inverse(&keys.inverse)?;
        Ok(Some(ComponentGeoCoding::new(raster, forward, inverse, GeoChecks::Poles)))
    }

    fn pixel_geo_raster(&self) -> ProductResult<Option<GeoRaster>> {
        let (lon_name, lat_name) = (self.context.lon_band_name, self.context.lat_band_name);
        let (Some(lon_band), Some(_)) = (self.product.band(lon_name), self.product.band(lat_name)) else {
            return Ok(None);
        };
        let window = RasterWindow::full(lon_band.width, lon_band.height)?;
        let lons = self.read_band_data(lon_name, &window, SampleMode::Scaled)?;
        let lats = self.read_band_data(lat_name, &window, SampleMode::Scaled)?;
        let raster = GeoRaster::pixel(
            lons.data().to_f64_vec(),
            lats.data().to_f64_vec(),
            lon_name,
            lat_name,
            lon_band.width,
            lon_band.height,
            self.context.resolution_km,
        )?;
        Ok(Some(raster))
    }

    fn tie_point_geo_raster(&self) -> ProductResult<Option<GeoRaster>> {
        let (lon_name, lat_name) = (self.context.lon_tie_point_name, self.context.lat_tie_point_name);
        let (Some(lon_grid), Some(_)) = (
            self.product.tie_point_grid(lon_name),
            self.product.tie_point_grid(lat_name),
        ) else {
            return Ok(None);
        };
        let lons = self.tie_point_grid_values(lon_name)?;
        let lats = self.tie_point_grid_values(lat_name)?;
        let raster = GeoRaster::tie_point(
            lons.data().to_f64_vec(),
            lats.data().to_f64_vec(),
            lon_name,
            lat_name,
            lon_grid.grid_width,
            lon_grid.grid_height,
            self.product.scene_width,
            self.product.scene_height,
            self.context.resolution_km,
            lon_grid.offset_x,
            lon_grid.offset_y,
            lon_grid.subsampling_x,
            lon_grid.subsampling_y,
        )?;
        Ok(Some(raster))
    }

    /// Close the product.
    ///
    /// Clears the descriptor maps and caches and closes every file handle
    /// once. Calling it again does nothing.
    pub fn close(&self) -> ProductResult<()> {
        if self.engine.is_closed() {
            return Ok(());
        }
        self.descriptors.write().clear();
        self.tie_point_data.clear();
        self.engine.close()?;
        info!(product = %self.product.name, "Closed product");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.engine.is_closed()
    }

    pub fn cache_stats(&self) -> ReaderStats {
        let engine = self.engine.stats();
        ReaderStats {
            files: engine.files,
            arrays: engine.arrays,
            tie_point_grids: self.tie_point_data.stats(),
        }
    }
}

impl Drop for Level1Reader {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "Failed to close product on drop");
        }
    }
}

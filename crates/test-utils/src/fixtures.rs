//! Synthetic Sentinel-3 style products held in memory.
//!
//! A [`SyntheticProduct`] describes a small scene; [`SyntheticProduct::build`]
//! turns it into a [`MemoryStore`] with one in-memory array file per
//! catalog file and a generated XFDU manifest that the real manifest reader
//! parses. Every sample value is a function of its position so tests can
//! check reads without keeping copies of the data.

use array_store::{MemoryArrayFile, MemoryStore};
use product_common::Array;

use crate::generators::{create_count_grid, tie_point_grid_size, to_micro_degrees, Swath};

/// Layers of the temperature profile on tie points.
pub const PRESSURE_LEVELS: usize = 25;

/// Encoded radiance fill value.
pub const RADIANCE_FILL: u16 = u16::MAX;

/// Quality flag masks and meanings, in declaration order.
pub const QUALITY_FLAGS: [(u32, &str); 5] = [
    (1, "land"),
    (2, "coastline"),
    (4, "fresh_inland_water"),
    (8, "spare"),
    (16, "bright"),
];

/// OLCI band centre wavelengths and widths in nm.
pub const OLCI_BANDS: [(f64, f64); 21] = [
    (400.0, 15.0),
    (412.5, 10.0),
    (442.5, 10.0),
    (490.0, 10.0),
    (510.0, 10.0),
    (560.0, 10.0),
    (620.0, 10.0),
    (665.0, 10.0),
    (673.75, 7.5),
    (681.25, 7.5),
    (708.75, 10.0),
    (753.75, 7.5),
    (761.25, 2.5),
    (764.375, 3.75),
    (767.5, 2.5),
    (778.75, 15.0),
    (865.0, 20.0),
    (885.0, 10.0),
    (900.0, 10.0),
    (940.0, 20.0),
    (1020.0, 40.0),
];

/// MERIS band centre wavelengths and widths in nm.
pub const MERIS_BANDS: [(f64, f64); 15] = [
    (412.5, 10.0),
    (442.5, 10.0),
    (490.0, 10.0),
    (510.0, 10.0),
    (560.0, 10.0),
    (620.0, 10.0),
    (665.0, 10.0),
    (681.25, 7.5),
    (708.75, 10.0),
    (753.75, 7.5),
    (761.875, 3.75),
    (778.75, 15.0),
    (865.0, 20.0),
    (885.0, 10.0),
    (900.0, 10.0),
];

/// Instrument of a synthetic product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureSensor {
    Olci,
    Meris,
}

impl FixtureSensor {
    fn band_prefix(&self) -> &'static str {
        match self {
            FixtureSensor::Olci => "Oa",
            FixtureSensor::Meris => "M",
        }
    }

    fn information_element(&self) -> &'static str {
        match self {
            FixtureSensor::Olci => "olciProductInformation",
            FixtureSensor::Meris => "merisProductInformation",
        }
    }

    fn namespace(&self) -> (&'static str, &'static str) {
        match self {
            FixtureSensor::Olci => ("olci", "http://www.esa.int/safe/sentinel/sentinel-3/olci/1.0"),
            FixtureSensor::Meris => ("meris", "http://www.esa.int/safe/sentinel/sentinel-3/meris/1.0"),
        }
    }

    fn bands(&self) -> &'static [(f64, f64)] {
        match self {
            FixtureSensor::Olci => &OLCI_BANDS,
            FixtureSensor::Meris => &MERIS_BANDS,
        }
    }
}

/// Description of a small synthetic product.
#[derive(Debug, Clone)]
pub struct SyntheticProduct {
    pub sensor: FixtureSensor,
    pub product_type: String,
    pub baseline: String,
    pub width: usize,
    pub height: usize,
    pub columns_per_tie_point: usize,
    pub rows_per_tie_point: usize,
    /// Number of radiance bands, counted from the first.
    pub num_bands: usize,
    pub swath: Swath,
    pub pixel_geolocation: bool,
    pub tie_point_geolocation: bool,
}

impl SyntheticProduct {
    /// An OL_1_EFR product at baseline 004.
    pub fn olci(width: usize, height: usize) -> Self {
        Self {
            sensor: FixtureSensor::Olci,
            product_type: "OL_1_EFR".to_string(),
            baseline: "004".to_string(),
            width,
            height,
            columns_per_tie_point: 8,
            rows_per_tie_point: 2,
            num_bands: 3,
            swath: Swath::default(),
            pixel_geolocation: true,
            tie_point_geolocation: true,
        }
    }

    /// An ME_1_RRG product at baseline 001.
    pub fn meris(width: usize, height: usize) -> Self {
        Self {
            sensor: FixtureSensor::Meris,
            product_type: "ME_1_RRG".to_string(),
            baseline: "001".to_string(),
            ..Self::olci(width, height)
        }
    }

    pub fn with_baseline(mut self, baseline: &str) -> Self {
        self.baseline = baseline.to_string();
        self
    }

    pub fn with_product_type(mut self, product_type: &str) -> Self {
        self.product_type = product_type.to_string();
        self
    }

    pub fn with_bands(mut self, num_bands: usize) -> Self {
        self.num_bands = num_bands.clamp(1, self.sensor.bands().len());
        self
    }

    pub fn with_swath(mut self, swath: Swath) -> Self {
        self.swath = swath;
        self
    }

    pub fn with_tie_point_sampling(mut self, columns: usize, rows: usize) -> Self {
        self.columns_per_tie_point = columns;
        self.rows_per_tie_point = rows;
        self
    }

    pub fn without_pixel_geolocation(mut self) -> Self {
        self.pixel_geolocation = false;
        self
    }

    pub fn without_tie_point_geolocation(mut self) -> Self {
        self.tie_point_geolocation = false;
        self
    }

    pub fn product_name(&self) -> String {
        let platform = match self.sensor {
            FixtureSensor::Olci => "S3A",
            FixtureSensor::Meris => "ENV",
        };
        format!(
            "{}_{}____20160419T101302_20160419T101602_SYNTHETIC.SEN3",
            platform, self.product_type
        )
    }

    /// Name of radiance band `band` (1-based), e.g. `Oa03_radiance`.
    pub fn band_name(&self, band: usize) -> String {
        format!("{}{:02}_radiance", self.sensor.band_prefix(), band)
    }

    /// Band key used in the manifest band descriptions, e.g. `Oa03`.
    pub fn band_key(&self, band: usize) -> String {
        format!("{}{:02}", self.sensor.band_prefix(), band)
    }

    pub fn band_wavelength(&self, band: usize) -> (f64, f64) {
        self.sensor.bands()[band - 1]
    }

    /// Scale factor of radiance band `band`.
    pub fn radiance_scale(band: usize) -> f64 {
        0.0125 * band as f64
    }

    /// Encoded radiance of band `band` at pixel `(x, y)`.
    pub fn radiance_count(&self, band: usize, x: usize, y: usize) -> u16 {
        let base = (band * 1000) as u16;
        ((base as usize + y * self.width + x) % (u16::MAX as usize - 1)) as u16
    }

    /// Quality flag word at pixel `(x, y)`: land on even columns, bright on
    /// every third row.
    pub fn quality_flag(x: usize, y: usize) -> u32 {
        let land = if x % 2 == 0 { 1 } else { 0 };
        let bright = if y % 3 == 0 { 16 } else { 0 };
        land | bright
    }

    /// Temperature profile value at tie point `(i, j)` and 0-based `level`.
    pub fn temperature(i: usize, j: usize, level: usize) -> f32 {
        200.0 + level as f32 * 2.0 + i as f32 * 0.5 + j as f32 * 0.25
    }

    /// `lambda0` of band `band` (1-based) seen by detector `detector`.
    pub fn lambda0(&self, band: usize, detector: usize) -> f32 {
        self.band_wavelength(band).0 as f32 + detector as f32 * 0.001
    }

    pub fn tie_point_size(&self) -> (usize, usize) {
        tie_point_grid_size(
            self.width,
            self.height,
            self.columns_per_tie_point,
            self.rows_per_tie_point,
        )
    }

    /// Files in manifest order, paired with their data-object ids.
    fn data_objects(&self) -> Vec<(String, String)> {
        let mut objects: Vec<(String, String)> = (1..=self.num_bands)
            .map(|band| {
                let name = self.band_name(band);
                (format!("{}Data", name), format!("{}.nc", name))
            })
            .collect();
        if self.pixel_geolocation {
            objects.push(("geoCoordinatesData".into(), "geo_coordinates.nc".into()));
        }
        objects.push(("qualityFlagsData".into(), "qualityFlags.nc".into()));
        if self.tie_point_geolocation {
            objects.push(("tieGeoCoordinatesData".into(), "tie_geo_coordinates.nc".into()));
        }
        objects.push(("tieGeometriesData".into(), "tie_geometries.nc".into()));
        objects.push(("tieMeteoData".into(), "tie_meteo.nc".into()));
        objects.push(("instrumentDataData".into(), "instrument_data.nc".into()));
        objects.push(("timeCoordinatesData".into(), "time_coordinates.nc".into()));
        objects.push(("removedPixelsData".into(), "removed_pixels.nc".into()));
        objects
    }

    /// File names the manifest declares, excluding removed pixels.
    pub fn file_names(&self) -> Vec<String> {
        self.data_objects()
            .into_iter()
            .map(|(_, file)| file)
            .filter(|file| file != "removed_pixels.nc")
            .collect()
    }

    /// The XFDU manifest document.
    pub fn manifest_xml(&self) -> String {
        let info = self.sensor.information_element();
        let (prefix, namespace) = self.sensor.namespace();

        let band_descriptions: String = (1..=self.num_bands)
            .map(|band| {
                let (wavelength, bandwidth) = self.band_wavelength(band);
                format!(
                    "              <sentinel3:band name=\"{}\">\n                <sentinel3:centralWavelength>{:.6}</sentinel3:centralWavelength>\n                <sentinel3:bandwidth>{:.6}</sentinel3:bandwidth>\n              </sentinel3:band>\n",
                    self.band_key(band),
                    wavelength,
                    bandwidth
                )
            })
            .collect();

        let data_objects: String = self
            .data_objects()
            .iter()
            .map(|(id, file)| {
                format!(
                    "    <dataObject ID=\"{}\">\n      <byteStream mimeType=\"application/x-netcdf\" size=\"1024\">\n        <fileLocation locatorType=\"URL\" href=\"./{}\"/>\n      </byteStream>\n    </dataObject>\n",
                    id, file
                )
            })
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1" xmlns:sentinel-safe="http://www.esa.int/safe/sentinel/1.1" xmlns:sentinel3="http://www.esa.int/safe/sentinel/sentinel-3/1.0" xmlns:{prefix}="{namespace}">
  <informationPackageMap>
    <xfdu:contentUnit unitType="SAFE Archive Information Package" textInfo="Synthetic {product_type} product"/>
  </informationPackageMap>
  <metadataSection>
    <metadataObject ID="acquisitionPeriod" classification="DESCRIPTION" category="DMD">
      <metadataWrap mimeType="text/xml" vocabularyName="Sentinel-SAFE" textInfo="Acquisition Period">
        <xmlData>
          <sentinel-safe:acquisitionPeriod>
            <sentinel-safe:startTime>2016-04-19T10:13:02.000000Z</sentinel-safe:startTime>
            <sentinel-safe:stopTime>2016-04-19T10:16:02.000000Z</sentinel-safe:stopTime>
          </sentinel-safe:acquisitionPeriod>
        </xmlData>
      </metadataWrap>
    </metadataObject>
    <metadataObject ID="generalProductInformation" classification="DESCRIPTION" category="DMD">
      <metadataWrap mimeType="text/xml" vocabularyName="Sentinel-SAFE" textInfo="General Product Information">
        <xmlData>
          <sentinel3:generalProductInformation>
            <sentinel3:productName>{product_name}</sentinel3:productName>
            <sentinel3:productType>{product_type}</sentinel3:productType>
            <sentinel3:baselineCollection>{baseline}</sentinel3:baselineCollection>
          </sentinel3:generalProductInformation>
        </xmlData>
      </metadataWrap>
    </metadataObject>
    <metadataObject ID="{info}" classification="DESCRIPTION" category="DMD">
      <metadataWrap mimeType="text/xml" vocabularyName="Sentinel-SAFE" textInfo="Product Information">
        <xmlData>
          <{prefix}:{info}>
            <{prefix}:samplingParameters>
              <{prefix}:columnsPerTiePoint>{cx}</{prefix}:columnsPerTiePoint>
              <{prefix}:rowsPerTiePoint>{ry}</{prefix}:rowsPerTiePoint>
            </{prefix}:samplingParameters>
            <{prefix}:imageSize>
              <sentinel3:rows>{height}</sentinel3:rows>
              <sentinel3:columns>{width}</sentinel3:columns>
            </{prefix}:imageSize>
            <{prefix}:bandDescriptions>
{band_descriptions}            </{prefix}:bandDescriptions>
          </{prefix}:{info}>
        </xmlData>
      </metadataWrap>
    </metadataObject>
  </metadataSection>
  <dataObjectSection>
{data_objects}  </dataObjectSection>
</xfdu:XFDU>
"#,
            prefix = prefix,
            namespace = namespace,
            info = info,
            product_type = self.product_type,
            product_name = self.product_name(),
            baseline = self.baseline,
            cx = self.columns_per_tie_point,
            ry = self.rows_per_tie_point,
            width = self.width,
            height = self.height,
            band_descriptions = band_descriptions,
            data_objects = data_objects,
        )
    }

    /// Build the in-memory product.
    pub fn build(&self) -> MemoryStore {
        let store = MemoryStore::new(format!("memory://{}", self.product_name()), self.manifest_xml());

        for band in 1..=self.num_bands {
            store.insert(format!("{}.nc", self.band_name(band)), self.radiance_file(band));
        }
        if self.pixel_geolocation {
            store.insert("geo_coordinates.nc", self.geo_coordinates_file());
        }
        store.insert("qualityFlags.nc", self.quality_flags_file());
        if self.tie_point_geolocation {
            store.insert("tie_geo_coordinates.nc", self.tie_geo_coordinates_file());
        }
        store.insert("tie_geometries.nc", self.tie_geometries_file());
        store.insert("tie_meteo.nc", self.tie_meteo_file());
        store.insert("instrument_data.nc", self.instrument_data_file());
        store.insert("time_coordinates.nc", self.time_coordinates_file());
        store
    }

    fn image_shape(&self) -> Vec<usize> {
        vec![self.height, self.width]
    }

    fn tie_point_shape(&self) -> Vec<usize> {
        let (w, h) = self.tie_point_size();
        vec![h, w]
    }

    fn radiance_file(&self, band: usize) -> MemoryArrayFile {
        let name = self.band_name(band);
        let mut counts = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                counts.push(self.radiance_count(band, x, y));
            }
        }

        let mut file = MemoryArrayFile::new();
        add(&mut file, &name, &["rows", "columns"], self.image_shape(), counts);
        attr(&mut file, &name, "scale_factor", Self::radiance_scale(band));
        attr(&mut file, &name, "add_offset", 0.0);
        attr(&mut file, &name, "_FillValue", RADIANCE_FILL as f64);
        attr(&mut file, &name, "units", "mW.m-2.sr-1.nm-1");
        attr(&mut file, &name, "long_name", format!("TOA radiance for band {}", self.band_key(band)));
        file
    }

    fn geo_coordinates_file(&self) -> MemoryArrayFile {
        let (lons, lats) = self.swath.pixel_grid(self.width, self.height);
        let mut file = MemoryArrayFile::new();
        for (name, values, units) in [
            ("longitude", &lons, "degrees_east"),
            ("latitude", &lats, "degrees_north"),
        ] {
            add(&mut file, name, &["rows", "columns"], self.image_shape(), to_micro_degrees(values));
            attr(&mut file, name, "scale_factor", 1e-6);
            attr(&mut file, name, "_FillValue", i32::MIN as f64);
            attr(&mut file, name, "units", units);
        }

        let altitude: Vec<i16> = (0..self.width * self.height).map(|k| (k % 1000) as i16).collect();
        add(&mut file, "altitude", &["rows", "columns"], self.image_shape(), altitude);
        attr(&mut file, "altitude", "units", "m");
        file
    }

    fn quality_flags_file(&self) -> MemoryArrayFile {
        let mut flags = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                flags.push(Self::quality_flag(x, y));
            }
        }

        let mut file = MemoryArrayFile::new();
        add(&mut file, "quality_flags", &["rows", "columns"], self.image_shape(), flags);
        let masks: Vec<f64> = QUALITY_FLAGS.iter().map(|(mask, _)| *mask as f64).collect();
        let meanings: Vec<&str> = QUALITY_FLAGS.iter().map(|(_, meaning)| *meaning).collect();
        attr(&mut file, "quality_flags", "flag_masks", masks);
        attr(&mut file, "quality_flags", "flag_meanings", meanings.join(" "));
        attr(&mut file, "quality_flags", "long_name", "Classification and quality flags");
        file
    }

    fn tie_geo_coordinates_file(&self) -> MemoryArrayFile {
        let (lons, lats) = self.swath.tie_point_grid(
            self.width,
            self.height,
            self.columns_per_tie_point,
            self.rows_per_tie_point,
        );
        let mut file = MemoryArrayFile::new();
        for (name, values) in [("TP_longitude", &lons), ("TP_latitude", &lats)] {
            add(
                &mut file,
                name,
                &["tie_rows", "tie_columns"],
                self.tie_point_shape(),
                to_micro_degrees(values),
            );
            attr(&mut file, name, "scale_factor", 1e-6);
        }
        file
    }

    fn tie_geometries_file(&self) -> MemoryArrayFile {
        let (w, h) = self.tie_point_size();
        let mut file = MemoryArrayFile::new();
        for (k, name) in ["OAA", "OZA", "SAA", "SZA"].into_iter().enumerate() {
            let values: Vec<u32> = (0..w * h)
                .map(|n| (10_000_000 * (k as u32 + 1)) + n as u32 * 1000)
                .collect();
            add(&mut file, name, &["tie_rows", "tie_columns"], self.tie_point_shape(), values);
            attr(&mut file, name, "scale_factor", 1e-6);
            attr(&mut file, name, "units", "degrees");
        }
        file
    }

    fn tie_meteo_file(&self) -> MemoryArrayFile {
        let (w, h) = self.tie_point_size();
        let mut profile = Vec::with_capacity(w * h * PRESSURE_LEVELS);
        for j in 0..h {
            for i in 0..w {
                for level in 0..PRESSURE_LEVELS {
                    profile.push(Self::temperature(i, j, level));
                }
            }
        }

        let mut file = MemoryArrayFile::new();
        add(
            &mut file,
            "atmospheric_temperature_profile",
            &["tie_rows", "tie_columns", "tie_pressure_levels"],
            vec![h, w, PRESSURE_LEVELS],
            profile,
        );
        attr(&mut file, "atmospheric_temperature_profile", "units", "K");

        let pressure: Vec<f32> = (0..w * h).map(|n| 1013.25 - n as f32 * 0.5).collect();
        add(&mut file, "sea_level_pressure", &["tie_rows", "tie_columns"], self.tie_point_shape(), pressure);
        let ozone = vec![0.006f32; w * h];
        add(&mut file, "total_ozone", &["tie_rows", "tie_columns"], self.tie_point_shape(), ozone);
        file
    }

    fn instrument_data_file(&self) -> MemoryArrayFile {
        let bands = self.num_bands;
        let detectors = self.width;
        let mut file = MemoryArrayFile::new();

        let detector_index: Vec<i16> = (0..self.height)
            .flat_map(|_| (0..self.width).map(|x| x as i16))
            .collect();
        add(&mut file, "detector_index", &["rows", "columns"], self.image_shape(), detector_index);

        let mut lambda0 = Vec::with_capacity(bands * detectors);
        let mut fwhm = Vec::with_capacity(bands * detectors);
        let mut solar_flux = Vec::with_capacity(bands * detectors);
        for band in 1..=bands {
            for detector in 0..detectors {
                lambda0.push(self.lambda0(band, detector));
                fwhm.push(self.band_wavelength(band).1 as f32);
                solar_flux.push(1500.0 + band as f32);
            }
        }
        for (name, values, units, long_name) in [
            ("lambda0", lambda0, "nm", "Central wavelength per detector"),
            ("FWHM", fwhm, "nm", "Bandwidth per detector"),
            ("solar_flux", solar_flux, "mW.m-2.nm-1", "Solar flux per detector"),
        ] {
            add(&mut file, name, &["bands", "detectors"], vec![bands, detectors], values);
            attr(&mut file, name, "units", units);
            attr(&mut file, name, "long_name", long_name);
        }

        let covariance: Vec<f32> = (0..bands * bands)
            .map(|k| if k / bands == k % bands { 1.0 } else { 0.0 })
            .collect();
        add(
            &mut file,
            "relative_spectral_covariance",
            &["bands", "bands"],
            vec![bands, bands],
            covariance,
        );
        attr(&mut file, "relative_spectral_covariance", "long_name", "Relative spectral covariance matrix");
        file
    }

    fn time_coordinates_file(&self) -> MemoryArrayFile {
        let stamps: Vec<i64> = (0..self.height as i64)
            .map(|row| 514_289_582_000_000 + row * 44_000)
            .collect();
        let mut file = MemoryArrayFile::new();
        add(&mut file, "time_stamp", &["rows"], vec![self.height], stamps);
        attr(&mut file, "time_stamp", "units", "microseconds since 2000-01-01 00:00:00");
        attr(&mut file, "time_stamp", "long_name", "Elapsed time since 01 Jan 2000 0h");
        file
    }
}

fn add<T>(file: &mut MemoryArrayFile, name: &str, dimensions: &[&str], shape: Vec<usize>, values: Vec<T>)
where
    Vec<T>: Into<product_common::ArrayData>,
{
    let array = Array::new(shape, values).expect("fixture array shape");
    file.add_variable(name, dimensions, array)
        .expect("fixture variable rank");
}

fn attr(file: &mut MemoryArrayFile, variable: &str, name: &str, value: impl Into<product_common::AttributeValue>) {
    file.add_attribute(variable, name, value)
        .expect("fixture attribute target");
}

/// Counts of a synthetic product's radiance band, for tests that compare
/// against a freshly generated grid.
pub fn radiance_counts(product: &SyntheticProduct, band: usize) -> Vec<u16> {
    create_count_grid(product.width, product.height, (band * 1000) as u16)
}

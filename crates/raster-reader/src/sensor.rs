//! Sensor configuration variants.
//!
//! The generic reader is parameterised by a [`SensorContext`] instead of
//! per-sensor reader types.

use std::collections::HashMap;

use geocoding::{FWD_PIXEL, FWD_TIE_POINT_BILINEAR, INV_PIXEL_QUAD_TREE, INV_TIE_POINT};
use product_common::{MetadataElement, ProductError, ProductResult};
use serde::Serialize;
use tracing::warn;

/// Valid-pixel expression of bands screened by the quality flags.
pub const INVALID_PIXEL_EXPRESSION: &str = "!quality_flags.invalid";

/// Spectral information of one band from the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandDescription {
    pub wavelength: f64,
    pub bandwidth: f64,
    /// Zero-based position in the manifest band list.
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sensor {
    Olci,
    Meris,
}

impl Sensor {
    /// Sensor of a product type such as `OL_1_EFR`.
    pub fn from_product_type(product_type: &str) -> ProductResult<Self> {
        if product_type.starts_with("OL_1_") {
            Ok(Sensor::Olci)
        } else if product_type.starts_with("ME_1_") {
            Ok(Sensor::Meris)
        } else {
            Err(ProductError::UnknownProductType(product_type.to_string()))
        }
    }

    pub fn context(&self, product_type: &str) -> SensorContext {
        match self {
            Sensor::Olci => SensorContext {
                resolution_km: if product_type.ends_with("ERR") { 1.2 } else { 0.3 },
                product_information_element: "olciProductInformation",
                band_prefix: "Oa",
                ..SensorContext::defaults(*self)
            },
            Sensor::Meris => SensorContext {
                resolution_km: if product_type.contains("_FR") { 0.3 } else { 1.2 },
                product_information_element: "merisProductInformation",
                band_prefix: "M",
                ..SensorContext::defaults(*self)
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sensor::Olci => "OLCI",
            Sensor::Meris => "MERIS",
        }
    }
}

/// Everything the reader needs to know about one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorContext {
    pub sensor: Sensor,
    pub lon_band_name: &'static str,
    pub lat_band_name: &'static str,
    pub lon_tie_point_name: &'static str,
    pub lat_tie_point_name: &'static str,
    /// Nominal ground resolution of a scene pixel.
    pub resolution_km: f64,
    pub use_pixel_geocoding: bool,
    pub pixel_forward_key: &'static str,
    pub pixel_inverse_key: &'static str,
    pub tie_point_forward_key: &'static str,
    pub tie_point_inverse_key: &'static str,
    /// Metadata element holding `bandDescriptions`.
    pub product_information_element: &'static str,
    band_prefix: &'static str,
}

impl SensorContext {
    fn defaults(sensor: Sensor) -> Self {
        Self {
            sensor,
            lon_band_name: "longitude",
            lat_band_name: "latitude",
            lon_tie_point_name: "TP_longitude",
            lat_tie_point_name: "TP_latitude",
            resolution_km: 0.3,
            use_pixel_geocoding: true,
            pixel_forward_key: FWD_PIXEL,
            pixel_inverse_key: INV_PIXEL_QUAD_TREE,
            tie_point_forward_key: FWD_TIE_POINT_BILINEAR,
            tie_point_inverse_key: INV_TIE_POINT,
            product_information_element: "",
            band_prefix: "",
        }
    }

    /// Path from the manifest metadata root to the band descriptions.
    pub fn band_description_path(&self) -> [&'static str; 2] {
        [self.product_information_element, "bandDescriptions"]
    }

    /// Key of a spectral band in the band descriptions: `Oa07_radiance` is
    /// `Oa07`. `None` for names that are not spectral bands of this sensor.
    pub fn band_key<'a>(&self, band_name: &'a str) -> Option<&'a str> {
        let key = band_name.split('_').next()?;
        let digits = key.strip_prefix(self.band_prefix)?;
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            Some(key)
        } else {
            None
        }
    }

    /// Valid-pixel expression of a band: MERIS spectral bands and OLCI
    /// uncertainty bands are screened by the `invalid` quality flag.
    pub fn valid_pixel_expression(&self, band_name: &str) -> Option<&'static str> {
        let screened = match self.sensor {
            Sensor::Meris => self.band_key(band_name).is_some(),
            Sensor::Olci => band_name.ends_with("_unc"),
        };
        screened.then_some(INVALID_PIXEL_EXPRESSION)
    }

    /// Band descriptions keyed by band key. Entries without a name or with
    /// unparseable values are logged and skipped.
    pub fn band_descriptions(&self, metadata: &MetadataElement) -> HashMap<String, BandDescription> {
        let Some(list) = metadata.element_at_path(&self.band_description_path()) else {
            return HashMap::new();
        };
        let mut descriptions = HashMap::new();
        for (index, band) in list.elements.iter().filter(|e| e.name == "band").enumerate() {
            let Some(name) = band.attribute("name").and_then(|v| v.as_text()) else {
                warn!(index, "Band description without a name");
                continue;
            };
            let number = |attribute: &str| band.attribute(attribute).and_then(|v| v.as_f64());
            let wavelength = number("centralWavelength");
            let bandwidth = number("bandwidth").or_else(|| number("bandWidth"));
            match (wavelength, bandwidth) {
                (Some(wavelength), Some(bandwidth)) => {
                    descriptions.insert(
                        name.to_string(),
                        BandDescription {
                            wavelength,
                            bandwidth,
                            index,
                        },
                    );
                }
                _ => warn!(band = name, "Band description without wavelength or bandwidth"),
            }
        }
        descriptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_from_product_type() {
        assert_eq!(Sensor::from_product_type("OL_1_EFR").unwrap(), Sensor::Olci);
        assert_eq!(Sensor::from_product_type("ME_1_RRG").unwrap(), Sensor::Meris);
        let err = Sensor::from_product_type("SL_1_RBT").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_resolution_per_product_type() {
        assert_eq!(Sensor::Olci.context("OL_1_EFR").resolution_km, 0.3);
        assert_eq!(Sensor::Olci.context("OL_1_ERR").resolution_km, 1.2);
        assert_eq!(Sensor::Meris.context("ME_1_RRG").resolution_km, 1.2);
        assert_eq!(Sensor::Meris.context("ME_1_FRG").resolution_km, 0.3);
    }

    #[test]
    fn test_default_geocoding_keys() {
        let context = Sensor::Olci.context("OL_1_EFR");
        assert!(context.use_pixel_geocoding);
        assert_eq!(context.pixel_forward_key, FWD_PIXEL);
        assert_eq!(context.pixel_inverse_key, INV_PIXEL_QUAD_TREE);
        assert_eq!(context.tie_point_forward_key, FWD_TIE_POINT_BILINEAR);
        assert_eq!(context.tie_point_inverse_key, INV_TIE_POINT);
    }

    #[test]
    fn test_band_keys() {
        let olci = Sensor::Olci.context("OL_1_EFR");
        assert_eq!(olci.band_key("Oa07_radiance"), Some("Oa07"));
        assert_eq!(olci.band_key("Oa07"), Some("Oa07"));
        assert_eq!(olci.band_key("altitude"), None);
        assert_eq!(olci.band_key("Oa_radiance"), None);

        let meris = Sensor::Meris.context("ME_1_RRG");
        assert_eq!(meris.band_key("M07_radiance"), Some("M07"));
        assert_eq!(meris.band_key("Oa07_radiance"), None);
    }

    #[test]
    fn test_valid_pixel_expressions() {
        let meris = Sensor::Meris.context("ME_1_RRG");
        assert_eq!(meris.valid_pixel_expression("M07_radiance"), Some(INVALID_PIXEL_EXPRESSION));
        assert_eq!(meris.valid_pixel_expression("quality_flags"), None);

        let olci = Sensor::Olci.context("OL_1_EFR");
        assert_eq!(olci.valid_pixel_expression("Oa07_radiance"), None);
        assert_eq!(olci.valid_pixel_expression("Oa07_radiance_unc"), Some(INVALID_PIXEL_EXPRESSION));
    }

    #[test]
    fn test_band_descriptions() {
        let mut list = MetadataElement::new("bandDescriptions");
        for (name, wavelength, bandwidth) in [("Oa01", "400.0", "15.0"), ("Oa02", "412.5", "10.0")] {
            let mut band = MetadataElement::new("band");
            band.add_attribute("name", name);
            band.add_attribute("centralWavelength", wavelength);
            band.add_attribute("bandwidth", bandwidth);
            list.add_element(band);
        }
        let mut broken = MetadataElement::new("band");
        broken.add_attribute("name", "Oa03");
        broken.add_attribute("centralWavelength", "n/a");
        list.add_element(broken);

        let mut info = MetadataElement::new("olciProductInformation");
        info.add_element(list);
        let mut root = MetadataElement::new("Manifest");
        root.add_element(info);

        let descriptions = Sensor::Olci.context("OL_1_EFR").band_descriptions(&root);
        assert_eq!(descriptions.len(), 2);
        assert_eq!(
            descriptions["Oa02"],
            BandDescription {
                wavelength: 412.5,
                bandwidth: 10.0,
                index: 1
            }
        );
        assert!(Sensor::Meris.context("ME_1_RRG").band_descriptions(&root).is_empty());
    }
}

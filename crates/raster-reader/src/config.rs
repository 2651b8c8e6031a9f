//! Configuration for the level-1 reader.

use std::path::PathBuf;

use descriptor_catalog::Catalog;
use geocoding::ComponentFactory;
use product_common::{ProductError, ProductResult};
use serde::{Deserialize, Serialize};

use crate::sensor::SensorContext;

/// Reader options. Unset options fall back to the sensor defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Build geocodings from per-pixel geolocation instead of tie points.
    #[serde(default)]
    pub use_pixel_geocoding: Option<bool>,

    #[serde(default)]
    pub pixel_forward_key: Option<String>,

    #[serde(default)]
    pub pixel_inverse_key: Option<String>,

    #[serde(default)]
    pub tie_point_forward_key: Option<String>,

    #[serde(default)]
    pub tie_point_inverse_key: Option<String>,

    /// Directory of YAML catalog files replacing the embedded catalog.
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
}

/// Geocoding choice after applying the configuration to a sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoCodingKeys {
    pub use_pixel: bool,
    pub forward: String,
    pub inverse: String,
}

impl ReaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("S3_USE_PIXEL_GEOCODING") {
            config.use_pixel_geocoding = Some(val.to_lowercase() == "true" || val == "1");
        }

        config.pixel_forward_key = lookup("S3_PIXEL_FORWARD").filter(|v| !v.is_empty());
        config.pixel_inverse_key = lookup("S3_PIXEL_INVERSE").filter(|v| !v.is_empty());
        config.tie_point_forward_key = lookup("S3_TIE_POINT_FORWARD").filter(|v| !v.is_empty());
        config.tie_point_inverse_key = lookup("S3_TIE_POINT_INVERSE").filter(|v| !v.is_empty());

        if let Some(val) = lookup("S3_CATALOG_DIR") {
            if !val.is_empty() {
                config.catalog_dir = Some(PathBuf::from(val));
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ProductResult<()> {
        let forward = [&self.pixel_forward_key, &self.tie_point_forward_key];
        for key in forward.into_iter().flatten() {
            if !ComponentFactory::is_forward_key(key) {
                return Err(ProductError::Config(format!("unknown forward coding '{}'", key)));
            }
        }

        let inverse = [&self.pixel_inverse_key, &self.tie_point_inverse_key];
        for key in inverse.into_iter().flatten() {
            if !ComponentFactory::is_inverse_key(key) {
                return Err(ProductError::Config(format!("unknown inverse coding '{}'", key)));
            }
        }

        Ok(())
    }

    /// The configured catalog, or the embedded one.
    pub fn load_catalog(&self) -> ProductResult<Catalog> {
        let catalog = match &self.catalog_dir {
            Some(dir) => Catalog::from_dir(dir)?,
            None => Catalog::builtin()?,
        };
        Ok(catalog)
    }

    /// Geocoding mode and component keys for a sensor.
    pub fn geocoding_keys(&self, context: &SensorContext) -> GeoCodingKeys {
        let use_pixel = self.use_pixel_geocoding.unwrap_or(context.use_pixel_geocoding);
        let (forward, inverse) = if use_pixel {
            (
                self.pixel_forward_key.as_deref().unwrap_or(context.pixel_forward_key),
                self.pixel_inverse_key.as_deref().unwrap_or(context.pixel_inverse_key),
            )
        } else {
            (
                self.tie_point_forward_key
                    .as_deref()
                    .unwrap_or(context.tie_point_forward_key),
                self.tie_point_inverse_key
                    .as_deref()
                    .unwrap_or(context.tie_point_inverse_key),
            )
        };
        GeoCodingKeys {
            use_pixel,
            forward: forward.to_string(),
            inverse: inverse.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::sensor::Sensor;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults_follow_sensor() {
        let config = ReaderConfig::default();
        config.validate().unwrap();
        let keys = config.geocoding_keys(&Sensor::Olci.context("OL_1_EFR"));
        assert!(keys.use_pixel);
        assert_eq!(keys.forward, "FWD_PIXEL");
        assert_eq!(keys.inverse, "INV_PIXEL_QUAD_TREE");
    }

    #[test]
    fn test_from_lookup() {
        let config = ReaderConfig::from_lookup(lookup(&[
            ("S3_USE_PIXEL_GEOCODING", "false"),
            ("S3_TIE_POINT_FORWARD", "FWD_TIE_POINT_BILINEAR"),
            ("S3_PIXEL_INVERSE", ""),
            ("S3_CATALOG_DIR", "/etc/s3/catalog"),
        ]));
        assert_eq!(config.use_pixel_geocoding, Some(false));
        assert_eq!(config.tie_point_forward_key.as_deref(), Some("FWD_TIE_POINT_BILINEAR"));
        assert_eq!(config.pixel_inverse_key, None);
        assert_eq!(config.catalog_dir, Some(PathBuf::from("/etc/s3/catalog")));

        let keys = config.geocoding_keys(&Sensor::Meris.context("ME_1_RRG"));
        assert!(!keys.use_pixel);
        assert_eq!(keys.forward, "FWD_TIE_POINT_BILINEAR");
        assert_eq!(keys.inverse, "INV_TIE_POINT");
    }

    #[test]
    fn test_pixel_key_override() {
        let config = ReaderConfig {
            pixel_forward_key: Some("FWD_PIXEL_INTERPOLATING".to_string()),
            ..Default::default()
        };
        config.validate().unwrap();
        let keys = config.geocoding_keys(&Sensor::Olci.context("OL_1_EFR"));
        assert_eq!(keys.forward, "FWD_PIXEL_INTERPOLATING");
    }

    #[test]
    fn test_validate_rejects_unknown_keys() {
        let config = ReaderConfig {
            tie_point_inverse_key: Some("INV_NOPE".to_string()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());

        let swapped = ReaderConfig {
            pixel_forward_key: Some("INV_PIXEL_QUAD_TREE".to_string()),
            ..Default::default()
        };
        assert!(swapped.validate().is_err());
    }

    #[test]
    fn test_missing_catalog_dir_is_a_configuration_error() {
        let config = ReaderConfig {
            catalog_dir: Some(PathBuf::from("/nonexistent/catalog")),
            ..Default::default()
        };
        assert!(config.load_catalog().unwrap_err().is_configuration());
    }

    #[test]
    fn test_config_deserialize() {
        let config: ReaderConfig = serde_json::from_str(r#"{"use_pixel_geocoding": true}"#).unwrap();
        assert_eq!(config.use_pixel_geocoding, Some(true));
        assert!(config.catalog_dir.is_none());
    }
}

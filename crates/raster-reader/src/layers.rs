//! Names of synthetic layers.
//!
//! Multi-layer variables are exposed as one band or grid per layer. Three
//! naming schemes exist, each `<variable><token><1-based index>`:
//!
//! - special bands: `lambda0_band_3`
//! - pressure levels: `atmospheric_temperature_profile_pressure_level_7`
//! - layered tie-point grids, with the token taken from the descriptor
//!
//! When a name happens to contain more than one token, [`LayerName::parse`]
//! tries the band scheme first.

/// Token of special-band layer names.
pub const BAND_TOKEN: &str = "_band_";

/// Token of pressure-level layer names.
pub const PRESSURE_LEVEL_TOKEN: &str = "_pressure_level_";

/// `<variable>_band_<index>`.
pub fn layer_name(variable: &str, index: usize) -> String {
    format!("{}{}{}", variable, BAND_TOKEN, index)
}

pub fn is_layer_name(name: &str) -> bool {
    name.contains(BAND_TOKEN)
}

/// Index after the last `_band_`, `None` when absent or not a number.
pub fn layer_index_from_layer_name(name: &str) -> Option<usize> {
    index_after(name, BAND_TOKEN)
}

/// Prefix before the last `_band_`, or `name` itself.
pub fn variable_name_from_layer_name(name: &str) -> &str {
    prefix_before(name, BAND_TOKEN)
}

/// `<variable>_pressure_level_<index>`.
pub fn pressure_level_name(variable: &str, index: usize) -> String {
    format!("{}{}{}", variable, PRESSURE_LEVEL_TOKEN, index)
}

pub fn is_pressure_level_name(name: &str) -> bool {
    name.contains(PRESSURE_LEVEL_TOKEN)
}

pub fn layer_index_from_pressure_level_name(name: &str) -> Option<usize> {
    index_after(name, PRESSURE_LEVEL_TOKEN)
}

pub fn variable_name_from_pressure_level_name(name: &str) -> &str {
    prefix_before(name, PRESSURE_LEVEL_TOKEN)
}

/// Layered tie-point grid name with a descriptor-specific token.
pub fn tie_point_layer_name(variable: &str, token: &str, index: usize) -> String {
    format!("{}{}{}", variable, token, index)
}

/// Layer of a tie-point grid name, `None` without a token or index.
pub fn layer_index_from_tie_point_name(name: &str, token: Option<&str>) -> Option<usize> {
    match token {
        Some(token) if !token.is_empty() => index_after(name, token),
        _ => None,
    }
}

fn index_after(name: &str, token: &str) -> Option<usize> {
    let start = name.rfind(token)? + token.len();
    name[start..].parse().ok()
}

fn prefix_before<'a>(name: &'a str, token: &str) -> &'a str {
    match name.rfind(token) {
        Some(index) => &name[..index],
        None => name,
    }
}

/// A parsed layer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerName<'a> {
    Band { variable: &'a str, index: usize },
    PressureLevel { variable: &'a str, index: usize },
    /// No layer token, or a token without a valid index.
    Plain(&'a str),
}

impl<'a> LayerName<'a> {
    pub fn parse(name: &'a str) -> Self {
        if is_layer_name(name) {
            if let Some(index) = layer_index_from_layer_name(name) {
                return LayerName::Band {
                    variable: variable_name_from_layer_name(name),
                    index,
                };
            }
        }
        if is_pressure_level_name(name) {
            if let Some(index) = layer_index_from_pressure_level_name(name) {
                return LayerName::PressureLevel {
                    variable: variable_name_from_pressure_level_name(name),
                    index,
                };
            }
        }
        LayerName::Plain(name)
    }

    /// Name of the backing variable.
    pub fn variable(&self) -> &'a str {
        match *self {
            LayerName::Band { variable, .. } | LayerName::PressureLevel { variable, .. } => variable,
            LayerName::Plain(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_name_scenario() {
        let name = layer_name("radiance_oa01", 3);
        assert_eq!(name, "radiance_oa01_band_3");
        assert!(is_layer_name(&name));
        assert_eq!(layer_index_from_layer_name(&name), Some(3));
        assert_eq!(variable_name_from_layer_name(&name), "radiance_oa01");
    }

    #[test]
    fn test_layer_name_round_trip() {
        for variable in ["lambda0", "FWHM", "solar_flux", "a", "x_band", "band_", "_"] {
            for index in [1, 2, 9, 10, 21, 1000] {
                let name = layer_name(variable, index);
                assert_eq!(variable_name_from_layer_name(&name), variable);
                assert_eq!(layer_index_from_layer_name(&name), Some(index));
            }
        }
    }

    #[test]
    fn test_not_a_layer_name() {
        assert!(!is_layer_name("Oa01_radiance"));
        assert_eq!(layer_index_from_layer_name("Oa01_radiance"), None);
        assert_eq!(variable_name_from_layer_name("Oa01_radiance"), "Oa01_radiance");
        assert_eq!(layer_index_from_layer_name("lambda0_band_x"), None);
        assert_eq!(layer_index_from_layer_name("lambda0_band_"), None);
    }

    #[test]
    fn test_last_token_wins() {
        let name = "my_band_var_band_4";
        assert_eq!(layer_index_from_layer_name(name), Some(4));
        assert_eq!(variable_name_from_layer_name(name), "my_band_var");
    }

    #[test]
    fn test_pressure_level_names() {
        let name = pressure_level_name("atmospheric_temperature_profile", 7);
        assert_eq!(name, "atmospheric_temperature_profile_pressure_level_7");
        assert!(is_pressure_level_name(&name));
        assert!(!is_layer_name(&name));
        assert_eq!(layer_index_from_pressure_level_name(&name), Some(7));
        assert_eq!(
            variable_name_from_pressure_level_name(&name),
            "atmospheric_temperature_profile"
        );
    }

    #[test]
    fn test_tie_point_layer_names() {
        let name = tie_point_layer_name("humidity", "_layer_", 12);
        assert_eq!(name, "humidity_layer_12");
        assert_eq!(layer_index_from_tie_point_name(&name, Some("_layer_")), Some(12));
        assert_eq!(layer_index_from_tie_point_name(&name, None), None);
        assert_eq!(layer_index_from_tie_point_name(&name, Some("")), None);
        assert_eq!(layer_index_from_tie_point_name("humidity", Some("_layer_")), None);
    }

    #[test]
    fn test_parse_prefers_band_scheme() {
        assert_eq!(
            LayerName::parse("lambda0_band_2"),
            LayerName::Band {
                variable: "lambda0",
                index: 2
            }
        );
        assert_eq!(
            LayerName::parse("t_pressure_level_3"),
            LayerName::PressureLevel {
                variable: "t",
                index: 3
            }
        );
        // Both tokens: the band scheme is tried first.
        let both = LayerName::parse("t_pressure_level_3_band_1");
        assert_eq!(
            both,
            LayerName::Band {
                variable: "t_pressure_level_3",
                index: 1
            }
        );
        assert_eq!(LayerName::parse("SZA"), LayerName::Plain("SZA"));
        assert_eq!(LayerName::parse("SZA").variable(), "SZA");
    }
}

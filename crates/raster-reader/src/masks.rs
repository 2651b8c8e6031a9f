//! Masks derived from band sample codings.

use std::collections::HashMap;

use crate::product::{Band, Mask, Rgb, SampleCoding};

/// Transparency of generated masks.
pub const MASK_TRANSPARENCY: f64 = 0.5;

const PALETTE: [Rgb; 12] = [
    Rgb::new(0, 0, 255),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(255, 255, 0),
    Rgb::new(255, 165, 0),
    Rgb::new(128, 0, 128),
    Rgb::new(0, 128, 128),
    Rgb::new(165, 42, 42),
    Rgb::new(128, 128, 0),
    Rgb::new(255, 192, 203),
];

/// Hands out palette colors, the same one for every use of a sample name.
#[derive(Debug, Default)]
pub struct ColorProvider {
    assigned: HashMap<String, Rgb>,
}

impl ColorProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color of `sample_name`; new names take the next palette entry.
    pub fn color(&mut self, sample_name: &str) -> Rgb {
        let next = PALETTE[self.assigned.len() % PALETTE.len()];
        *self
            .assigned
            .entry(sample_name.to_string())
            .or_insert(next)
    }
}

/// Masks for the samples of a band's coding.
///
/// Bands named `*_index` and samples named `spare` get no masks.
pub fn masks_for_band(band: &Band, colors: &mut ColorProvider) -> Vec<Mask> {
    let Some(coding) = band.sample_coding.as_ref() else {
        return Vec::new();
    };
    if band.name.ends_with("_index") {
        return Vec::new();
    }

    coding
        .samples()
        .iter()
        .filter(|sample| sample.name != "spare")
        .map(|sample| {
            let expression = match coding {
                SampleCoding::Flags(_) => format!("{}.{}", band.name, sample.name),
                SampleCoding::Index(_) => format!("{} == {}", band.name, sample.value),
            };
            Mask {
                name: format!("{}_{}", band.name, sample.name),
                expression,
                description: format!("{} of {}", sample.name, band.name),
                color: colors.color(&sample.name),
                transparency: MASK_TRANSPARENCY,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Sample;
    use product_common::DataType;

    fn sample(name: &str, value: i64) -> Sample {
        Sample {
            name: name.to_string(),
            value,
        }
    }

    fn band(name: &str, coding: SampleCoding) -> Band {
        let mut band = Band::new(name, DataType::UInt32, 4, 4);
        band.sample_coding = Some(coding);
        band
    }

    #[test]
    fn test_flag_masks() {
        let band = band(
            "quality_flags",
            SampleCoding::Flags(vec![sample("land", 1), sample("spare", 2), sample("bright", 4)]),
        );
        let masks = masks_for_band(&band, &mut ColorProvider::new());
        let names: Vec<&str> = masks.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["quality_flags_land", "quality_flags_bright"]);
        assert_eq!(masks[0].expression, "quality_flags.land");
        assert_eq!(masks[0].transparency, 0.5);
    }

    #[test]
    fn test_index_masks() {
        let band1 = band("classification", SampleCoding::Index(vec![sample("clear", 0), sample("cloud", 3)]));
        let masks = masks_for_band(&band1, &mut ColorProvider::new());
        assert_eq!(masks[1].name, "classification_cloud");
        assert_eq!(masks[1].expression, "classification == 3");

        let band2 = band("surface_type", SampleCoding::Index(vec![sample("no_data", -1)]));
        assert_eq!(masks_for_band(&band2, &mut ColorProvider::new())[0].expression, "surface_type == -1");
    }

    #[test]
    fn test_index_bands_are_skipped() {
        let band = band("detector_index", SampleCoding::Index(vec![sample("first", 0)]));
        assert!(masks_for_band(&band, &mut ColorProvider::new()).is_empty());
        assert!(masks_for_band(&Band::new("altitude", DataType::Int16, 4, 4), &mut ColorProvider::new()).is_empty());
    }

    #[test]
    fn test_colors_are_stable_per_sample_name() {
        let mut colors = ColorProvider::new();
        let land = colors.color("land");
        let water = colors.color("water");
        assert_ne!(land, water);
        assert_eq!(colors.color("land"), land);

        let mut other = ColorProvider::new();
        assert_eq!(other.color("land"), land);
    }
}

//! Interpretation of CF attributes on backing variables.

use array_store::VariableInfo;
use product_common::{Scaling, VariableDescriptor};
use tracing::warn;

use crate::product::{Sample, SampleCoding};

pub const SCALE_FACTOR: &str = "scale_factor";
pub const ADD_OFFSET: &str = "add_offset";
pub const FILL_VALUE: &str = "_FillValue";
pub const FLAG_MASKS: &str = "flag_masks";
pub const FLAG_VALUES: &str = "flag_values";
pub const FLAG_MEANINGS: &str = "flag_meanings";
pub const UNITS: &str = "units";
pub const LONG_NAME: &str = "long_name";

/// Scaling of a variable. Descriptor hints take precedence over attributes.
pub fn scaling_of(descriptor: &VariableDescriptor, info: Option<&VariableInfo>) -> Scaling {
    let attribute = |name: &str| info.and_then(|i| i.attribute_f64(name));
    let factor = descriptor
        .scale_factor
        .or_else(|| attribute(SCALE_FACTOR))
        .unwrap_or(1.0);
    let offset = descriptor
        .add_offset
        .or_else(|| attribute(ADD_OFFSET))
        .unwrap_or(0.0);
    Scaling::new(factor, offset).with_fill_value(attribute(FILL_VALUE))
}

/// Sample coding from `flag_masks`/`flag_values` and `flag_meanings`.
///
/// Malformed attributes are logged and yield `None`.
pub fn sample_coding_of(info: &VariableInfo) -> Option<SampleCoding> {
    let (values, is_flags) = match (info.attribute(FLAG_MASKS), info.attribute(FLAG_VALUES)) {
        (Some(masks), _) => (masks, true),
        (None, Some(values)) => (values, false),
        (None, None) => return None,
    };
    let meanings = match info.attribute_text(FLAG_MEANINGS) {
        Some(text) => text.split_whitespace().collect::<Vec<_>>(),
        None => {
            warn!(variable = %info.name, "Flag values without flag_meanings");
            return None;
        }
    };
    let Some(values) = values.as_f64_vec() else {
        warn!(variable = %info.name, "Flag values are not numeric");
        return None;
    };
    if values.len() != meanings.len() {
        warn!(
            variable = %info.name,
            values = values.len(),
            meanings = meanings.len(),
            "Flag values and meanings differ in length"
        );
        return None;
    }

    let samples = meanings
        .into_iter()
        .zip(values)
        .map(|(name, value)| Sample {
            name: name.to_string(),
            value: value as i64,
        })
        .collect();
    Some(if is_flags {
        SampleCoding::Flags(samples)
    } else {
        SampleCoding::Index(samples)
    })
}

//! In-memory n-dimensional arrays decoded from backing files.
//!
//! Arrays are row-major. A [`section`](Array::section) cuts an
//! `(origin, length, stride)` box out of an array and fails with a range
//! error instead of clamping when the box leaves the array.

use num_traits::AsPrimitive;

use crate::descriptor::DataType;
use crate::error::{ProductError, ProductResult};

/// Typed sample storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Evaluate `$body` with `$values` bound to the inner vector of any variant.
macro_rules! with_values {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($values) => $body,
            ArrayData::UInt8($values) => $body,
            ArrayData::Int16($values) => $body,
            ArrayData::UInt16($values) => $body,
            ArrayData::Int32($values) => $body,
            ArrayData::UInt32($values) => $body,
            ArrayData::Int64($values) => $body,
            ArrayData::UInt64($values) => $body,
            ArrayData::Float32($values) => $body,
            ArrayData::Float64($values) => $body,
        }
    };
}

/// Like `with_values!`, but wraps the result back into the same variant.
macro_rules! map_values {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($values) => ArrayData::Int8($body),
            ArrayData::UInt8($values) => ArrayData::UInt8($body),
            ArrayData::Int16($values) => ArrayData::Int16($body),
            ArrayData::UInt16($values) => ArrayData::UInt16($body),
            ArrayData::Int32($values) => ArrayData::Int32($body),
            ArrayData::UInt32($values) => ArrayData::UInt32($body),
            ArrayData::Int64($values) => ArrayData::Int64($body),
            ArrayData::UInt64($values) => ArrayData::UInt64($body),
            ArrayData::Float32($values) => ArrayData::Float32($body),
            ArrayData::Float64($values) => ArrayData::Float64($body),
        }
    };
}

macro_rules! impl_from_vec {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for ArrayData {
                fn from(values: Vec<$ty>) -> Self {
                    ArrayData::$variant(values)
                }
            }
        )*
    };
}

impl_from_vec!(
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);

impl ArrayData {
    pub fn data_type(&self) -> DataType {
        match self {
            ArrayData::Int8(_) => DataType::Int8,
            ArrayData::UInt8(_) => DataType::UInt8,
            ArrayData::Int16(_) => DataType::Int16,
            ArrayData::UInt16(_) => DataType::UInt16,
            ArrayData::Int32(_) => DataType::Int32,
            ArrayData::UInt32(_) => DataType::UInt32,
            ArrayData::Int64(_) => DataType::Int64,
            ArrayData::UInt64(_) => DataType::UInt64,
            ArrayData::Float32(_) => DataType::Float32,
            ArrayData::Float64(_) => DataType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        with_values!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get one sample widened to f64.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        with_values!(self, values => values.get(index).map(|&v| AsPrimitive::<f64>::as_(v)))
    }

    /// All samples widened to f64.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_values!(self, values => values.iter().map(|&v| AsPrimitive::<f64>::as_(v)).collect())
    }

    /// All samples converted to f32.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        with_values!(self, values => values.iter().map(|&v| AsPrimitive::<f32>::as_(v)).collect())
    }

    /// The first `len` samples, or all of them when shorter.
    pub fn truncated(&self, len: usize) -> ArrayData {
        map_values!(self, values => values[..len.min(values.len())].to_vec())
    }

    /// Repeat the samples until `len` samples exist; the last copy is cut short.
    pub fn repeated_to(&self, len: usize) -> ArrayData {
        map_values!(self, values => repeat_values(values, len))
    }
}

fn repeat_values<T: Copy>(line: &[T], len: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(len);
    if line.is_empty() {
        return out;
    }
    while out.len() < len {
        let to_copy = line.len().min(len - out.len());
        out.extend_from_slice(&line[..to_copy]);
    }
    out
}

/// Linear transform from encoded to physical values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub factor: f64,
    pub offset: f64,
    /// Encoded value that marks missing samples; becomes NaN when scaled.
    pub fill_value: Option<f64>,
}

impl Default for Scaling {
    fn default() -> Self {
        Self {
            factor: 1.0,
            offset: 0.0,
            fill_value: None,
        }
    }
}

impl Scaling {
    pub fn new(factor: f64, offset: f64) -> Self {
        Self {
            factor,
            offset,
            fill_value: None,
        }
    }

    pub fn with_fill_value(mut self, fill_value: Option<f64>) -> Self {
        self.fill_value = fill_value;
        self
    }

    /// True when applying this scaling changes nothing.
    pub fn is_identity(&self) -> bool {
        self.factor == 1.0 && self.offset == 0.0 && self.fill_value.is_none()
    }

    #[inline]
    pub fn apply(&self, raw: f64) -> f64 {
        match self.fill_value {
            Some(fill) if raw == fill => f64::NAN,
            _ => raw * self.factor + self.offset,
        }
    }
}

/// A fully decoded n-dimensional array.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    shape: Vec<usize>,
    data: ArrayData,
}

impl Array {
    /// Create an array, checking that the shape matches the sample count.
    pub fn new(shape: Vec<usize>, data: impl Into<ArrayData>) -> ProductResult<Self> {
        let data = data.into();
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(ProductError::Format(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the sample at an n-dimensional index widened to f64.
    pub fn value_at(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.rank() || index.iter().zip(&self.shape).any(|(&i, &d)| i >= d) {
            return None;
        }
        let flat = index
            .iter()
            .zip(&self.shape)
            .fold(0usize, |acc, (&i, &d)| acc * d + i);
        self.data.get_f64(flat)
    }

    /// Cut a strided box out of this array.
    ///
    /// Each axis takes `lengths[axis]` source elements starting at
    /// `origin[axis]`, keeping every `strides[axis]`-th one, so the output
    /// extent is `ceil(length / stride)`. Boxes that leave the array fail.
    pub fn section(&self, origin: &[usize], lengths: &[usize], strides: &[usize]) -> ProductResult<Array> {
        let rank = self.rank();
        if origin.len() != rank || lengths.len() != rank || strides.len() != rank {
            return Err(ProductError::range(
                format!("{}-dimensional section", origin.len()),
                &self.shape,
            ));
        }

        for axis in 0..rank {
            let (o, l, s) = (origin[axis], lengths[axis], strides[axis]);
            let out_of_range = o.checked_add(l).map_or(true, |end| end > self.shape[axis]);
            if s == 0 || l == 0 || out_of_range {
                return Err(ProductError::range(
                    format!("axis {}: offset {}, length {}, stride {}", axis, o, l, s),
                    &self.shape,
                ));
            }
        }

        let out_shape: Vec<usize> = lengths
            .iter()
            .zip(strides)
            .map(|(&l, &s)| l.div_ceil(s))
            .collect();

        if rank == 0 || out_shape == self.shape {
            return Ok(Array {
                shape: out_shape,
                data: self.data.clone(),
            });
        }

        let data = map_values!(&self.data, values => section_values(values, &self.shape, origin, &out_shape, strides));
        Ok(Array {
            shape: out_shape,
            data,
        })
    }

    /// Apply a scaling to every sample.
    ///
    /// 8/16-bit integers and f32 scale to f32; wider types scale to f64 so
    /// that e.g. micro-degree coordinates keep their precision.
    pub fn scaled(&self, scaling: &Scaling) -> Array {
        if scaling.is_identity() {
            return self.clone();
        }
        let data = match self.data_type() {
            DataType::Int8 | DataType::UInt8 | DataType::Int16 | DataType::UInt16 | DataType::Float32 => {
                ArrayData::Float32(with_values!(&self.data, values => values
                    .iter()
                    .map(|&v| scaling.apply(AsPrimitive::<f64>::as_(v)) as f32)
                    .collect::<Vec<f32>>()))
            }
            _ => ArrayData::Float64(with_values!(&self.data, values => values
                .iter()
                .map(|&v| scaling.apply(AsPrimitive::<f64>::as_(v)))
                .collect::<Vec<f64>>())),
        };
        Array {
            shape: self.shape.clone(),
            data,
        }
    }
}

fn section_values<T: Copy>(
    src: &[T],
    shape: &[usize],
    origin: &[usize],
    out_shape: &[usize],
    strides: &[usize],
) -> Vec<T> {
    let rank = shape.len();
    let last = rank - 1;

    let mut src_strides = vec![1usize; rank];
    for axis in (0..last).rev() {
        src_strides[axis] = src_strides[axis + 1] * shape[axis + 1];
    }

    let total: usize = out_shape.iter().product();
    let row_len = out_shape[last];
    let mut out = Vec::with_capacity(total);
    let mut outer = vec![0usize; last];

    loop {
        let base = (0..last)
            .map(|a| (origin[a] + outer[a] * strides[a]) * src_strides[a])
            .sum::<usize>()
            + origin[last];

        if strides[last] == 1 {
            out.extend_from_slice(&src[base..base + row_len]);
        } else {
            out.extend((0..row_len).map(|i| src[base + i * strides[last]]));
        }

        let mut axis = last;
        loop {
            if axis == 0 {
                return out;
            }
            axis -= 1;
            outer[axis] += 1;
            if outer[axis] < out_shape[axis] {
                break;
            }
            outer[axis] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(height: usize, width: usize) -> Array {
        let values: Vec<i16> = (0..(height * width) as i16).collect();
        Array::new(vec![height, width], values).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let result = Array::new(vec![2, 3], vec![1u8, 2, 3]);
        assert!(matches!(result, Err(ProductError::Format(_))));
    }

    #[test]
    fn test_section_window() {
        let array = ramp(4, 5);
        let section = array.section(&[1, 2], &[2, 3], &[1, 1]).unwrap();
        assert_eq!(section.shape(), &[2, 3]);
        assert_eq!(section.data(), &ArrayData::Int16(vec![7, 8, 9, 12, 13, 14]));
    }

    #[test]
    fn test_section_strided() {
        let array = ramp(4, 5);
        let section = array.section(&[0, 0], &[4, 5], &[2, 2]).unwrap();
        assert_eq!(section.shape(), &[2, 3]);
        assert_eq!(section.data(), &ArrayData::Int16(vec![0, 2, 4, 10, 12, 14]));
    }

    #[test]
    fn test_section_full_extent_matches_source() {
        let array = ramp(3, 7);
        let section = array.section(&[0, 0], &[3, 7], &[1, 1]).unwrap();
        assert_eq!(section, array);
    }

    #[test]
    fn test_section_layer_of_3d() {
        // shape (y=2, x=2, layer=3), value = 100*y + 10*x + layer
        let mut values = Vec::new();
        for y in 0..2 {
            for x in 0..2 {
                for l in 0..3 {
                    values.push((100 * y + 10 * x + l) as f32);
                }
            }
        }
        let array = Array::new(vec![2, 2, 3], values).unwrap();
        let layer = array.section(&[0, 0, 2], &[2, 2, 1], &[1, 1, 1]).unwrap();
        assert_eq!(layer.shape(), &[2, 2, 1]);
        assert_eq!(layer.data(), &ArrayData::Float32(vec![2.0, 12.0, 102.0, 112.0]));
    }

    #[test]
    fn test_section_out_of_range() {
        let array = ramp(50, 100);
        let err = array.section(&[1, 0], &[50, 100], &[1, 1]).unwrap_err();
        assert!(err.is_range());

        let err = array.section(&[0, 0], &[10, 10], &[0, 1]).unwrap_err();
        assert!(err.is_range());

        let err = array.section(&[0, 0, 0], &[1, 1, 1], &[1, 1, 1]).unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn test_scaled_narrow_to_f32() {
        let array = Array::new(vec![3], vec![10u16, 20, 65535]).unwrap();
        let scaling = Scaling::new(0.5, 1.0).with_fill_value(Some(65535.0));
        let scaled = array.scaled(&scaling);
        match scaled.data() {
            ArrayData::Float32(values) => {
                assert_eq!(values[0], 6.0);
                assert_eq!(values[1], 11.0);
                assert!(values[2].is_nan());
            }
            other => panic!("expected f32 data, got {:?}", other.data_type()),
        }
    }

    #[test]
    fn test_scaled_wide_to_f64() {
        let array = Array::new(vec![2], vec![12_345_678i32, -179_999_999]).unwrap();
        let scaled = array.scaled(&Scaling::new(1e-6, 0.0));
        let values = scaled.data().to_f64_vec();
        assert!((values[0] - 12.345678).abs() < 1e-9);
        assert!((values[1] + 179.999999).abs() < 1e-9);
        assert_eq!(scaled.data_type(), DataType::Float64);
    }

    #[test]
    fn test_identity_scaling_keeps_raw_type() {
        let array = ramp(2, 2);
        assert_eq!(array.scaled(&Scaling::default()), array);
    }

    #[test]
    fn test_repeated_to_truncates_last_copy() {
        let line = ArrayData::Float32(vec![1.0, 2.0, 3.0]);
        assert_eq!(
            line.repeated_to(7),
            ArrayData::Float32(vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0])
        );
        assert_eq!(line.repeated_to(0), ArrayData::Float32(vec![]));
    }

    #[test]
    fn test_value_at() {
        let array = ramp(4, 5);
        assert_eq!(array.value_at(&[2, 3]), Some(13.0));
        assert_eq!(array.value_at(&[4, 0]), None);
    }
}

//! Raster windows for extraction requests.

use serde::{Deserialize, Serialize};

use crate::error::{ProductError, ProductResult};

/// A strided window over a 2-D raster, optionally on one layer of a 3-D one.
///
/// `width` and `height` are source extents; the number of samples returned
/// per axis is `ceil(extent / stride)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterWindow {
    pub x_offset: usize,
    pub y_offset: usize,
    pub width: usize,
    pub height: usize,
    pub x_stride: usize,
    pub y_stride: usize,
    /// Zero-based index along the third dimension; `None` reads a 2-D array.
    pub layer: Option<usize>,
}

impl RasterWindow {
    /// Create a stride-1 window, rejecting empty extents.
    pub fn new(x_offset: usize, y_offset: usize, width: usize, height: usize) -> ProductResult<Self> {
        Self {
            x_offset,
            y_offset,
            width,
            height,
            x_stride: 1,
            y_stride: 1,
            layer: None,
        }
        .validated()
    }

    /// Window covering a full `width` x `height` raster.
    pub fn full(width: usize, height: usize) -> ProductResult<Self> {
        Self::new(0, 0, width, height)
    }

    pub fn with_stride(mut self, x_stride: usize, y_stride: usize) -> ProductResult<Self> {
        self.x_stride = x_stride;
        self.y_stride = y_stride;
        self.validated()
    }

    pub fn with_layer(mut self, layer: usize) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Check the window invariants: non-empty extents and strides >= 1.
    pub fn validated(self) -> ProductResult<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(ProductError::InvalidWindow(format!(
                "empty extent {}x{}",
                self.width, self.height
            )));
        }
        if self.x_stride == 0 || self.y_stride == 0 {
            return Err(ProductError::InvalidWindow(format!(
                "stride must be >= 1, got ({}, {})",
                self.x_stride, self.y_stride
            )));
        }
        Ok(self)
    }

    /// Samples per output row.
    pub fn output_width(&self) -> usize {
        self.width.div_ceil(self.x_stride)
    }

    /// Output rows.
    pub fn output_height(&self) -> usize {
        self.height.div_ceil(self.y_stride)
    }

    /// Total samples returned for this window.
    pub fn output_len(&self) -> usize {
        self.output_width() * self.output_height()
    }

    /// Section arguments `(origin, lengths, strides)` in `[y, x(, layer)]` order.
    pub fn section_spec(&self) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        match self.layer {
            Some(layer) => (
                vec![self.y_offset, self.x_offset, layer],
                vec![self.height, self.width, 1],
                vec![self.y_stride, self.x_stride, 1],
            ),
            None => (
                vec![self.y_offset, self.x_offset],
                vec![self.height, self.width],
                vec![self.y_stride, self.x_stride],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_validation() {
        assert!(RasterWindow::new(0, 0, 0, 10).is_err());
        assert!(RasterWindow::new(0, 0, 10, 0).is_err());
        assert!(RasterWindow::full(10, 10).unwrap().with_stride(0, 1).is_err());
        assert!(RasterWindow::new(5, 5, 1, 1).is_ok());
    }

    #[test]
    fn test_output_size_rounds_up() {
        let window = RasterWindow::full(10, 7).unwrap().with_stride(3, 2).unwrap();
        assert_eq!(window.output_width(), 4);
        assert_eq!(window.output_height(), 4);
        assert_eq!(window.output_len(), 16);
    }

    #[test]
    fn test_section_spec() {
        let window = RasterWindow::new(3, 4, 10, 20).unwrap();
        let (origin, lengths, strides) = window.section_spec();
        assert_eq!(origin, vec![4, 3]);
        assert_eq!(lengths, vec![20, 10]);
        assert_eq!(strides, vec![1, 1]);

        let layered = window.with_layer(2);
        let (origin, lengths, strides) = layered.section_spec();
        assert_eq!(origin, vec![4, 3, 2]);
        assert_eq!(lengths, vec![20, 10, 1]);
        assert_eq!(strides, vec![1, 1, 1]);
    }
}

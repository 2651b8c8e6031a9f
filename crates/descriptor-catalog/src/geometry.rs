//! Resolution of descriptor geometry against a product manifest.

use product_common::{
    Manifest, ProductDescriptor, ProductError, ProductResult, ResolvedGeometry, VariableDescriptor,
};
use tracing::trace;

/// Size of a tie-point grid covering a `full_width` x `full_height` raster.
pub fn tie_point_grid_size(
    full_width: usize,
    full_height: usize,
    subsampling_x: usize,
    subsampling_y: usize,
) -> (usize, usize) {
    (
        full_width.div_ceil(subsampling_x),
        full_height.div_ceil(subsampling_y),
    )
}

fn lookup_dimension(
    manifest: &dyn Manifest,
    xpath: Option<&str>,
    what: &str,
    variable: &str,
) -> ProductResult<usize> {
    let xpath = xpath.ok_or_else(|| {
        ProductError::InvalidDescriptor(format!("'{}' has no {} and no xpath for it", variable, what))
    })?;
    let value = manifest.xpath_int(xpath)?;
    trace!(variable, what, xpath, value, "Resolved dimension from manifest");
    usize::try_from(value)
        .map_err(|_| ProductError::Manifest(format!("negative {} {} at {}", what, value, xpath)))
}

fn known(value: i32) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Resolve width, height and tie-point subsampling of a variable.
///
/// Sizes missing from the descriptor are read from the manifest. For a
/// tie-point grid the looked up size is the full raster size, and the grid
/// size is derived from it and the subsampling by rounding up, whether the
/// subsampling is declared or also read from the manifest. Resolving an
/// already resolved descriptor returns its geometry unchanged.
pub fn ensure_width_and_height(
    descriptor: &VariableDescriptor,
    manifest: &dyn Manifest,
) -> ProductResult<ResolvedGeometry> {
    let name = descriptor.name.as_str();

    let declared = match (known(descriptor.width), known(descriptor.height)) {
        (Some(w), Some(h)) => Some((w, h)),
        _ => None,
    };
    let (width, height) = match declared {
        Some(size) => size,
        None => (
            lookup_dimension(manifest, descriptor.width_xpath.as_deref(), "width", name)?,
            lookup_dimension(manifest, descriptor.height_xpath.as_deref(), "height", name)?,
        ),
    };

    if !descriptor.is_tie_point() {
        return Ok(ResolvedGeometry {
            width,
            height,
            subsampling: None,
        });
    }

    let (x, y) = match (
        known(descriptor.tp_subsampling_x),
        known(descriptor.tp_subsampling_y),
    ) {
        (Some(x), Some(y)) => (x, y),
        _ => (
            lookup_dimension(
                manifest,
                descriptor.tp_x_subsampling_xpath.as_deref(),
                "x subsampling",
                name,
            )?,
            lookup_dimension(
                manifest,
                descriptor.tp_y_subsampling_xpath.as_deref(),
                "y subsampling",
                name,
            )?,
        ),
    };
    if x == 0 || y == 0 {
        return Err(ProductError::Manifest(format!(
            "zero subsampling ({}, {}) for '{}'",
            x, y, name
        )));
    }

    let (width, height) = match declared {
        Some(size) => size,
        None => tie_point_grid_size(width, height, x, y),
    };
    Ok(ResolvedGeometry {
        width,
        height,
        subsampling: Some((x, y)),
    })
}

/// Resolve the scene raster size of a product.
pub fn ensure_product_size(
    descriptor: &ProductDescriptor,
    manifest: &dyn Manifest,
) -> ProductResult<(usize, usize)> {
    if let (Some(w), Some(h)) = (known(descriptor.width), known(descriptor.height)) {
        return Ok((w, h));
    }
    let name = descriptor.product_type.as_str();
    Ok((
        lookup_dimension(manifest, descriptor.width_xpath.as_deref(), "width", name)?,
        lookup_dimension(manifest, descriptor.height_xpath.as_deref(), "height", name)?,
    ))
}

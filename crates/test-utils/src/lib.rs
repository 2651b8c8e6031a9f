//! Shared test utilities for the product reader workspace.
//!
//! [`SyntheticProduct`] builds small OLCI and MERIS products in memory whose
//! every sample can be recomputed from its position, so tests compare reads
//! against formulas instead of stored fixtures. Real products are optional and
//! found through [`find_test_file`].
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a real product by name or return from the test.
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_real_product() {
///     let path = require_test_file!("S3A_OL_1_EFR____20160509T103945.SEN3");
///     let reader = Level1Reader::open_path(&path, ReaderConfig::default()).unwrap();
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: product '{}' not found; set TEST_DATA_DIR to run", $name);
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= epsilon` after widening both sides to `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `{} ≈ {}`\n  left: {:?}\n right: {:?}\n  diff: {:?} > {:?}",
                stringify!($left),
                stringify!($right),
                left,
                right,
                diff,
                epsilon
            );
        }
    }};
}

/// [`assert_approx_eq!`] on both members of an `(x, y)` or `(lon, lat)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_within_epsilon() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5_f32, -5.500001_f64, 0.0001);
        assert_coords_approx_eq!((10.00001, 45.0), (10.0, 45.00001), 1e-4);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_approx_eq_outside_epsilon() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_nan_is_never_approx_equal() {
        assert_approx_eq!(f64::NAN, f64::NAN, 1.0);
    }
}

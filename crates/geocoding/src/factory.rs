//! Lookup of coding components by configuration key.

use crate::error::{GeoCodingError, GeoCodingResult};
use crate::forward::{
    BilinearForward, ForwardCoding, PixelForward, FWD_PIXEL, FWD_PIXEL_INTERPOLATING,
    FWD_TIE_POINT_BILINEAR,
};
use crate::inverse::{GridSearchInverse, InverseCoding, INV_PIXEL_QUAD_TREE, INV_TIE_POINT};

pub const FORWARD_KEYS: &[&str] = &[FWD_PIXEL, FWD_PIXEL_INTERPOLATING, FWD_TIE_POINT_BILINEAR];
pub const INVERSE_KEYS: &[&str] = &[INV_PIXEL_QUAD_TREE, INV_TIE_POINT];

/// Creates forward and inverse codings from their keys.
pub struct ComponentFactory;

impl ComponentFactory {
    pub fn forward(key: &str) -> GeoCodingResult<Box<dyn ForwardCoding>> {
        match key {
            FWD_PIXEL => Ok(Box::new(PixelForward)),
            FWD_PIXEL_INTERPOLATING => Ok(Box::new(BilinearForward::pixel_interpolating())),
            FWD_TIE_POINT_BILINEAR => Ok(Box::new(BilinearForward::tie_point())),
            other => Err(GeoCodingError::UnknownComponent(other.to_string())),
        }
    }

    pub fn inverse(key: &str) -> GeoCodingResult<Box<dyn InverseCoding>> {
        match key {
            INV_PIXEL_QUAD_TREE => Ok(Box::new(GridSearchInverse::pixel_quad_tree())),
            INV_TIE_POINT => Ok(Box::new(GridSearchInverse::tie_point())),
            other => Err(GeoCodingError::UnknownComponent(other.to_string())),
        }
    }

    pub fn is_forward_key(key: &str) -> bool {
        FORWARD_KEYS.contains(&key)
    }

    pub fn is_inverse_key(key: &str) -> bool {
        INVERSE_KEYS.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_resolves() {
        for key in FORWARD_KEYS {
            assert_eq!(ComponentFactory::forward(key).unwrap().key(), *key);
        }
        for key in INVERSE_KEYS {
            assert_eq!(ComponentFactory::inverse(key).unwrap().key(), *key);
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            ComponentFactory::forward("FWD_PIXEL_NEAREST"),
            Err(GeoCodingError::UnknownComponent(_))
        ));
        assert!(!ComponentFactory::is_inverse_key(FWD_PIXEL));
        assert!(ComponentFactory::is_forward_key(FWD_TIE_POINT_BILINEAR));
    }
}

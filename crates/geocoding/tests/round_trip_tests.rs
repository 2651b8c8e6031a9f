//! Forward/inverse round trips on synthetic swaths.

use geocoding::{
    ComponentFactory, ComponentGeoCoding, GeoChecks, GeoPos, GeoRaster, PixelPos, Pole, FWD_PIXEL,
    FWD_PIXEL_INTERPOLATING, FWD_TIE_POINT_BILINEAR, INV_PIXEL_QUAD_TREE, INV_TIE_POINT,
};
use test_utils::{assert_coords_approx_eq, tie_point_grid_size, Swath};

const TOLERANCE: f64 = 0.05;

fn pixel_coding(swath: Swath, width: usize, height: usize, forward: &str) -> ComponentGeoCoding {
    let (lons, lats) = swath.pixel_grid(width, height);
    let raster = GeoRaster::pixel(lons, lats, "longitude", "latitude", width, height, 0.3).unwrap();
    ComponentGeoCoding::new(
        raster,
        ComponentFactory::forward(forward).unwrap(),
        ComponentFactory::inverse(INV_PIXEL_QUAD_TREE).unwrap(),
        GeoChecks::Poles,
    )
}

fn tie_point_coding(swath: Swath, width: usize, height: usize, cx: usize, ry: usize) -> ComponentGeoCoding {
    let (lons, lats) = swath.tie_point_grid(width, height, cx, ry);
    let (grid_width, grid_height) = tie_point_grid_size(width, height, cx, ry);
    let raster = GeoRaster::tie_point(
        lons,
        lats,
        "TP_longitude",
        "TP_latitude",
        grid_width,
        grid_height,
        width,
        height,
        0.3,
        0.0,
        0.0,
        cx as f64,
        ry as f64,
    )
    .unwrap();
    ComponentGeoCoding::new(
        raster,
        ComponentFactory::forward(FWD_TIE_POINT_BILINEAR).unwrap(),
        ComponentFactory::inverse(INV_TIE_POINT).unwrap(),
        GeoChecks::Poles,
    )
}

fn assert_round_trip(coding: &ComponentGeoCoding, pixels: &[(usize, usize)]) {
    for &(i, j) in pixels {
        let pixel = PixelPos::center_of(i, j);
        let geo = coding
            .pixel_to_geo(pixel)
            .unwrap_or_else(|| panic!("no position for pixel ({}, {})", i, j));
        let back = coding
            .geo_to_pixel(geo)
            .unwrap_or_else(|| panic!("no pixel for {:?} from ({}, {})", geo, i, j));
        assert_coords_approx_eq!((back.x, back.y), (pixel.x, pixel.y), TOLERANCE);
    }
}

#[test]
fn test_pixel_interpolating_round_trip() {
    let coding = pixel_coding(Swath::default(), 40, 30, FWD_PIXEL_INTERPOLATING);
    assert!(coding.is_pixel_based());
    assert!(!coding.check_result().needs_vector_interpolation());
    assert_round_trip(&coding, &[(0, 0), (5, 7), (20, 15), (39, 29), (12, 28)]);
}

#[test]
fn test_nearest_pixel_round_trip_returns_the_same_pixel() {
    let coding = pixel_coding(Swath::default(), 40, 30, FWD_PIXEL);
    for (i, j) in [(0, 0), (3, 4), (17, 22), (39, 29)] {
        let pixel = PixelPos::center_of(i, j);
        let geo = coding.pixel_to_geo(pixel).unwrap();
        assert_eq!(coding.geo_to_pixel(geo), Some(pixel));
    }
}

#[test]
fn test_nearest_pixel_forward_snaps_to_node() {
    let coding = pixel_coding(Swath::default(), 10, 10, FWD_PIXEL);
    let centre = coding.pixel_to_geo(PixelPos::center_of(4, 6)).unwrap();
    let off_centre = coding.pixel_to_geo(PixelPos::new(4.8, 6.2)).unwrap();
    assert_eq!(centre, off_centre);
}

#[test]
fn test_tie_point_round_trip() {
    let coding = tie_point_coding(Swath::default(), 64, 32, 8, 2);
    assert!(!coding.is_pixel_based());
    assert_eq!(coding.raster().raster_width, 8);
    assert_eq!(coding.raster().raster_height, 16);
    // Includes pixels beyond the last tie-point column.
    assert_round_trip(&coding, &[(0, 0), (10, 7), (31, 16), (60, 30), (63, 31)]);
}

#[test]
fn test_tie_point_matches_pixel_geolocation() {
    let swath = Swath::default();
    let coding = tie_point_coding(swath, 64, 32, 8, 2);
    let geo = coding.pixel_to_geo(PixelPos::new(20.5, 11.5)).unwrap();
    let (lon, lat) = swath.position(64, 32, 20.5, 11.5);
    assert_coords_approx_eq!((geo.lon, geo.lat), (lon, lat), 1e-9);
}

#[test]
fn test_antimeridian_round_trip() {
    let coding = pixel_coding(Swath::regular(179.95, 10.0, 0.01), 40, 20, FWD_PIXEL_INTERPOLATING);
    assert!(coding.check_result().crosses_antimeridian);
    assert_eq!(coding.check_result().pole, None);
    assert_round_trip(&coding, &[(2, 3), (19, 10), (21, 10), (38, 18)]);
}

#[test]
fn test_polar_round_trip() {
    let coding = tie_point_coding(Swath::polar(0.05), 48, 48, 4, 4);
    assert_eq!(coding.check_result().pole, Some(Pole::North));
    assert_round_trip(&coding, &[(5, 5), (30, 12), (40, 40), (10, 36)]);
}

#[test]
fn test_positions_outside_the_scene() {
    let coding = pixel_coding(Swath::default(), 40, 30, FWD_PIXEL_INTERPOLATING);
    assert!(coding.pixel_to_geo(PixelPos::new(-1.0, 5.0)).is_none());
    assert!(coding.pixel_to_geo(PixelPos::new(5.0, 31.0)).is_none());
    assert!(coding.pixel_to_geo(PixelPos::new(40.0, 30.0)).is_none());
    assert!(coding.pixel_to_geo(PixelPos::new(39.5, 29.5)).is_some());
    assert!(coding.geo_to_pixel(GeoPos::new(-60.0, -30.0)).is_none());
    assert!(coding.geo_to_pixel(GeoPos::new(f64::NAN, 45.0)).is_none());
}

#[test]
fn test_unknown_component_keys() {
    assert!(ComponentFactory::forward("FWD_NOPE").is_err());
    assert!(ComponentFactory::inverse(FWD_PIXEL).is_err());
}

//! Spherical Web-Mercator projection math.
//!
//! Provides conversions between geographic coordinates (longitude/latitude in
//! degrees) and fractional tile coordinates at a zoom level, plus the
//! meters-to-pixels scale factor at a given latitude.
//!
//! All functions are pure and total: out-of-range inputs are normalized or
//! clamped into the Mercator-valid range rather than rejected, so no function
//! in this module can fail.

use std::f64::consts::PI;

/// Maximum latitude representable in the Web-Mercator projection, in degrees.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Ground resolution at the equator at zoom 0, in meters per pixel.
pub const GROUND_RESOLUTION: f64 = 156_543.033_92;

/// Normalizes a longitude into `[-180, 180)`.
fn normalize_lon(lon: f64) -> f64 {
    if (-180.0..180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Converts a longitude in degrees to a fractional tile X coordinate.
///
/// The longitude is normalized into `[-180, 180)` before conversion.
#[inline]
pub fn lon_to_x(lon: f64, zoom: u8) -> f64 {
    let lon = normalize_lon(lon);
    (lon + 180.0) / 360.0 * 2.0_f64.powi(zoom as i32)
}

/// Converts a latitude in degrees to a fractional tile Y coordinate.
///
/// The latitude is clamped to `±85.0511287798` (the Mercator-valid range)
/// before conversion.
#[inline]
pub fn lat_to_y(lat: f64, zoom: u8) -> f64 {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let lat_rad = lat * PI / 180.0;
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * 2.0_f64.powi(zoom as i32)
}

/// Converts a fractional tile X coordinate back to a longitude in degrees.
///
/// Exact inverse of [`lon_to_x`] for longitudes already in `[-180, 180)`.
#[inline]
pub fn x_to_lon(x: f64, zoom: u8) -> f64 {
    x / 2.0_f64.powi(zoom as i32) * 360.0 - 180.0
}

/// Converts a fractional tile Y coordinate back to a latitude in degrees.
///
/// Exact inverse of [`lat_to_y`] for latitudes within the Mercator range.
#[inline]
pub fn y_to_lat(y: f64, zoom: u8) -> f64 {
    let n = PI * (1.0 - 2.0 * y / 2.0_f64.powi(zoom as i32));
    n.sinh().atan() * 180.0 / PI
}

/// Converts a distance in meters to a distance in pixels at the given zoom
/// and latitude.
///
/// Uses the latitude-corrected ground resolution
/// `156543.03392 · cos(lat·π/180) / 2^zoom` meters per pixel.
#[inline]
pub fn meters_to_px(meters: f64, zoom: u8, lat: f64) -> f64 {
    let meters_per_pixel =
        GROUND_RESOLUTION * (lat * PI / 180.0).cos() / 2.0_f64.powi(zoom as i32);
    meters / meters_per_pixel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_tile_center() {
        // Lon 0 / lat 0 sit in the middle of the tile grid at every zoom.
        for zoom in [0u8, 5, 10, 17] {
            let half = 2.0_f64.powi(zoom as i32) / 2.0;
            assert!((lon_to_x(0.0, zoom) - half).abs() < 1e-9);
            assert!((lat_to_y(0.0, zoom) - half).abs() < 1e-9);
        }
    }

    #[test]
    fn test_paris_at_zoom_12() {
        let x = lon_to_x(2.3522, 12);
        let y = lat_to_y(48.8566, 12);
        assert!((x - 2074.75).abs() < 1.0, "x was {}", x);
        assert!((y - 1409.30).abs() < 1.0, "y was {}", y);
    }

    #[test]
    fn test_out_of_range_longitude_is_normalized() {
        let wrapped = lon_to_x(190.0, 4);
        let direct = lon_to_x(-170.0, 4);
        assert!((wrapped - direct).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_latitude_is_clamped() {
        assert_eq!(lat_to_y(90.0, 8), lat_to_y(MAX_LATITUDE, 8));
        assert_eq!(lat_to_y(-90.0, 8), lat_to_y(-MAX_LATITUDE, 8));
    }

    #[test]
    fn test_meters_to_px_at_equator_zoom_zero() {
        // One "ground resolution" worth of meters is exactly one pixel.
        let px = meters_to_px(GROUND_RESOLUTION, 0, 0.0);
        assert!((px - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_meters_to_px_doubles_per_zoom_level() {
        let at_10 = meters_to_px(1000.0, 10, 45.0);
        let at_11 = meters_to_px(1000.0, 11, 45.0);
        assert!((at_11 / at_10 - 2.0).abs() < 1e-9);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_lon_roundtrip(
                lon in -179.999..179.999_f64,
                zoom in 0u8..=20
            ) {
                let back = x_to_lon(lon_to_x(lon, zoom), zoom);
                prop_assert!(
                    (back - lon).abs() < 1e-5,
                    "lon roundtrip failed: {} -> {}",
                    lon, back
                );
            }

            #[test]
            fn test_lat_roundtrip(
                lat in -85.0..85.0_f64,
                zoom in 0u8..=20
            ) {
                let back = y_to_lat(lat_to_y(lat, zoom), zoom);
                prop_assert!(
                    (back - lat).abs() < 1e-5,
                    "lat roundtrip failed: {} -> {}",
                    lat, back
                );
            }

            #[test]
            fn test_tile_coords_in_bounds(
                lon in -180.0..180.0_f64,
                lat in -85.0..85.0_f64,
                zoom in 0u8..=20
            ) {
                let n = 2.0_f64.powi(zoom as i32);
                let x = lon_to_x(lon, zoom);
                let y = lat_to_y(lat, zoom);
                prop_assert!(x >= 0.0 && x <= n, "x {} out of [0, {}]", x, n);
                prop_assert!(y >= 0.0 && y <= n, "y {} out of [0, {}]", y, n);
            }

            #[test]
            fn test_longitude_monotonic(
                lon1 in -180.0..-0.001_f64,
                lon2 in 0.0..180.0_f64,
                zoom in 0u8..=17
            ) {
                prop_assert!(lon_to_x(lon1, zoom) < lon_to_x(lon2, zoom));
            }

            #[test]
            fn test_latitude_antitonic(
                lat1 in 0.001..85.0_f64,
                lat2 in -85.0..0.0_f64,
                zoom in 0u8..=17
            ) {
                // Y grows southward in tile space.
                prop_assert!(lat_to_y(lat1, zoom) < lat_to_y(lat2, zoom));
            }

            #[test]
            fn test_meters_to_px_positive(
                meters in 0.001..1_000_000.0_f64,
                lat in -85.0..85.0_f64,
                zoom in 0u8..=20
            ) {
                prop_assert!(meters_to_px(meters, zoom, lat) > 0.0);
            }
        }
    }
}

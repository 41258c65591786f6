//! Great-circle distance on the spherical Earth.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance in meters between two longitude/latitude points on a sphere of
/// radius 6371 km, by the spherical law of cosines.
///
/// The cosine argument is clamped to [-1, 1]; rounding can push it just past
/// 1 for coincident or antipodal points and `acos` would return NaN.
pub fn distance_lon_lat(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> f64 {
    let lat0_rad = lat0.to_radians();
    let lat1_rad = lat1.to_radians();
    let cos_angle = lat0_rad.sin() * lat1_rad.sin()
        + lat0_rad.cos() * lat1_rad.cos() * (lon1.to_radians() - lon0.to_radians()).cos();
    EARTH_RADIUS_M * cos_angle.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_zero_distance_for_identical_points() {
        for &(lon, lat) in &[(0.0, 0.0), (-74.0, 45.5), (181.3, -89.9), (359.99, 12.0)] {
            assert_eq!(distance_lon_lat(lon, lat, lon, lat), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let d1 = distance_lon_lat(-60.0, 20.0, 47.0, 59.0);
        let d2 = distance_lon_lat(47.0, 59.0, -60.0, 20.0);
        assert_approx_eq!(f64, d1, d2, ulps = 4);
    }

    #[test]
    fn test_quarter_circumference() {
        // Pole to equator is a quarter of the great circle.
        let d = distance_lon_lat(0.0, 90.0, 0.0, 0.0);
        assert_approx_eq!(f64, d, EARTH_RADIUS_M * std::f64::consts::FRAC_PI_2, epsilon = 1.0);
    }

    #[test]
    fn test_antipodal_does_not_overflow() {
        let d = distance_lon_lat(0.0, 0.0, 180.0, 0.0);
        assert!(d.is_finite());
        assert_approx_eq!(f64, d, EARTH_RADIUS_M * std::f64::consts::PI, epsilon = 1.0);
    }
}

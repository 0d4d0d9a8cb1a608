//! Orbital-state initialization: spherical entry elements to Cartesian
//! position and velocity.
//!
//! An atmospheric-entry trajectory is most naturally parameterized by
//! radius, longitude, latitude, speed, flight-path angle, and heading. The
//! integrator wants an inertial position/velocity pair. The transform here
//! builds a North-East-Down-like local basis at the given longitude and
//! latitude, a velocity-frame basis from the flight-path angle and heading,
//! and projects a unit radial vector and unit velocity direction through
//! them.
//!
//! Both directions are pure functions with no hidden state. The transform
//! assumes the inertial and planet-fixed frames are co-aligned at the
//! evaluation instant; it is an initialization convenience, not a general
//! frame-rotation capability.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Spherical parameterization of an entry state.
///
/// Angles in radians, lengths in meters, speeds in m/s.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphericalState {
    /// Distance from the central body's center [m], > 0
    pub radius: f64,
    /// Longitude [rad]
    pub longitude: f64,
    /// Latitude [rad]
    pub latitude: f64,
    /// Inertial speed [m/s], >= 0
    pub speed: f64,
    /// Flight-path angle [rad], negative descending
    pub flight_path_angle: f64,
    /// Heading angle [rad], measured in the local horizontal plane
    pub heading: f64,
}

/// Rotation from the local (up, east, north)-style surface basis to the
/// inertial frame at the given longitude and latitude.
fn surface_basis(longitude: f64, latitude: f64) -> Matrix3<f64> {
    let (sin_lon, cos_lon) = longitude.sin_cos();
    let (sin_lat, cos_lat) = latitude.sin_cos();
    Matrix3::new(
        cos_lat * cos_lon, -sin_lon, -sin_lat * cos_lon,
        cos_lat * sin_lon, cos_lon, -sin_lat * sin_lon,
        sin_lat, 0.0, cos_lat,
    )
}

/// Rotation from the velocity frame to the surface basis, built from
/// flight-path angle and heading.
fn velocity_basis(flight_path_angle: f64, heading: f64) -> Matrix3<f64> {
    let (sin_gam, cos_gam) = flight_path_angle.sin_cos();
    let (sin_hda, cos_hda) = heading.sin_cos();
    Matrix3::new(
        cos_gam, 0.0, sin_gam,
        -sin_gam * sin_hda, cos_hda, cos_gam * sin_hda,
        -sin_gam * cos_hda, -sin_hda, cos_gam * cos_hda,
    )
}

/// Converts spherical entry elements to an inertial position/velocity pair.
///
/// # Example
///
/// ```
/// use aerocap::orbit::{spherical_to_cartesian, SphericalState};
///
/// let entry = SphericalState {
///     radius: 6_503_000.0,
///     longitude: 0.0,
///     latitude: 0.0,
///     speed: 11_200.0,
///     flight_path_angle: -0.0899,
///     heading: std::f64::consts::FRAC_PI_2,
/// };
/// let (pos, vel) = spherical_to_cartesian(&entry);
/// assert!((pos.norm() - 6_503_000.0).abs() / 6_503_000.0 < 1e-12);
/// assert!((vel.norm() - 11_200.0).abs() / 11_200.0 < 1e-12);
/// ```
pub fn spherical_to_cartesian(state: &SphericalState) -> (Vector3<f64>, Vector3<f64>) {
    let ie = surface_basis(state.longitude, state.latitude);
    let es = velocity_basis(state.flight_path_angle, state.heading);

    let pos = state.radius * (ie * Vector3::x());
    let vel = state.speed * (ie * es * Vector3::z());
    (pos, vel)
}

/// Inverse of [`spherical_to_cartesian`].
///
/// For `speed == 0` the flight-path angle and heading are indeterminate and
/// returned as zero. Flight-path angle comes back in (-pi/2, pi/2), heading
/// in (-pi, pi], so round-tripping holds for physically valid entry states.
pub fn cartesian_to_spherical(pos: &Vector3<f64>, vel: &Vector3<f64>) -> SphericalState {
    let radius = pos.norm();
    let latitude = (pos.z / radius).asin();
    let longitude = pos.y.atan2(pos.x);
    let speed = vel.norm();

    let (flight_path_angle, heading) = if speed > 0.0 {
        // Undo the surface rotation: the result is the velocity-frame image
        // of e3, [sin(gam), cos(gam) sin(hda), cos(gam) cos(hda)].
        let ie = surface_basis(longitude, latitude);
        let w = ie.transpose() * (vel / speed);
        (w.x.clamp(-1.0, 1.0).asin(), w.y.atan2(w.z))
    } else {
        (0.0, 0.0)
    };

    SphericalState {
        radius,
        longitude,
        latitude,
        speed,
        flight_path_angle,
        heading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} !~ {}", a, b);
    }

    #[test]
    fn test_equatorial_entry_magnitudes() {
        // Earth aerocapture arrival conditions.
        let entry = SphericalState {
            radius: 6_503_000.0,
            longitude: 0.0,
            latitude: 0.0,
            speed: 11_200.0,
            flight_path_angle: -0.0899,
            heading: FRAC_PI_2,
        };
        let (pos, vel) = spherical_to_cartesian(&entry);

        assert!((pos.norm() - 6_503_000.0).abs() / 6_503_000.0 < 1e-6);
        assert!((vel.norm() - 11_200.0).abs() / 11_200.0 < 1e-6);
        // At lon = lat = 0 the radial direction is inertial x.
        assert_close(pos.x, 6_503_000.0, 1e-3);
        assert_close(pos.y, 0.0, 1e-9);
        assert_close(pos.z, 0.0, 1e-9);
    }

    #[test]
    fn test_due_east_level_flight() {
        // Zero flight-path angle, heading pi/2: velocity points east (+y).
        let state = SphericalState {
            radius: 7_000_000.0,
            longitude: 0.0,
            latitude: 0.0,
            speed: 7_500.0,
            flight_path_angle: 0.0,
            heading: FRAC_PI_2,
        };
        let (_, vel) = spherical_to_cartesian(&state);
        assert_close(vel.x, 0.0, 1e-9);
        assert_close(vel.y, 7_500.0, 1e-6);
        assert_close(vel.z, 0.0, 1e-9);
    }

    #[test]
    fn test_descending_component() {
        // Negative flight-path angle pushes velocity against the radial
        // direction.
        let state = SphericalState {
            radius: 6_600_000.0,
            longitude: 0.3,
            latitude: -0.2,
            speed: 9_000.0,
            flight_path_angle: -0.1,
            heading: 1.0,
        };
        let (pos, vel) = spherical_to_cartesian(&state);
        let radial_rate = pos.normalize().dot(&vel);
        assert_close(radial_rate, 9_000.0 * (-0.1f64).sin(), 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            (6_503_000.0, 0.0, 0.0, 11_200.0, -0.0899, FRAC_PI_2),
            (3_522_200.0, 0.0, 0.0, 6_000.0, -0.174_532_9, FRAC_PI_2),
            (7_000_000.0, 1.2, -0.8, 7_800.0, 0.05, 2.4),
            (6_700_000.0, -2.9, 0.6, 100.0, -1.2, -1.9),
            (1.0e9, 3.0, 1.5, 0.5, 1.5, 0.1),
        ];

        for (r, lon, lat, u, gam, hda) in cases {
            let state = SphericalState {
                radius: r,
                longitude: lon,
                latitude: lat,
                speed: u,
                flight_path_angle: gam,
                heading: hda,
            };
            let (pos, vel) = spherical_to_cartesian(&state);
            let back = cartesian_to_spherical(&pos, &vel);

            assert_close(back.radius, r, r * 1e-12);
            assert_close(back.longitude, lon, 1e-9);
            assert_close(back.latitude, lat, 1e-9);
            assert_close(back.speed, u, u.max(1.0) * 1e-12);
            assert_close(back.flight_path_angle, gam, 1e-9);
            assert_close(back.heading, hda, 1e-9);
        }
    }

    #[test]
    fn test_zero_speed_round_trip() {
        let state = SphericalState {
            radius: 6_500_000.0,
            longitude: 0.4,
            latitude: 0.7,
            speed: 0.0,
            flight_path_angle: 0.0,
            heading: 0.0,
        };
        let (pos, vel) = spherical_to_cartesian(&state);
        assert_close(vel.norm(), 0.0, 1e-12);

        let back = cartesian_to_spherical(&pos, &vel);
        assert_close(back.radius, state.radius, 1e-3);
        assert_close(back.flight_path_angle, 0.0, 1e-12);
    }

    #[test]
    fn test_heading_wraps_at_pi() {
        // heading = pi maps to itself (atan2 returns pi, not -pi, for
        // y = +0 boundary handled by the chosen cases).
        let state = SphericalState {
            radius: 7_000_000.0,
            longitude: 0.0,
            latitude: 0.0,
            speed: 5_000.0,
            flight_path_angle: 0.0,
            heading: PI - 1e-6,
        };
        let (pos, vel) = spherical_to_cartesian(&state);
        let back = cartesian_to_spherical(&pos, &vel);
        assert_close(back.heading, PI - 1e-6, 1e-9);
    }
}

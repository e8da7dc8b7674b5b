//! Diurnal parallax correction for ecliptic coordinates.
//!
//! Converts geocentric ecliptic longitude/latitude into the values seen by an
//! observer on the Earth's surface (Meeus, Astronomical Algorithms, ch. 11,
//! 22 and 40). The observer is always an argument; nothing is cached.

use std::f64::consts::{PI, TAU};

use crate::ephemeris::types::{Coordinates, RawPosition};

const J2000_JD: f64 = 2_451_545.0;

/// Arcseconds to radians: 1″ = π / (180 × 3600).
const ARCSEC_TO_RAD: f64 = PI / (180.0 * 3600.0);

/// Equatorial horizontal parallax of a body at 1 AU.
const SOLAR_PARALLAX_ARCSEC: f64 = 8.794;

/// Polar over equatorial Earth radius (b/a).
const EARTH_FLATTENING_RATIO: f64 = 0.996_647_19;

const EARTH_EQUATORIAL_RADIUS_M: f64 = 6_378_140.0;

/// Greenwich mean sidereal time in radians, [0, 2π).
///
/// ERA plus the Capitaine et al. 2003 polynomial; UT is used for UT1.
pub fn gmst_rad(jd_ut: f64) -> f64 {
    let du = jd_ut - J2000_JD;
    let era = TAU * (0.779_057_273_264_0 + 1.002_737_811_911_354_6 * du);
    let t = du / 36525.0;
    let poly_arcsec = 0.014506 + 4612.156534 * t + 1.3915817 * t * t - 0.00000044 * t * t * t;
    (era + poly_arcsec * ARCSEC_TO_RAD).rem_euclid(TAU)
}

/// Mean obliquity of the ecliptic in radians (Meeus 22.2).
pub fn mean_obliquity_rad(jd_ut: f64) -> f64 {
    let t = (jd_ut - J2000_JD) / 36525.0;
    let arcsec = 84381.448 - 46.8150 * t - 0.00059 * t * t + 0.001813 * t * t * t;
    arcsec * ARCSEC_TO_RAD
}

/// Geocentric (ρ sin φ', ρ cos φ') of the observer, in Earth radii.
fn observer_geocentric_terms(location: &Coordinates) -> (f64, f64) {
    let phi = location.latitude.to_radians();
    let u = (EARTH_FLATTENING_RATIO * phi.tan()).atan();
    let h = location.altitude / EARTH_EQUATORIAL_RADIUS_M;
    let rho_sin = EARTH_FLATTENING_RATIO * u.sin() + h * phi.sin();
    let rho_cos = u.cos() + h * phi.cos();
    (rho_sin, rho_cos)
}

/// Apply diurnal parallax to a geocentric position.
///
/// Positions with no distance (computed points) are returned unchanged.
pub fn apply_parallax(position: RawPosition, jd_ut: f64, location: &Coordinates) -> RawPosition {
    if position.distance <= 0.0 {
        return position;
    }

    let sin_pi = (SOLAR_PARALLAX_ARCSEC * ARCSEC_TO_RAD).sin() / position.distance;
    let (rho_sin, rho_cos) = observer_geocentric_terms(location);
    let lst = (gmst_rad(jd_ut) + location.longitude.to_radians()).rem_euclid(TAU);
    let eps = mean_obliquity_rad(jd_ut);

    let lambda = position.longitude.to_radians();
    let beta = position.latitude.to_radians();

    let n = lambda.cos() * beta.cos() - rho_cos * sin_pi * lst.cos();
    let lambda_topo = f64::atan2(
        lambda.sin() * beta.cos()
            - sin_pi * (rho_sin * eps.sin() + rho_cos * eps.cos() * lst.sin()),
        n,
    );
    let beta_topo = (lambda_topo.cos()
        * (beta.sin() - sin_pi * (rho_sin * eps.cos() - rho_cos * eps.sin() * lst.sin()))
        / n)
        .atan();

    RawPosition {
        longitude: lambda_topo.to_degrees().rem_euclid(360.0),
        latitude: beta_topo.to_degrees(),
        ..position
    }
}

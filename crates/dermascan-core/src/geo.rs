//! Great-circle distance between two WGS84 coordinates.
//!
//! Uses the haversine formula on a sphere of mean Earth radius. Accurate to
//! roughly 0.5% against the ellipsoid, which is plenty for ranking providers
//! inside a 5 km search radius.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// IUGG mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    OutOfRange { lat: f64, lon: f64 },
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::OutOfRange`] when `lat` is outside [-90, 90],
    /// `lon` is outside [-180, 180], or either is NaN/infinite.
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        let coord = Self { lat, lon };
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::OutOfRange { lat, lon })
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Surface distance in meters between `from` and `to`.
///
/// Symmetric: `distance_meters(a, b) == distance_meters(b, a)` bit-for-bit,
/// and a point is always exactly `0.0` from itself.
///
/// # Errors
///
/// Returns [`GeoError::OutOfRange`] if either coordinate is invalid. Callers
/// ranking providers treat this as "distance unknown".
pub fn distance_meters(from: Coordinate, to: Coordinate) -> Result<f64, GeoError> {
    for c in [from, to] {
        if !c.is_valid() {
            return Err(GeoError::OutOfRange {
                lat: c.lat,
                lon: c.lon,
            });
        }
    }

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let half_dlat = (to.lat - from.lat).to_radians() / 2.0;
    let half_dlon = (to.lon - from.lon).to_radians() / 2.0;

    // Squaring the sines and multiplying the cosines commutatively keeps the
    // result independent of argument order.
    let a = half_dlat.sin().powi(2) + (lat1.cos() * lat2.cos()) * half_dlon.sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
    Ok(EARTH_RADIUS_METERS * c)
}

//! Domain record for a nearby healthcare provider.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A healthcare location returned by the directory query, ranked by distance
/// from the user.
///
/// Built once by the directory parser and never mutated afterwards; a new
/// lookup discards the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Display name from the `name` tag. Always non-blank.
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Street, city and state joined with `", "`; `None` when all are blank.
    pub address: Option<String>,
    /// Great-circle distance from the user, if it could be computed.
    pub distance_meters: Option<f64>,
}

impl ProviderRecord {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

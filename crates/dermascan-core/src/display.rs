//! Presentation helpers shared by every front end.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::provider::ProviderRecord;

/// Human-readable distance: kilometres with one decimal at or above 1 km,
/// whole metres below.
#[must_use]
pub fn format_distance(distance_meters: f64) -> String {
    if distance_meters >= 1000.0 {
        format!("{:.1} km away", distance_meters / 1000.0)
    } else {
        format!("{distance_meters:.0} m away")
    }
}

/// `geo:` URI that opens the provider in the platform's map application.
#[must_use]
pub fn maps_uri(provider: &ProviderRecord) -> String {
    let query = utf8_percent_encode(&provider.name, NON_ALPHANUMERIC);
    format!(
        "geo:{},{}?q={query}",
        provider.latitude, provider.longitude
    )
}

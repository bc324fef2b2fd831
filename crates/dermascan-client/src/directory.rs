//! Overpass `elements` payload → ranked, deduplicated provider list.
//!
//! Malformed input never errors: a bad payload yields an empty list and a bad
//! element is skipped.

use std::collections::HashSet;

use dermascan_core::{distance_meters, Coordinate, ProviderRecord};
use serde_json::Value;

/// Parse an Overpass response into providers sorted by distance from `user`.
///
/// Elements are dropped when they have no numeric `lat`/`lon`, coordinates
/// outside the valid WGS84 range, or a blank `tags.name`. Repeated elements
/// (same `type`/`id`, or same name and position when `id` is absent) keep
/// their first occurrence. The sort is stable; providers whose distance is
/// unknown come last.
#[must_use]
pub fn parse_providers(body: &str, user: Coordinate) -> Vec<ProviderRecord> {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        tracing::debug!("directory response is not JSON; treating as empty");
        return vec![];
    };

    let Some(elements) = json.get("elements").and_then(Value::as_array) else {
        tracing::debug!("directory response has no elements array; treating as empty");
        return vec![];
    };

    let mut seen = HashSet::new();
    let mut providers: Vec<ProviderRecord> = elements
        .iter()
        .filter_map(|element| {
            let record = provider_from_element(element, user)?;
            seen.insert(dedup_key(element, &record)).then_some(record)
        })
        .collect();

    providers.sort_by(|a, b| {
        let da = a.distance_meters.unwrap_or(f64::INFINITY);
        let db = b.distance_meters.unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    });

    tracing::debug!(
        elements = elements.len(),
        providers = providers.len(),
        "parsed directory response"
    );
    providers
}

fn provider_from_element(element: &Value, user: Coordinate) -> Option<ProviderRecord> {
    let lat = number_field(element, "lat")?;
    let lon = number_field(element, "lon")?;
    let position = Coordinate::new(lat, lon).ok()?;

    let tags = element.get("tags")?;
    let name = non_blank_tag(tags, "name")?.to_string();

    let parts: Vec<&str> = ["addr:street", "addr:city", "addr:state"]
        .iter()
        .filter_map(|key| raw_non_blank_tag(tags, key))
        .collect();
    let address = (!parts.is_empty()).then(|| parts.join(", "));

    Some(ProviderRecord {
        name,
        latitude: position.lat,
        longitude: position.lon,
        address,
        distance_meters: distance_meters(user, position).ok(),
    })
}

/// Numeric field that may arrive as a JSON number or a numeric string.
fn number_field(element: &Value, key: &str) -> Option<f64> {
    let value = element.get(key)?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

fn non_blank_tag<'a>(tags: &'a Value, key: &str) -> Option<&'a str> {
    tags.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Like [`non_blank_tag`] but returns the value as written.
fn raw_non_blank_tag<'a>(tags: &'a Value, key: &str) -> Option<&'a str> {
    tags.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn dedup_key(element: &Value, record: &ProviderRecord) -> String {
    match element.get("id").filter(|id| !id.is_null()) {
        Some(id) => {
            let kind = element
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("node");
            format!("{kind}/{id}")
        }
        None => format!(
            "anon/{}\x00{}\x00{}",
            record.name, record.latitude, record.longitude
        ),
    }
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;

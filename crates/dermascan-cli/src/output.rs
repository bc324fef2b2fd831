//! Plain-text rendering of lookup snapshots.

use dermascan_core::{format_distance, maps_uri};
use dermascan_session::DoctorLookupState;

/// One block per provider (name, address, distance, maps link), or the
/// state's message when there is nothing to list.
pub(crate) fn render_doctors(state: &DoctorLookupState) -> String {
    let mut lines: Vec<String> = Vec::new();
    if let Some(message) = state.error_message() {
        lines.push(message.to_string());
    }

    for (rank, provider) in state.providers.iter().enumerate() {
        lines.push(format!("{}. {}", rank + 1, provider.name));
        if let Some(address) = &provider.address {
            lines.push(format!("   {address}"));
        }
        if let Some(distance) = provider.distance_meters {
            lines.push(format!("   {}", format_distance(distance)));
        }
        lines.push(format!("   {}", maps_uri(provider)));
    }

    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

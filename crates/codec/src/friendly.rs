/// Pick the identifier to show on user-facing surfaces.
///
/// Prefers the display identifier. Records not yet backfilled fall back to
/// the internal key, truncated when it is long enough to be unwieldy in a
/// UI or support ticket.
#[must_use]
pub fn user_facing_id(internal_key: &str, display_id: Option<&str>) -> String {
    if let Some(display) = display_id {
        if !display.is_empty() {
            return display.to_string();
        }
    }

    match internal_key.get(..8) {
        Some(head) if internal_key.len() > 15 => format!("{head}..."),
        _ => internal_key.to_string(),
    }
}

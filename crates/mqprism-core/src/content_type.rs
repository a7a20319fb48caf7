//! JSON content-type detection.
//!
//! Decides whether `data` crosses the wire as a raw JSON value or as an
//! escaped string token. The rules are deliberately narrow: exactly one
//! `/`, parameters ignored, blank means JSON.

/// Returns true when a MIME string is JSON-shaped: blank, equal to
/// `application/json`, subtype `json`, or subtype ending in `+json`
/// (all case-insensitive, parameters after `;` stripped).
pub fn is_json_content_type(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }

    let essence = match trimmed.split_once(';') {
        Some((head, _params)) => head.trim(),
        None => trimmed,
    };

    if essence.eq_ignore_ascii_case("application/json") {
        return true;
    }

    // Exactly one '/', with a non-empty subtype after it.
    let mut parts = essence.split('/');
    let subtype = match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(subtype), None) => subtype,
        _ => return false,
    };
    if subtype.is_empty() {
        return false;
    }

    subtype.eq_ignore_ascii_case("json") || ends_with_ignore_case(subtype, "+json")
}

fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value
        .len()
        .checked_sub(suffix.len())
        .and_then(|start| value.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

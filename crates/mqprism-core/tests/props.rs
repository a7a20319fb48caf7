//! Property tests for the unescaper and the content-type classifier.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use proptest::prelude::*;

use mqprism_core::content_type::is_json_content_type;
use mqprism_core::pool::PoolScope;
use mqprism_core::utf8::unescape_value;

proptest! {
    /// The hand-rolled unescaper agrees with the serde_json escaper for
    /// every string value.
    #[test]
    fn unescape_inverts_json_escaping(value in "\\PC*") {
        let token = serde_json::to_string(&value).unwrap();
        let scope = PoolScope::new(true);
        let out = unescape_value(&token, &scope).unwrap();
        prop_assert_eq!(&*out, value.as_bytes());
    }

    /// Classifier matches a reference implementation of the rules.
    #[test]
    fn classifier_matches_oracle(value in "[ a-zA-Z0-9+/;=.-]{0,24}") {
        let expected = oracle(&value);
        prop_assert_eq!(is_json_content_type(&value), expected, "value={:?}", value);
    }
}

fn oracle(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    let essence = trimmed.split(';').next().unwrap_or("").trim();
    let parts: Vec<&str> = essence.split('/').collect();
    if parts.len() != 2 {
        return false;
    }
    let subtype = parts[1].to_ascii_lowercase();
    if subtype.is_empty() {
        return false;
    }
    essence.eq_ignore_ascii_case("application/json")
        || subtype == "json"
        || subtype.ends_with("+json")
}

//! Event-bus fan-out wrapper (rule-routed event delivery).

use chrono::DateTime;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::carrier::{EventBusMetadata, QueueMessage, QueueMetadata};
use crate::pool::PoolScope;
use crate::wrappers::{contains_token, payload_slice, UnwrappedPayload};

/// Both tokens must be present for the quick-match to accept.
const SENTINEL_DETAIL_TYPE: &[u8] = br#""detail-type""#;
const SENTINEL_DETAIL: &[u8] = br#""detail""#;

pub fn quick_match(head: &[u8]) -> bool {
    contains_token(head, SENTINEL_DETAIL_TYPE) && contains_token(head, SENTINEL_DETAIL)
}

#[derive(Debug, Deserialize)]
struct Outer<'a> {
    #[serde(rename = "detail-type")]
    detail_type: String,
    #[serde(borrow)]
    detail: &'a RawValue,
    source: String,
    time: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    resources: Vec<String>,
}

/// Full parse. `None` on anything that is not a well-formed event-bus
/// wrapper.
pub fn try_parse<'s>(
    bytes: &'s [u8],
    carrier: &QueueMessage,
    scope: &'s PoolScope,
) -> Option<UnwrappedPayload<'s>> {
    let text = std::str::from_utf8(bytes).ok()?;
    let outer: Outer<'_> = serde_json::from_str(text).ok()?;
    let time = DateTime::parse_from_rfc3339(&outer.time).ok()?;
    let inner = payload_slice(outer.detail, scope).ok()?;

    Some(UnwrappedPayload {
        inner,
        queue: QueueMetadata::from_carrier(carrier),
        notification: None,
        event_bus: Some(EventBusMetadata {
            event_id: outer.id,
            detail_type: outer.detail_type,
            source: outer.source,
            time,
            account: outer.account,
            region: outer.region,
            resources: outer.resources,
        }),
    })
}

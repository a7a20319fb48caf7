//! Notification fan-out wrapper (topic-based pub/sub delivery).

use std::collections::HashMap;

use chrono::DateTime;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::carrier::{NotificationAttribute, NotificationMetadata, QueueMessage, QueueMetadata};
use crate::pool::PoolScope;
use crate::wrappers::{contains_token, payload_slice, UnwrappedPayload};

/// Sentinel tokens checked by the quick-match scan.
const SENTINELS: [&[u8]; 3] = [br#""Type""#, br#""Notification""#, br#""TopicArn""#];

/// Cheap byte scan: at least two sentinels present in the prefix.
pub fn quick_match(head: &[u8]) -> bool {
    SENTINELS
        .iter()
        .filter(|token| contains_token(head, token))
        .count()
        >= 2
}

#[derive(Debug, Deserialize)]
struct Outer<'a> {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "TopicArn")]
    topic_arn: String,
    #[serde(rename = "MessageId")]
    message_id: String,
    #[serde(rename = "Message", borrow)]
    message: &'a RawValue,
    #[serde(rename = "Timestamp", default)]
    timestamp: Option<String>,
    #[serde(rename = "Subject", default)]
    subject: Option<String>,
    #[serde(rename = "UnsubscribeURL", default)]
    unsubscribe_url: Option<String>,
    #[serde(rename = "MessageAttributes", default)]
    attributes: HashMap<String, NotificationAttribute>,
}

/// Full parse. `None` on anything that is not a well-formed
/// notification wrapper; the chain moves on to the next parser.
pub fn try_parse<'s>(
    bytes: &'s [u8],
    carrier: &QueueMessage,
    scope: &'s PoolScope,
) -> Option<UnwrappedPayload<'s>> {
    let text = std::str::from_utf8(bytes).ok()?;
    let outer: Outer<'_> = serde_json::from_str(text).ok()?;
    if outer.kind != "Notification" {
        return None;
    }
    let timestamp = match outer.timestamp.as_deref() {
        Some(raw) => Some(DateTime::parse_from_rfc3339(raw).ok()?),
        None => None,
    };
    let inner = payload_slice(outer.message, scope).ok()?;

    Some(UnwrappedPayload {
        inner,
        queue: QueueMetadata::from_carrier(carrier),
        notification: Some(NotificationMetadata {
            topic_arn: outer.topic_arn,
            message_id: outer.message_id,
            timestamp,
            subject: outer.subject,
            unsubscribe_url: outer.unsubscribe_url,
            attributes: outer.attributes,
        }),
        event_bus: None,
    })
}

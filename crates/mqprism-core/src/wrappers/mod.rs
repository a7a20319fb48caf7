//! Outer carrier recognition and inner-payload extraction.
//!
//! Upstream fan-out services wrap the canonical envelope in their own
//! JSON object. Each wrapper pairs a cheap byte scan (`quick_match`)
//! with a full parse (`try_parse`):
//! - quick-match scans a bounded prefix for sentinel tokens; it is a
//!   routing hint only and may match sentinels nested inside values.
//! - try-parse is the authority: a borrowed JSON pass that extracts the
//!   inner payload slice and wrapper metadata, or yields `None` on any
//!   malformed input.
//!
//! The chain tries notification, then event-bus, then retries both
//! ignoring quick-match (sentinels can sit past the scan window), and
//! finally falls back to treating the body as a bare envelope.

pub mod event_bus;
pub mod notification;
pub mod queue;

use serde_json::value::RawValue;

use crate::carrier::{EventBusMetadata, NotificationMetadata, QueueMessage, QueueMetadata};
use crate::error::Result;
use crate::pool::PoolScope;
use crate::utf8::{unescape_value, Utf8Slice};

/// Default prefix length examined by quick-match scans.
pub const QUICK_MATCH_WINDOW: usize = 2048;

/// Inner payload plus whatever wrapper metadata the parse produced.
pub struct UnwrappedPayload<'a> {
    /// Bytes of the canonical envelope after unwrapping.
    pub inner: Utf8Slice<'a>,
    pub queue: QueueMetadata,
    pub notification: Option<NotificationMetadata>,
    pub event_bus: Option<EventBusMetadata>,
}

impl UnwrappedPayload<'_> {
    /// Wrapper name for log lines.
    pub fn wrapper_name(&self) -> &'static str {
        if self.notification.is_some() {
            "notification"
        } else if self.event_bus.is_some() {
            "event-bus"
        } else {
            "queue"
        }
    }
}

/// Run the wrapper chain over a carrier body. Always succeeds: the
/// queue fallback accepts any byte sequence.
pub fn unwrap_payload<'s>(
    bytes: &'s [u8],
    carrier: &QueueMessage,
    scope: &'s PoolScope,
    window: usize,
) -> UnwrappedPayload<'s> {
    let head = scan_window(bytes, window);

    let notification_hinted = notification::quick_match(head);
    if notification_hinted {
        if let Some(unwrapped) = notification::try_parse(bytes, carrier, scope) {
            return unwrapped;
        }
    }
    let event_bus_hinted = event_bus::quick_match(head);
    if event_bus_hinted {
        if let Some(unwrapped) = event_bus::try_parse(bytes, carrier, scope) {
            return unwrapped;
        }
    }

    // Safety net: sentinels may sit beyond the scan window.
    if !notification_hinted {
        if let Some(unwrapped) = notification::try_parse(bytes, carrier, scope) {
            return unwrapped;
        }
    }
    if !event_bus_hinted {
        if let Some(unwrapped) = event_bus::try_parse(bytes, carrier, scope) {
            return unwrapped;
        }
    }

    queue::parse(bytes, carrier)
}

fn scan_window(bytes: &[u8], window: usize) -> &[u8] {
    let end = bytes.len().min(window);
    bytes.get(..end).unwrap_or(bytes)
}

pub(crate) fn contains_token(haystack: &[u8], token: &[u8]) -> bool {
    if token.is_empty() || token.len() > haystack.len() {
        return false;
    }
    haystack.windows(token.len()).any(|w| w == token)
}

/// Extract the inner payload from a wrapper's payload field: a string
/// token is unescaped (pooled when escaped), an object or array is
/// captured as the exact byte slice of the value.
pub(crate) fn payload_slice<'s>(raw: &'s RawValue, scope: &'s PoolScope) -> Result<Utf8Slice<'s>> {
    let token = raw.get();
    if token.starts_with('"') {
        unescape_value(token, scope)
    } else {
        Ok(Utf8Slice::Borrowed(token.as_bytes()))
    }
}

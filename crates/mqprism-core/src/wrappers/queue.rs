//! Plain queue delivery (no outer wrapper).
//!
//! Last in the chain and infallible: the body is handed through
//! unmodified as the inner payload, with queue metadata only.

use crate::carrier::{QueueMessage, QueueMetadata};
use crate::utf8::Utf8Slice;
use crate::wrappers::UnwrappedPayload;

pub fn parse<'s>(bytes: &'s [u8], carrier: &QueueMessage) -> UnwrappedPayload<'s> {
    UnwrappedPayload {
        inner: Utf8Slice::Borrowed(bytes),
        queue: QueueMetadata::from_carrier(carrier),
        notification: None,
        event_bus: None,
    }
}

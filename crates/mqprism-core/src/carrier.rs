//! Carrier messages and per-wrapper delivery metadata.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Raw message as handed over by the queue consumer, before any
/// unwrapping. Conversion never mutates it.
#[derive(Debug, Clone, Default)]
pub struct QueueMessage {
    /// Queue-assigned message id.
    pub message_id: Option<String>,
    /// Receipt handle used to delete/extend the message.
    pub receipt_handle: Option<String>,
    /// The message body (outer envelope or wrapped payload).
    pub body: String,
    /// Queue message attributes.
    pub attributes: HashMap<String, String>,
}

/// Queue delivery metadata, populated on every received envelope.
#[derive(Debug, Clone, Default)]
pub struct QueueMetadata {
    pub message_id: Option<String>,
    pub receipt_handle: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl QueueMetadata {
    pub fn from_carrier(message: &QueueMessage) -> Self {
        QueueMetadata {
            message_id: message.message_id.clone(),
            receipt_handle: message.receipt_handle.clone(),
            attributes: message.attributes.clone(),
        }
    }
}

/// A single attribute on a notification wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationAttribute {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Metadata extracted from a notification-service wrapper.
#[derive(Debug, Clone)]
pub struct NotificationMetadata {
    pub topic_arn: String,
    pub message_id: String,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub subject: Option<String>,
    pub unsubscribe_url: Option<String>,
    pub attributes: HashMap<String, NotificationAttribute>,
}

/// Metadata extracted from an event-bus wrapper.
#[derive(Debug, Clone)]
pub struct EventBusMetadata {
    pub event_id: Option<String>,
    pub detail_type: String,
    pub source: String,
    pub time: DateTime<FixedOffset>,
    pub account: Option<String>,
    pub region: Option<String>,
    pub resources: Vec<String>,
}

//! Canonical event envelope.
//!
//! An `Envelope<M>` pairs the wire-level event metadata (id, source,
//! spec version, type id, time, content type, open metadata map) with
//! the carried application message. Publish-side envelopes are typed;
//! receive-side envelopes are materialized as `AnyEnvelope` and
//! downcast by the handler layer.

use std::any::Any;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::carrier::{EventBusMetadata, NotificationMetadata, QueueMetadata};

/// Spec version emitted on every envelope.
pub const SPEC_VERSION: &str = "1.0";

/// Content type assumed when an envelope does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// The seven property names reserved by the envelope wire format.
/// Metadata keys colliding with these are discarded on write and never
/// captured on read.
pub const RESERVED_PROPERTIES: [&str; 7] = [
    "id",
    "source",
    "specversion",
    "type",
    "time",
    "datacontenttype",
    "data",
];

/// Type-erased application message, as stored on received envelopes.
pub trait AnyMessage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AnyMessage for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

/// Canonical event envelope (v1.0 of the event spec).
pub struct Envelope<M> {
    /// Unique message id (non-empty).
    pub id: String,
    /// URI reference identifying the publisher; relative or absolute.
    pub source: Option<String>,
    /// Event spec version, `"1.0"` when emitted by this core.
    pub spec_version: String,
    /// Message type identifier resolved from the publisher mapping.
    pub type_id: String,
    /// Publish timestamp, offset-aware.
    pub time: DateTime<FixedOffset>,
    /// MIME type of `data`; absent means `application/json`.
    pub data_content_type: Option<String>,
    /// Additional top-level properties, insertion-ordered. Never contains
    /// a reserved property name.
    pub metadata: Map<String, Value>,
    /// Queue delivery metadata; populated on every received envelope.
    pub queue_metadata: Option<QueueMetadata>,
    /// Present when the payload arrived wrapped by the notification service.
    pub notification_metadata: Option<NotificationMetadata>,
    /// Present when the payload arrived wrapped by the event-bus service.
    pub event_bus_metadata: Option<EventBusMetadata>,
    /// The carried application message.
    pub message: Option<M>,
}

/// A received envelope whose message type is resolved at runtime.
pub type AnyEnvelope = Envelope<Box<dyn AnyMessage>>;

impl<M> Envelope<M> {
    /// Borrowed, message-agnostic view used by hooks and the wire writer.
    pub fn summary(&self) -> EnvelopeSummary<'_> {
        EnvelopeSummary {
            id: &self.id,
            source: self.source.as_deref(),
            spec_version: &self.spec_version,
            type_id: &self.type_id,
            time: &self.time,
            data_content_type: self.data_content_type.as_deref(),
            metadata: &self.metadata,
        }
    }

    /// Replace the message slot, keeping every other field.
    pub fn map_message<N>(self, f: impl FnOnce(Option<M>) -> Option<N>) -> Envelope<N> {
        Envelope {
            id: self.id,
            source: self.source,
            spec_version: self.spec_version,
            type_id: self.type_id,
            time: self.time,
            data_content_type: self.data_content_type,
            metadata: self.metadata,
            queue_metadata: self.queue_metadata,
            notification_metadata: self.notification_metadata,
            event_bus_metadata: self.event_bus_metadata,
            message: f(self.message),
        }
    }
}

impl AnyEnvelope {
    /// Recover the concrete message type. Returns the envelope unchanged
    /// when the message is absent or of a different type.
    pub fn downcast<M: Any + Send + Sync>(self) -> std::result::Result<Envelope<M>, Self> {
        // Call through the trait object: the blanket impl also covers
        // `Box<dyn AnyMessage>` itself, which would probe the box.
        if !matches!(&self.message, Some(m) if (**m).as_any().is::<M>()) {
            return Err(self);
        }
        Ok(self.map_message(|m| {
            m.and_then(|b| b.into_any().downcast::<M>().ok()).map(|b| *b)
        }))
    }
}

impl<M> fmt::Debug for Envelope<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("spec_version", &self.spec_version)
            .field("type_id", &self.type_id)
            .field("time", &self.time)
            .field("data_content_type", &self.data_content_type)
            .field("metadata", &self.metadata)
            .field("has_message", &self.message.is_some())
            .finish()
    }
}

/// Borrowed view of an envelope's wire-level fields (no message).
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeSummary<'a> {
    pub id: &'a str,
    pub source: Option<&'a str>,
    pub spec_version: &'a str,
    pub type_id: &'a str,
    pub time: &'a DateTime<FixedOffset>,
    pub data_content_type: Option<&'a str>,
    pub metadata: &'a Map<String, Value>,
}

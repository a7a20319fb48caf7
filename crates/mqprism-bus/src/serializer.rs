//! Envelope serializer (the pipeline orchestrator).
//!
//! Three operations:
//! - `create_envelope`: stamp a typed message with id, source, version,
//!   type id, and time from the registered publisher mapping.
//! - `serialize`: envelope -> wire string, through the pre/post
//!   serialize hooks.
//! - `convert_to_envelope`: carrier message -> materialized envelope +
//!   subscriber mapping, through unwrap, parse, decode, and the
//!   pre/post deserialize hooks.
//!
//! Failures wrap the original cause under a stable failure kind; when
//! message-content logging is disabled, JSON parse causes are dropped
//! from the surfaced chain.

use std::any::type_name;
use std::sync::{Arc, OnceLock};

use serde_json::Map;

use mqprism_core::carrier::QueueMessage;
use mqprism_core::content_type::is_json_content_type;
use mqprism_core::envelope::{AnyEnvelope, AnyMessage, Envelope, SPEC_VERSION};
use mqprism_core::error::{MqPrismError, Result};
use mqprism_core::pool::PoolScope;
use mqprism_core::utf8::{unescape_value, Utf8Slice};
use mqprism_core::wire::{envelope_to_string, read_envelope, DataEmitter, RawEnvelope};
use mqprism_core::wrappers::{unwrap_payload, UnwrappedPayload};

use crate::codec::MessageCodec;
use crate::config::SerializationConfig;
use crate::hooks::SerializationHook;
use crate::registry::{MessageRegistry, SubscriberMapping};
use crate::runtime::{Clock, HostSourceProvider, IdGenerator, SourceProvider, SystemClock, UuidGenerator};

/// Translates between in-memory messages and wire-format envelopes.
pub struct EnvelopeSerializer {
    registry: Arc<MessageRegistry>,
    hooks: Vec<Arc<dyn SerializationHook>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    source_provider: Arc<dyn SourceProvider>,
    source: OnceLock<String>,
    config: SerializationConfig,
}

impl EnvelopeSerializer {
    pub fn new(registry: Arc<MessageRegistry>, config: SerializationConfig) -> Self {
        EnvelopeSerializer {
            registry,
            hooks: Vec::new(),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            source_provider: Arc::new(HostSourceProvider),
            source: OnceLock::new(),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_source_provider(mut self, provider: Arc<dyn SourceProvider>) -> Self {
        self.source_provider = provider;
        self
    }

    /// Append a hook. Hooks run in registration order.
    pub fn with_hook(mut self, hook: Arc<dyn SerializationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Build an envelope around a typed message: fresh id, cached
    /// source, current time, type id from the publisher mapping.
    pub fn create_envelope<M: Send + Sync + 'static>(&self, message: M) -> Result<Envelope<M>> {
        let mapping = self
            .registry
            .publisher_of::<M>()
            .ok_or_else(|| MqPrismError::MissingMapping(type_name::<M>().to_string()))?;
        Ok(Envelope {
            id: self.ids.next_id(),
            source: Some(self.cached_source().to_string()),
            spec_version: SPEC_VERSION.to_string(),
            type_id: mapping.type_id.clone(),
            time: self.clock.now(),
            data_content_type: None,
            metadata: Map::new(),
            queue_metadata: None,
            notification_metadata: None,
            event_bus_metadata: None,
            message: Some(message),
        })
    }

    /// Emit the envelope as a wire-format string.
    pub async fn serialize<M: Send + Sync + 'static>(&self, envelope: &Envelope<M>) -> Result<String> {
        match self.serialize_inner(envelope).await {
            Ok(payload) => Ok(payload),
            Err(e @ (MqPrismError::NullMessage | MqPrismError::MissingMapping(_))) => Err(e),
            Err(e) => {
                let wrapped = MqPrismError::SerializeFailed(Some(Box::new(e)));
                Err(self.maybe_redact(wrapped))
            }
        }
    }

    async fn serialize_inner<M: Send + Sync + 'static>(
        &self,
        envelope: &Envelope<M>,
    ) -> Result<String> {
        let message = envelope.message.as_ref().ok_or(MqPrismError::NullMessage)?;
        let mapping = self
            .registry
            .publisher_of::<M>()
            .ok_or_else(|| MqPrismError::MissingMapping(type_name::<M>().to_string()))?;

        let summary = envelope.summary();
        for hook in &self.hooks {
            hook.pre_serialize(&summary).await?;
        }

        let message: &dyn AnyMessage = message;
        let encoded;
        let direct_write;
        let emitter = match &mapping.codec {
            MessageCodec::Text(codec) => {
                encoded = codec.encode(message)?;
                DataEmitter::Serialized {
                    content_type: &encoded.content_type,
                    body: &encoded.body,
                }
            }
            MessageCodec::Utf8(codec) => {
                direct_write = move |buf: &mut Vec<u8>| codec.encode_into(buf, message);
                DataEmitter::Direct {
                    content_type: codec.content_type(),
                    write: &direct_write,
                }
            }
        };
        let mut payload = envelope_to_string(&summary, emitter)?;
        tracing::trace!(type_id = %envelope.type_id, bytes = payload.len(), "serialized envelope");

        for hook in &self.hooks {
            payload = hook.post_serialize(payload).await?;
        }
        Ok(payload)
    }

    /// Parse a carrier message into a materialized envelope plus the
    /// subscriber mapping that resolved it. The carrier is not consumed
    /// or mutated; a failure leaves it available for redelivery.
    pub async fn convert_to_envelope(
        &self,
        carrier: &QueueMessage,
    ) -> Result<(AnyEnvelope, Arc<SubscriberMapping>)> {
        match self.convert_inner(carrier).await {
            Ok(out) => Ok(out),
            Err(e) => {
                let wrapped = MqPrismError::ConvertFailed(Some(Box::new(e)));
                Err(self.maybe_redact(wrapped))
            }
        }
    }

    async fn convert_inner(
        &self,
        carrier: &QueueMessage,
    ) -> Result<(AnyEnvelope, Arc<SubscriberMapping>)> {
        let mut body = carrier.body.clone();
        for hook in &self.hooks {
            body = hook.pre_deserialize(body).await?;
        }

        let scope = PoolScope::new(self.config.clean_rented_buffers);
        let unwrapped = unwrap_payload(
            body.as_bytes(),
            carrier,
            &scope,
            self.config.max_wrapper_scan_bytes,
        );
        tracing::debug!(wrapper = unwrapped.wrapper_name(), "unwrapped carrier payload");

        let text = unwrapped.inner.to_utf8()?;
        let raw = read_envelope(text)?;
        let (envelope, mapping) = self.materialize(raw, &unwrapped, &scope)?;

        let summary = envelope.summary();
        for hook in &self.hooks {
            hook.post_deserialize(&summary).await?;
        }
        Ok((envelope, mapping))
    }

    fn materialize<'s>(
        &self,
        raw: RawEnvelope<'s>,
        unwrapped: &UnwrappedPayload<'_>,
        scope: &'s PoolScope,
    ) -> Result<(AnyEnvelope, Arc<SubscriberMapping>)> {
        let type_id = match raw.type_id {
            Some(t) if !t.is_empty() => t,
            _ => {
                return Err(MqPrismError::invalid_data(
                    "envelope is missing a non-empty 'type' property",
                ))
            }
        };
        let mapping = self.registry.subscriber(&type_id).ok_or_else(|| {
            let known = self.registry.subscriber_type_ids().join(", ");
            MqPrismError::invalid_data(format!(
                "no subscriber mapping for message type '{type_id}'; available: [{known}]"
            ))
        })?;

        let id = required(raw.id, "id")?;
        let source = required(raw.source, "source")?;
        let spec_version = required(raw.spec_version, "specversion")?;
        let time = raw
            .time
            .ok_or_else(|| missing_property("time"))?;

        let data_is_json = raw
            .data_content_type
            .as_deref()
            .map_or(true, is_json_content_type);

        // JSON data stays a zero-copy slice of the backing buffer;
        // non-JSON data must be a string token, unescaped into pooled
        // storage. The codec consumes the slice before the scope closes.
        let payload: Utf8Slice<'s> = if data_is_json {
            Utf8Slice::Borrowed(raw.data.map_or(b"null".as_slice(), |r| r.get().as_bytes()))
        } else {
            let token = raw.data.ok_or_else(|| missing_property("data"))?.get();
            unescape_value(token, scope)?
        };

        let message = match &mapping.codec {
            MessageCodec::Utf8(codec) => codec.decode_slice(&payload)?,
            MessageCodec::Text(codec) => codec.decode(payload.to_utf8()?)?,
        };

        let envelope = Envelope {
            id,
            source: Some(source),
            spec_version,
            type_id,
            time,
            data_content_type: raw.data_content_type,
            metadata: raw.metadata,
            queue_metadata: Some(unwrapped.queue.clone()),
            notification_metadata: unwrapped.notification.clone(),
            event_bus_metadata: unwrapped.event_bus.clone(),
            message: Some(message),
        };
        Ok((envelope, mapping))
    }

    fn cached_source(&self) -> &str {
        self.source.get_or_init(|| self.source_provider.source())
    }

    fn maybe_redact(&self, err: MqPrismError) -> MqPrismError {
        if self.config.log_message_content {
            err
        } else {
            err.redacted()
        }
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value.ok_or_else(|| missing_property(name))
}

fn missing_property(name: &str) -> MqPrismError {
    MqPrismError::invalid_data(format!("envelope is missing required property '{name}'"))
}

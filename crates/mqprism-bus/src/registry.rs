//! Publisher/subscriber mapping registry.
//!
//! Registration is a configuration-time concern: mappings are collected
//! on a builder and frozen into a read-only registry when the bus is
//! assembled. Codec shapes are resolved at build time from the
//! experimental-features flag.

use std::any::{type_name, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::MessageCodec;
use crate::config::SerializationConfig;

/// Maps a received `type` property to a concrete message type + codec.
#[derive(Debug)]
pub struct SubscriberMapping {
    pub type_id: String,
    /// Rust type name, for diagnostics only.
    pub target_type: &'static str,
    pub codec: MessageCodec,
}

/// Maps a published message's static type to its `type` property + codec.
pub struct PublisherMapping {
    pub type_id: String,
    pub codec: MessageCodec,
}

type CodecFactory = Box<dyn Fn(bool) -> MessageCodec + Send + Sync>;

struct PendingSubscriber {
    type_id: String,
    target_type: &'static str,
    make_codec: CodecFactory,
}

struct PendingPublisher {
    message: TypeId,
    type_id: String,
    make_codec: CodecFactory,
}

/// Collects mappings before the bus is assembled.
#[derive(Default)]
pub struct MessageRegistryBuilder {
    subscribers: Vec<PendingSubscriber>,
    publishers: Vec<PendingPublisher>,
}

impl MessageRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route received envelopes with this `type` property to `M`,
    /// decoded by the built-in JSON codec.
    pub fn subscribe<M>(mut self, type_id: impl Into<String>) -> Self
    where
        M: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.subscribers.push(PendingSubscriber {
            type_id: type_id.into(),
            target_type: type_name::<M>(),
            make_codec: Box::new(MessageCodec::json::<M>),
        });
        self
    }

    /// Same as `subscribe` but with a caller-provided codec (ignores
    /// the experimental-features flag).
    pub fn subscribe_with_codec<M: Send + Sync + 'static>(
        mut self,
        type_id: impl Into<String>,
        codec: MessageCodec,
    ) -> Self {
        self.subscribers.push(PendingSubscriber {
            type_id: type_id.into(),
            target_type: type_name::<M>(),
            make_codec: Box::new(move |_| codec.clone()),
        });
        self
    }

    /// Publish messages of type `M` under this `type` property,
    /// encoded by the built-in JSON codec.
    pub fn publish<M>(mut self, type_id: impl Into<String>) -> Self
    where
        M: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.publishers.push(PendingPublisher {
            message: TypeId::of::<M>(),
            type_id: type_id.into(),
            make_codec: Box::new(MessageCodec::json::<M>),
        });
        self
    }

    /// Same as `publish` but with a caller-provided codec.
    pub fn publish_with_codec<M: Send + Sync + 'static>(
        mut self,
        type_id: impl Into<String>,
        codec: MessageCodec,
    ) -> Self {
        self.publishers.push(PendingPublisher {
            message: TypeId::of::<M>(),
            type_id: type_id.into(),
            make_codec: Box::new(move |_| codec.clone()),
        });
        self
    }

    /// Freeze into a read-only registry, resolving codec shapes from
    /// the configuration.
    pub fn build(self, config: &SerializationConfig) -> MessageRegistry {
        let utf8_path = config.experimental_features_enabled;
        let registry = MessageRegistry {
            subscribers: DashMap::new(),
            publishers: DashMap::new(),
        };
        for pending in self.subscribers {
            registry.subscribers.insert(
                pending.type_id.clone(),
                Arc::new(SubscriberMapping {
                    type_id: pending.type_id,
                    target_type: pending.target_type,
                    codec: (pending.make_codec)(utf8_path),
                }),
            );
        }
        for pending in self.publishers {
            registry.publishers.insert(
                pending.message,
                Arc::new(PublisherMapping {
                    type_id: pending.type_id,
                    codec: (pending.make_codec)(utf8_path),
                }),
            );
        }
        registry
    }
}

/// Read-only after build.
pub struct MessageRegistry {
    subscribers: DashMap<String, Arc<SubscriberMapping>>,
    publishers: DashMap<TypeId, Arc<PublisherMapping>>,
}

impl MessageRegistry {
    pub fn subscriber(&self, type_id: &str) -> Option<Arc<SubscriberMapping>> {
        self.subscribers.get(type_id).map(|e| e.value().clone())
    }

    /// All registered subscriber type ids, for diagnostics.
    pub fn subscriber_type_ids(&self) -> Vec<String> {
        self.subscribers.iter().map(|e| e.key().clone()).collect()
    }

    pub fn publisher_of<M: Send + Sync + 'static>(&self) -> Option<Arc<PublisherMapping>> {
        self.publishers
            .get(&TypeId::of::<M>())
            .map(|e| e.value().clone())
    }
}

//! Message codecs.
//!
//! A codec turns an application message into payload bytes and back.
//! The core never probes codec capabilities at runtime: a codec is
//! registered as one of two shapes and the serializer branches on the
//! tag.
//! - `Text`: the payload crosses as an owned `String` plus its content
//!   type (legacy path; also the only path for non-JSON payloads).
//! - `Utf8`: the payload is written into / read from UTF-8 byte buffers
//!   directly, skipping the intermediate string.

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use mqprism_core::envelope::{AnyMessage, DEFAULT_CONTENT_TYPE};
use mqprism_core::error::{MqPrismError, Result};

/// Output of a text codec.
#[derive(Debug, Clone)]
pub struct EncodedPayload {
    pub body: String,
    pub content_type: String,
}

/// String-based codec shape.
pub trait TextCodec: Send + Sync {
    fn encode(&self, message: &dyn AnyMessage) -> Result<EncodedPayload>;
    fn decode(&self, body: &str) -> Result<Box<dyn AnyMessage>>;
}

/// Buffer-based codec shape.
pub trait Utf8Codec: Send + Sync {
    /// Content type declared for every payload this codec writes.
    fn content_type(&self) -> &str;
    fn encode_into(&self, buf: &mut Vec<u8>, message: &dyn AnyMessage) -> Result<()>;
    fn decode_slice(&self, bytes: &[u8]) -> Result<Box<dyn AnyMessage>>;
}

/// A registered codec, tagged by shape.
#[derive(Clone)]
pub enum MessageCodec {
    Text(Arc<dyn TextCodec>),
    Utf8(Arc<dyn Utf8Codec>),
}

impl std::fmt::Debug for MessageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageCodec::Text(_) => f.write_str("MessageCodec::Text(..)"),
            MessageCodec::Utf8(_) => f.write_str("MessageCodec::Utf8(..)"),
        }
    }
}

impl MessageCodec {
    /// Built-in JSON codec for `M`, shaped by the experimental-features
    /// flag at registry build time.
    pub fn json<M>(utf8_path: bool) -> Self
    where
        M: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        if utf8_path {
            MessageCodec::Utf8(Arc::new(JsonCodec::<M>::new()))
        } else {
            MessageCodec::Text(Arc::new(JsonCodec::<M>::new()))
        }
    }
}

/// serde_json-backed codec implementing both shapes.
pub struct JsonCodec<M> {
    _marker: PhantomData<fn() -> M>,
}

impl<M> JsonCodec<M> {
    pub fn new() -> Self {
        JsonCodec {
            _marker: PhantomData,
        }
    }
}

impl<M> Default for JsonCodec<M> {
    fn default() -> Self {
        JsonCodec::new()
    }
}

fn downcast<M: Send + Sync + 'static>(message: &dyn AnyMessage) -> Result<&M> {
    message.as_any().downcast_ref::<M>().ok_or_else(|| {
        MqPrismError::invalid_data(format!(
            "codec expected message type {}",
            type_name::<M>()
        ))
    })
}

impl<M> TextCodec for JsonCodec<M>
where
    M: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn encode(&self, message: &dyn AnyMessage) -> Result<EncodedPayload> {
        let message = downcast::<M>(message)?;
        Ok(EncodedPayload {
            body: serde_json::to_string(message)?,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        })
    }

    fn decode(&self, body: &str) -> Result<Box<dyn AnyMessage>> {
        let message: M = serde_json::from_str(body)?;
        Ok(Box::new(message))
    }
}

impl<M> Utf8Codec for JsonCodec<M>
where
    M: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn content_type(&self) -> &str {
        DEFAULT_CONTENT_TYPE
    }

    fn encode_into(&self, buf: &mut Vec<u8>, message: &dyn AnyMessage) -> Result<()> {
        let message = downcast::<M>(message)?;
        serde_json::to_writer(&mut *buf, message)?;
        Ok(())
    }

    fn decode_slice(&self, bytes: &[u8]) -> Result<Box<dyn AnyMessage>> {
        let message: M = serde_json::from_slice(bytes)?;
        Ok(Box::new(message))
    }
}

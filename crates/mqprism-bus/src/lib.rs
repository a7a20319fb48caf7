//! mqPrism bus library entry.
//!
//! This crate assembles the envelope serialization stack:
//! - Config: strict YAML parsing + validation for the serialization
//!   knobs (buffer hygiene, content redaction, codec path selection).
//! - Codecs: tagged text/UTF-8 codec shapes with a serde_json built-in.
//! - Registry: publisher/subscriber mappings, frozen at build time.
//! - Hooks: ordered pre/post serialize/deserialize interception points.
//! - Serializer: the orchestrator running unwrap -> parse -> decode and
//!   emit pipelines with stable failure kinds.
//! - Runtime seams: clock, id generation, and source identity, swappable
//!   for tests.
//!
//! The stack is designed for panic-free operation: malformed payloads
//! surface as structured `MqPrismError` values instead of crashing the
//! consumer loop.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod codec;
pub mod config;
pub mod hooks;
pub mod registry;
pub mod runtime;
pub mod serializer;

pub use mqprism_core::error::{FailureKind, MqPrismError, Result};
pub use serializer::EnvelopeSerializer;

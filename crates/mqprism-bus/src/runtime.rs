//! Process runtime seams: clock, id generation, source identity.
//!
//! Defaults cover production; tests swap in fixed implementations.

use chrono::{DateTime, FixedOffset, Utc};

/// Offset-aware wall clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// System wall clock, UTC offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().fixed_offset()
    }
}

/// Envelope id generation.
pub trait IdGenerator: Send + Sync {
    /// Returns a non-empty id, unique per message.
    fn next_id(&self) -> String;
}

/// UUID v4 ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Computes the envelope `source` URI for this process. Called once;
/// the serializer caches the result for the process lifetime.
pub trait SourceProvider: Send + Sync {
    /// May return a relative URI reference.
    fn source(&self) -> String;
}

/// Host-derived relative source, `/mqprism/<hostname>`.
#[derive(Debug, Default, Clone)]
pub struct HostSourceProvider;

impl SourceProvider for HostSourceProvider {
    fn source(&self) -> String {
        let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown-host".into());
        format!("/mqprism/{host}")
    }
}

/// Fixed source, for tests and explicit configuration.
#[derive(Debug, Clone)]
pub struct FixedSourceProvider(pub String);

impl SourceProvider for FixedSourceProvider {
    fn source(&self) -> String {
        self.0.clone()
    }
}

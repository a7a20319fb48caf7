//! Serialization hooks.
//!
//! Hooks observe or transform the pipeline at four points. They run
//! sequentially in registration order, each completing before the
//! next; a hook failure aborts the whole operation. Registration is a
//! configuration-time concern only.

use async_trait::async_trait;

use mqprism_core::envelope::EnvelopeSummary;
use mqprism_core::error::Result;

/// A pipeline hook. Implement only the phases you need; defaults are
/// pass-through.
#[async_trait]
pub trait SerializationHook: Send + Sync {
    /// Runs before the envelope is written. The envelope is final at
    /// this point.
    async fn pre_serialize(&self, envelope: &EnvelopeSummary<'_>) -> Result<()> {
        let _ = envelope;
        Ok(())
    }

    /// Transforms the emitted string (compression, signing, ...).
    async fn post_serialize(&self, payload: String) -> Result<String> {
        Ok(payload)
    }

    /// Transforms the raw carrier body before parsing.
    async fn pre_deserialize(&self, body: String) -> Result<String> {
        Ok(body)
    }

    /// Runs after the envelope is materialized.
    async fn post_deserialize(&self, envelope: &EnvelopeSummary<'_>) -> Result<()> {
        let _ = envelope;
        Ok(())
    }
}

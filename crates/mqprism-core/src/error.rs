//! Shared error type across mqPrism crates.

use thiserror::Error;

/// Stable failure codes surfaced to bus operators (logs, DLQ tagging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No publisher/subscriber mapping for a message type.
    MissingMapping,
    /// Envelope JSON malformed or a required property missing.
    InvalidData,
    /// Envelope carries no message at serialize time.
    NullMessage,
    /// Serialize pipeline failed (writer, codec, or hook).
    SerializeFailed,
    /// Convert pipeline failed (parse, codec, or hook).
    ConvertFailed,
    /// Internal error.
    Internal,
}

impl FailureKind {
    /// String representation used in logs and operator tooling.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::MissingMapping => "MISSING_MAPPING",
            FailureKind::InvalidData => "INVALID_DATA",
            FailureKind::NullMessage => "NULL_MESSAGE",
            FailureKind::SerializeFailed => "SERIALIZE_FAILED",
            FailureKind::ConvertFailed => "CONVERT_FAILED",
            FailureKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MqPrismError>;

/// Unified error type used by core and bus.
#[derive(Debug, Error)]
pub enum MqPrismError {
    #[error("no mapping registered for message type: {0}")]
    MissingMapping(String),
    #[error("invalid envelope data: {reason}")]
    InvalidData {
        reason: String,
        #[source]
        cause: Option<Box<MqPrismError>>,
    },
    #[error("envelope carries no message")]
    NullMessage,
    #[error("failed to serialize envelope")]
    SerializeFailed(#[source] Option<Box<MqPrismError>>),
    #[error("failed to convert message to envelope")]
    ConvertFailed(#[source] Option<Box<MqPrismError>>),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("serialization hook failed: {0}")]
    Hook(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MqPrismError {
    /// Shorthand for an `InvalidData` error without an inner cause.
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        MqPrismError::InvalidData {
            reason: reason.into(),
            cause: None,
        }
    }

    /// Wrap a hook's failure.
    pub fn hook(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        MqPrismError::Hook(err.into())
    }

    /// Map internal error to a stable failure code.
    pub fn kind(&self) -> FailureKind {
        match self {
            MqPrismError::MissingMapping(_) => FailureKind::MissingMapping,
            MqPrismError::InvalidData { .. } => FailureKind::InvalidData,
            MqPrismError::NullMessage => FailureKind::NullMessage,
            MqPrismError::SerializeFailed(_) => FailureKind::SerializeFailed,
            MqPrismError::ConvertFailed(_) => FailureKind::ConvertFailed,
            MqPrismError::Json(_) | MqPrismError::Timestamp(_) => FailureKind::InvalidData,
            MqPrismError::Hook(_) | MqPrismError::Config(_) => FailureKind::Internal,
        }
    }

    /// Strip JSON parse causes from the chain. Parser messages can quote
    /// payload fragments, which must not reach logs when message content
    /// logging is disabled.
    pub fn redacted(self) -> Self {
        fn strip(cause: Option<Box<MqPrismError>>) -> Option<Box<MqPrismError>> {
            match cause {
                Some(inner) if matches!(*inner, MqPrismError::Json(_)) => None,
                Some(inner) => Some(Box::new(inner.redacted())),
                None => None,
            }
        }

        match self {
            MqPrismError::InvalidData { reason, cause } => MqPrismError::InvalidData {
                reason,
                cause: strip(cause),
            },
            MqPrismError::SerializeFailed(cause) => MqPrismError::SerializeFailed(strip(cause)),
            MqPrismError::ConvertFailed(cause) => MqPrismError::ConvertFailed(strip(cause)),
            other => other,
        }
    }
}

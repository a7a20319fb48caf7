use serde::Deserialize;

use mqprism_core::error::{MqPrismError, Result};

/// Serialization-core configuration, strict by default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerializationConfig {
    /// Zero pooled buffers before they return to the shelf.
    #[serde(default = "default_true")]
    pub clean_rented_buffers: bool,

    /// When false, payload contents are kept out of error-path logs:
    /// JSON parse causes are dropped from surfaced error chains.
    #[serde(default = "default_true")]
    pub log_message_content: bool,

    /// Selects the UTF-8 codec path over the legacy string path when
    /// the registry is built.
    #[serde(default)]
    pub experimental_features_enabled: bool,

    /// Prefix length examined by the wrapper quick-match scans.
    #[serde(default = "default_scan_bytes")]
    pub max_wrapper_scan_bytes: usize,
}

impl SerializationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(256..=65536).contains(&self.max_wrapper_scan_bytes) {
            return Err(MqPrismError::Config(
                "max_wrapper_scan_bytes must be between 256 and 65536".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SerializationConfig {
    fn default() -> Self {
        SerializationConfig {
            clean_rented_buffers: default_true(),
            log_message_content: default_true(),
            experimental_features_enabled: false,
            max_wrapper_scan_bytes: default_scan_bytes(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_scan_bytes() -> usize {
    2048
}

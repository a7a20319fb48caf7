//! Bus config loader (strict parsing).

pub mod schema;

use std::fs;

use mqprism_core::error::{MqPrismError, Result};

pub use schema::SerializationConfig;

pub fn load_from_file(path: &str) -> Result<SerializationConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MqPrismError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<SerializationConfig> {
    let cfg: SerializationConfig =
        serde_yaml::from_str(s).map_err(|e| MqPrismError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

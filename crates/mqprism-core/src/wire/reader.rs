//! Canonical envelope parse.
//!
//! One pass over the object in document order. Known properties land in
//! their slots; `data` is captured as a raw slice of the backing buffer
//! (no copy, no parse of the payload itself); every other key becomes
//! owned metadata. Classification of `data` against `datacontenttype`
//! happens after the pass, so property order on the wire does not
//! matter.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::envelope::RESERVED_PROPERTIES;
use crate::error::{MqPrismError, Result};

/// Parsed envelope, not yet validated or materialized. `data` borrows
/// the input buffer.
#[derive(Debug, Default)]
pub struct RawEnvelope<'a> {
    pub id: Option<String>,
    pub source: Option<String>,
    pub spec_version: Option<String>,
    pub type_id: Option<String>,
    pub time: Option<DateTime<FixedOffset>>,
    pub data_content_type: Option<String>,
    pub data: Option<&'a RawValue>,
    pub metadata: Map<String, Value>,
}

/// Parse an envelope from the inner payload text. Any malformation
/// (not an object, bad property type, unparseable timestamp) is
/// invalid data.
pub fn read_envelope(text: &str) -> Result<RawEnvelope<'_>> {
    serde_json::from_str(text).map_err(|e| MqPrismError::InvalidData {
        reason: "malformed envelope json".into(),
        cause: Some(Box::new(e.into())),
    })
}

impl<'de> Deserialize<'de> for RawEnvelope<'de> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EnvelopeVisitor;

        impl<'de> Visitor<'de> for EnvelopeVisitor {
            type Value = RawEnvelope<'de>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a json envelope object")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut env = RawEnvelope::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "id" => env.id = Some(map.next_value()?),
                        "source" => env.source = Some(map.next_value()?),
                        "specversion" => env.spec_version = Some(map.next_value()?),
                        "type" => env.type_id = Some(map.next_value()?),
                        "time" => {
                            let raw: String = map.next_value()?;
                            let parsed = DateTime::parse_from_rfc3339(&raw)
                                .map_err(serde::de::Error::custom)?;
                            env.time = Some(parsed);
                        }
                        "datacontenttype" => env.data_content_type = Some(map.next_value()?),
                        "data" => env.data = Some(map.next_value::<&'de RawValue>()?),
                        _ => {
                            // RESERVED_PROPERTIES are all matched above;
                            // everything else is metadata.
                            debug_assert!(!RESERVED_PROPERTIES.contains(&key.as_str()));
                            let value: Value = map.next_value()?;
                            env.metadata.insert(key, value);
                        }
                    }
                }
                Ok(env)
            }
        }

        deserializer.deserialize_map(EnvelopeVisitor)
    }
}

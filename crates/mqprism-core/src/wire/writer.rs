//! Canonical envelope emit.
//!
//! Property order is part of the wire contract:
//! `id, source, specversion, type, time, datacontenttype, data`,
//! then metadata keys in insertion order. `source` is omitted when
//! absent. Metadata keys colliding with a reserved property name and
//! null values are silently discarded.

use chrono::SecondsFormat;

use crate::content_type::is_json_content_type;
use crate::envelope::{EnvelopeSummary, RESERVED_PROPERTIES};
use crate::error::{MqPrismError, Result};

/// Pre-encoded property names, comma-prefixed where the preceding
/// property is always present.
const PROP_ID: &[u8] = b"\"id\":";
const PROP_SOURCE: &[u8] = b",\"source\":";
const PROP_SPECVERSION: &[u8] = b",\"specversion\":";
const PROP_TYPE: &[u8] = b",\"type\":";
const PROP_TIME: &[u8] = b",\"time\":";
const PROP_DATACONTENTTYPE: &[u8] = b",\"datacontenttype\":";
const PROP_DATA: &[u8] = b",\"data\":";

/// How the `data` property reaches the output buffer.
pub enum DataEmitter<'a> {
    /// Output of a string codec: emitted verbatim when its content type
    /// is JSON-shaped, as an escaped string token otherwise.
    Serialized {
        content_type: &'a str,
        body: &'a str,
    },
    /// A UTF-8 codec writes the JSON value straight into the buffer,
    /// no intermediate allocation.
    Direct {
        content_type: &'a str,
        write: &'a dyn Fn(&mut Vec<u8>) -> Result<()>,
    },
}

impl DataEmitter<'_> {
    fn content_type(&self) -> &str {
        match self {
            DataEmitter::Serialized { content_type, .. } => content_type,
            DataEmitter::Direct { content_type, .. } => content_type,
        }
    }
}

/// Emit one envelope into `buf`.
pub fn write_envelope(
    head: &EnvelopeSummary<'_>,
    data: DataEmitter<'_>,
    buf: &mut Vec<u8>,
) -> Result<()> {
    buf.push(b'{');

    buf.extend_from_slice(PROP_ID);
    write_json_str(buf, head.id)?;
    if let Some(source) = head.source {
        buf.extend_from_slice(PROP_SOURCE);
        write_json_str(buf, source)?;
    }
    buf.extend_from_slice(PROP_SPECVERSION);
    write_json_str(buf, head.spec_version)?;
    buf.extend_from_slice(PROP_TYPE);
    write_json_str(buf, head.type_id)?;
    buf.extend_from_slice(PROP_TIME);
    write_json_str(
        buf,
        &head.time.to_rfc3339_opts(SecondsFormat::AutoSi, false),
    )?;

    buf.extend_from_slice(PROP_DATACONTENTTYPE);
    write_json_str(buf, data.content_type())?;
    buf.extend_from_slice(PROP_DATA);
    match data {
        DataEmitter::Serialized { content_type, body } => {
            if is_json_content_type(content_type) {
                buf.extend_from_slice(body.as_bytes());
            } else {
                write_json_str(buf, body)?;
            }
        }
        DataEmitter::Direct { write, .. } => write(buf)?,
    }

    for (key, value) in head.metadata {
        if value.is_null() || RESERVED_PROPERTIES.contains(&key.as_str()) {
            continue;
        }
        buf.push(b',');
        write_json_str(buf, key)?;
        buf.push(b':');
        serde_json::to_writer(&mut *buf, value)?;
    }

    buf.push(b'}');
    Ok(())
}

/// Emit one envelope and hand it back as a `String` (hooks operate on
/// strings). Every byte written above comes from a UTF-8 source, so a
/// failure here means a misbehaving direct-write codec.
pub fn envelope_to_string(head: &EnvelopeSummary<'_>, data: DataEmitter<'_>) -> Result<String> {
    let mut buf = Vec::with_capacity(256);
    write_envelope(head, data, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|_| MqPrismError::invalid_data("codec wrote non-utf-8 bytes into the envelope"))
}

fn write_json_str(buf: &mut Vec<u8>, value: &str) -> Result<()> {
    serde_json::to_writer(&mut *buf, value)?;
    Ok(())
}

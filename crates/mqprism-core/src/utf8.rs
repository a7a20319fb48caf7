//! UTF-8 payload slices and JSON string unescaping.
//!
//! The receive path keeps payload bytes borrowed from the carrier body
//! wherever it can; only escaped string tokens force a copy, and that
//! copy lands in pooled storage owned by the conversion's scope.

use std::ops::Deref;

use crate::error::{MqPrismError, Result};
use crate::pool::{PoolScope, PooledBuf};

/// A byte slice that is either borrowed from the input buffer or held
/// in a pooled buffer. Either way it lives no longer than the scope.
pub enum Utf8Slice<'a> {
    Borrowed(&'a [u8]),
    Pooled(PooledBuf<'a>),
}

impl Utf8Slice<'_> {
    /// View the slice as `str`. The unescaper only ever produces valid
    /// UTF-8, so this fails only on hostile `Borrowed` input.
    pub fn to_utf8(&self) -> Result<&str> {
        std::str::from_utf8(self).map_err(|_| {
            MqPrismError::invalid_data("payload is not valid utf-8")
        })
    }
}

impl Deref for Utf8Slice<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Utf8Slice::Borrowed(bytes) => bytes,
            Utf8Slice::Pooled(buf) => buf,
        }
    }
}

/// Unescape a JSON string token (quotes included) into a UTF-8 slice.
///
/// Fast path: a token without escapes borrows its interior directly.
/// Slow path: rents a pooled buffer bounded by the escaped length (an
/// upper bound on the unescaped length) and decodes into it.
pub fn unescape_value<'s>(token: &'s str, scope: &'s PoolScope) -> Result<Utf8Slice<'s>> {
    let interior = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| MqPrismError::invalid_data("expected a json string token"))?;

    if !interior.as_bytes().contains(&b'\\') {
        return Ok(Utf8Slice::Borrowed(interior.as_bytes()));
    }

    let mut out = scope.rent(interior.len());
    let mut rest = interior;
    while let Some(pos) = rest.find('\\') {
        let (plain, escape) = rest.split_at(pos);
        out.extend_from_slice(plain.as_bytes());
        rest = decode_escape(escape, &mut out)?;
    }
    out.extend_from_slice(rest.as_bytes());
    Ok(Utf8Slice::Pooled(out))
}

/// Decode one escape sequence at the head of `input` (which starts with
/// `\`), append the decoded bytes, and return the remainder.
fn decode_escape<'a>(input: &'a str, out: &mut PooledBuf<'_>) -> Result<&'a str> {
    let body = input
        .get(1..)
        .ok_or_else(|| MqPrismError::invalid_data("truncated escape sequence"))?;
    let marker = body
        .chars()
        .next()
        .ok_or_else(|| MqPrismError::invalid_data("truncated escape sequence"))?;

    let simple = match marker {
        '"' => Some(b'"'),
        '\\' => Some(b'\\'),
        '/' => Some(b'/'),
        'b' => Some(0x08),
        'f' => Some(0x0C),
        'n' => Some(b'\n'),
        'r' => Some(b'\r'),
        't' => Some(b'\t'),
        _ => None,
    };
    if let Some(byte) = simple {
        out.extend_from_slice(&[byte]);
        return body
            .get(1..)
            .ok_or_else(|| MqPrismError::invalid_data("truncated escape sequence"));
    }

    if marker != 'u' {
        return Err(MqPrismError::invalid_data("unsupported escape sequence"));
    }

    let (unit, after) = hex_unit(body.get(1..))?;
    if (0xD800..=0xDBFF).contains(&unit) {
        // High surrogate; a low surrogate escape must follow.
        let low_body = after
            .strip_prefix("\\u")
            .ok_or_else(|| MqPrismError::invalid_data("unpaired utf-16 surrogate"))?;
        let (low, rest) = hex_unit(Some(low_body))?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(MqPrismError::invalid_data("unpaired utf-16 surrogate"));
        }
        let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
        push_char(code, out)?;
        return Ok(rest);
    }
    if (0xDC00..=0xDFFF).contains(&unit) {
        return Err(MqPrismError::invalid_data("unpaired utf-16 surrogate"));
    }
    push_char(u32::from(unit), out)?;
    Ok(after)
}

/// Parse four hex digits; returns the code unit and the remainder.
fn hex_unit(input: Option<&str>) -> Result<(u16, &str)> {
    let input = input.ok_or_else(|| MqPrismError::invalid_data("truncated unicode escape"))?;
    let digits = input
        .get(..4)
        .ok_or_else(|| MqPrismError::invalid_data("truncated unicode escape"))?;
    let unit = u16::from_str_radix(digits, 16)
        .map_err(|_| MqPrismError::invalid_data("invalid unicode escape"))?;
    let rest = input
        .get(4..)
        .ok_or_else(|| MqPrismError::invalid_data("truncated unicode escape"))?;
    Ok((unit, rest))
}

fn push_char(code: u32, out: &mut PooledBuf<'_>) -> Result<()> {
    let ch = char::from_u32(code)
        .ok_or_else(|| MqPrismError::invalid_data("invalid unicode scalar"))?;
    let mut tmp = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
    Ok(())
}

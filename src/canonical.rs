//! Canonical serialization for deterministic hashing.
//!
//! This module renders `data` and `rel8ns` mappings to the exact text that
//! feeds the gib digest.
//!
//! ## Determinism Guarantees
//!
//! - Compact JSON, no whitespace
//! - Map keys in insertion order (`serde_json/preserve_order`, `IndexMap`)
//! - Vectors in index order
//! - Struct fields in declaration order
//! - Floats rendered as JavaScript's `Number.prototype.toString` does
//!   (`1.0` → `1`, `1e21` → `1e+21`, `-0.0` → `0`)
//!
//! Keys are NOT sorted. Two mappings with the same entries inserted in a
//! different order render differently and hash differently; transforms
//! therefore fix the order in which they insert keys.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

/// Compact JSON formatter whose floats follow JavaScript number rendering.
///
/// Integers and everything else use the `serde_json` defaults, which
/// already match `JSON.stringify` for compact output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsNumberFormatter;

impl Formatter for JsNumberFormatter {
    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_f64(writer, f64::from(value))
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // JSON.stringify(-0) is "0"
        if value == 0.0 {
            return writer.write_all(b"0");
        }
        let mut buffer = ryu_js::Buffer::new();
        writer.write_all(buffer.format(value).as_bytes())
    }
}

/// Serialize a value to canonical UTF-8 bytes.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, JsNumberFormatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Serialize a value to its canonical text.
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = to_canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(serde::ser::Error::custom)
}

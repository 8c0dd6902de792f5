//! Encoding value trees into tagged little-endian buffers.
//!
//! Layouts (all integers little-endian, all lengths and counts `u32`):
//!
//! ```text
//! scalar      tag payload
//! string      tag len utf8
//! bytes       tag len raw
//! array       tag(Array) element_tag count elements
//!               booleans are bit-packed, least significant bit first
//!               strings and bytes carry their own length prefix
//! value array tag(Array) tag(Value) count size* tagged_value*
//! map         tag count (key_offset value_offset)* (tagged_key tagged_value)*
//! ```
//!
//! Map offsets are relative to the map's own tag byte.

use crate::data::PersistedData;
use crate::types::{BBType, CodecError};
use crate::value::{ArrayValue, Value};
use tracing::trace;

/// An encoded value that owns its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBytes {
    bytes: Vec<u8>,
    ty: BBType,
}

impl PersistedBytes {
    /// Root view over the encoded value.
    pub fn view(&self) -> PersistedData<'_> {
        PersistedData::at(&self.bytes, 1, self.ty)
    }

    /// Type of the encoded value.
    pub fn bb_type(&self) -> BBType {
        self.ty
    }

    /// Encoded bytes, tag included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encoded length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: every encoding carries at least its tag.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encodes [`Value`] trees.
///
/// The per-type helpers are shorthands for [`ByteBufferSerializer::serialize`]
/// on the matching variant.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteBufferSerializer;

impl ByteBufferSerializer {
    /// Serializer with no state.
    pub fn new() -> Self {
        Self
    }

    /// Encode `value`.
    pub fn serialize(&self, value: &Value) -> Result<PersistedBytes, CodecError> {
        let mut bytes = Vec::new();
        write_value(&mut bytes, value)?;
        trace!(ty = %value.bb_type(), len = bytes.len(), "serialized value");
        Ok(PersistedBytes {
            bytes,
            ty: value.bb_type(),
        })
    }

    /// Encode null.
    pub fn serialize_null(&self) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Null)
    }

    /// Encode a boolean.
    pub fn serialize_boolean(&self, value: bool) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Boolean(value))
    }

    /// Encode a float.
    pub fn serialize_float(&self, value: f32) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Float(value))
    }

    /// Encode a double.
    pub fn serialize_double(&self, value: f64) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Double(value))
    }

    /// Encode a long.
    pub fn serialize_long(&self, value: i64) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Long(value))
    }

    /// Encode an integer.
    pub fn serialize_integer(&self, value: i32) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Integer(value))
    }

    /// Encode a string.
    pub fn serialize_string(&self, value: &str) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::String(value.to_string()))
    }

    /// Encode a byte array.
    pub fn serialize_bytes(&self, value: &[u8]) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Bytes(value.to_vec()))
    }

    /// Encode a byte buffer.
    pub fn serialize_byte_buffer(&self, value: &[u8]) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::ByteBuffer(value.to_vec()))
    }

    /// Encode a boolean array.
    pub fn serialize_booleans(&self, values: &[bool]) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Array(ArrayValue::Boolean(values.to_vec())))
    }

    /// Encode a float array.
    pub fn serialize_floats(&self, values: &[f32]) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Array(ArrayValue::Float(values.to_vec())))
    }

    /// Encode a double array.
    pub fn serialize_doubles(&self, values: &[f64]) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Array(ArrayValue::Double(values.to_vec())))
    }

    /// Encode a long array.
    pub fn serialize_longs(&self, values: &[i64]) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Array(ArrayValue::Long(values.to_vec())))
    }

    /// Encode an integer array.
    pub fn serialize_integers(&self, values: &[i32]) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Array(ArrayValue::Integer(values.to_vec())))
    }

    /// Encode a string array.
    pub fn serialize_strings<S: AsRef<str>>(
        &self,
        values: &[S],
    ) -> Result<PersistedBytes, CodecError> {
        let values = values.iter().map(|s| s.as_ref().to_string()).collect();
        self.serialize(&Value::Array(ArrayValue::String(values)))
    }

    /// Encode an array of byte arrays.
    pub fn serialize_bytes_array<B: AsRef<[u8]>>(
        &self,
        values: &[B],
    ) -> Result<PersistedBytes, CodecError> {
        let values = values.iter().map(|b| b.as_ref().to_vec()).collect();
        self.serialize(&Value::Array(ArrayValue::Bytes(values)))
    }

    /// Encode an array of tagged values.
    pub fn serialize_values(&self, values: &[Value]) -> Result<PersistedBytes, CodecError> {
        self.serialize(&Value::Array(ArrayValue::Value(values.to_vec())))
    }

    /// Encode a map.
    pub fn serialize_map<K: AsRef<str>>(
        &self,
        entries: &[(K, Value)],
    ) -> Result<PersistedBytes, CodecError> {
        let entries = entries
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.clone()))
            .collect();
        self.serialize(&Value::Map(entries))
    }
}

fn wire_len(what: &'static str, len: usize) -> Result<u32, CodecError> {
    u32::try_from(len).map_err(|_| CodecError::TooLarge { what, len })
}

fn write_u32(out: &mut Vec<u8>, what: &'static str, len: usize) -> Result<(), CodecError> {
    out.extend_from_slice(&wire_len(what, len)?.to_le_bytes());
    Ok(())
}

fn write_blob(out: &mut Vec<u8>, what: &'static str, blob: &[u8]) -> Result<(), CodecError> {
    write_u32(out, what, blob.len())?;
    out.extend_from_slice(blob);
    Ok(())
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> Result<(), CodecError> {
    out.push(value.bb_type().code());
    match value {
        Value::Null => {}
        Value::Boolean(b) => out.push(u8::from(*b)),
        Value::Float(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Double(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Long(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Integer(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::String(s) => write_blob(out, "string", s.as_bytes())?,
        Value::Bytes(b) | Value::ByteBuffer(b) => write_blob(out, "byte array", b)?,
        Value::Array(array) => write_array(out, array)?,
        Value::Map(entries) => write_map(out, entries)?,
    }
    Ok(())
}

fn write_array(out: &mut Vec<u8>, array: &ArrayValue) -> Result<(), CodecError> {
    out.push(array.element_type().code());
    write_u32(out, "array", array.len())?;
    match array {
        ArrayValue::Boolean(values) => {
            let mut packed = vec![0u8; values.len().div_ceil(8)];
            for (i, _) in values.iter().enumerate().filter(|(_, set)| **set) {
                packed[i / 8] |= 1 << (i % 8);
            }
            out.extend_from_slice(&packed);
        }
        ArrayValue::Float(values) => {
            values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()))
        }
        ArrayValue::Double(values) => {
            values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()))
        }
        ArrayValue::Long(values) => {
            values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()))
        }
        ArrayValue::Integer(values) => {
            values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()))
        }
        ArrayValue::String(values) => {
            for s in values {
                write_blob(out, "string", s.as_bytes())?;
            }
        }
        ArrayValue::Bytes(values) => {
            for b in values {
                write_blob(out, "byte array", b)?;
            }
        }
        ArrayValue::Value(values) => {
            let mut body = Vec::new();
            let mut sizes = Vec::with_capacity(values.len());
            for value in values {
                let start = body.len();
                write_value(&mut body, value)?;
                sizes.push(body.len() - start);
            }
            for size in sizes {
                write_u32(out, "array element", size)?;
            }
            out.extend_from_slice(&body);
        }
    }
    Ok(())
}

fn write_map(out: &mut Vec<u8>, entries: &[(String, Value)]) -> Result<(), CodecError> {
    // The tag was already pushed; offsets count from it.
    let map_start = out.len() - 1;
    write_u32(out, "map", entries.len())?;
    let table_start = out.len();
    let header_len = table_start - map_start + entries.len() * 8;

    let mut body = Vec::new();
    let mut table = Vec::with_capacity(entries.len() * 8);
    for (key, value) in entries {
        let key_offset = header_len + body.len();
        write_value(&mut body, &Value::String(key.clone()))?;
        let value_offset = header_len + body.len();
        write_value(&mut body, value)?;
        write_u32(&mut table, "map offset", key_offset)?;
        write_u32(&mut table, "map offset", value_offset)?;
    }
    out.extend_from_slice(&table);
    out.extend_from_slice(&body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_layouts() {
        let ser = ByteBufferSerializer::new();
        assert_eq!(ser.serialize_null().unwrap().as_bytes(), &[0]);
        assert_eq!(ser.serialize_boolean(true).unwrap().as_bytes(), &[1, 1]);
        assert_eq!(ser.serialize_integer(-2).unwrap().as_bytes(), &[5, 0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(ser.serialize_long(1).unwrap().as_bytes(), &[4, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(ser.serialize_string("hi").unwrap().as_bytes(), &[6, 2, 0, 0, 0, b'h', b'i']);
        assert_eq!(ser.serialize_byte_buffer(&[9]).unwrap().as_bytes(), &[8, 1, 0, 0, 0, 9]);
    }

    #[test]
    fn booleans_pack_lsb_first() {
        let bytes = ByteBufferSerializer
            .serialize_booleans(&[true, false, false, true, false, false, false, false, true])
            .unwrap();
        assert_eq!(bytes.as_bytes(), &[9, 1, 9, 0, 0, 0, 0b0000_1001, 0b0000_0001]);
    }

    #[test]
    fn value_arrays_list_sizes_first() {
        let bytes = ByteBufferSerializer
            .serialize_values(&[Value::Null, Value::Integer(7)])
            .unwrap();
        assert_eq!(
            bytes.as_bytes(),
            &[9, 11, 2, 0, 0, 0, 1, 0, 0, 0, 5, 0, 0, 0, 0, 5, 7, 0, 0, 0]
        );
    }

    #[test]
    fn map_offsets_are_relative_to_the_tag() {
        let bytes = ByteBufferSerializer
            .serialize_map(&[("a", Value::Boolean(true))])
            .unwrap();
        // tag, count, (key, value) offsets, then "a" and true
        assert_eq!(
            bytes.as_bytes(),
            &[10, 1, 0, 0, 0, 13, 0, 0, 0, 19, 0, 0, 0, 6, 1, 0, 0, 0, b'a', 1, 1]
        );
    }
}

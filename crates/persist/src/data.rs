//! Read-only views over encoded buffers.
//!
//! A [`PersistedData`] is a `(buffer, offset, type)` triple: the offset is
//! local to the view and points just past the tag, so views are `Copy`,
//! never share a cursor and can be read from any number of threads. Every
//! read is bounds-checked; malformed input yields a [`CodecError`].

use crate::types::{BBType, CodecError};
use crate::value::{ArrayValue, Value};

/// Deepest nesting a full decode follows.
pub const MAX_DEPTH: usize = 64;

fn slice(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], CodecError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(CodecError::Truncated {
            offset,
            needed: len,
            available: buf.len(),
        })
}

fn array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], CodecError> {
    let mut out = [0u8; N];
    out.copy_from_slice(slice(buf, offset, N)?);
    Ok(out)
}

fn read_u32(buf: &[u8], offset: usize) -> Result<usize, CodecError> {
    Ok(u32::from_le_bytes(array(buf, offset)?) as usize)
}

/// Payload of a length-prefixed blob and the offset just past it.
fn read_blob(buf: &[u8], offset: usize) -> Result<(&[u8], usize), CodecError> {
    let len = read_u32(buf, offset)?;
    let start = offset + 4;
    let blob = slice(buf, start, len)?;
    Ok((blob, start + len))
}

fn read_tag(buf: &[u8], offset: usize) -> Result<BBType, CodecError> {
    BBType::from_code(array::<1>(buf, offset)?[0])
}

/// A typed view of one encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedData<'a> {
    buf: &'a [u8],
    offset: usize,
    ty: BBType,
    /// Bit index for booleans packed inside an array.
    bit: Option<u8>,
}

impl<'a> PersistedData<'a> {
    /// View of the tagged value at the start of `buf`.
    pub fn read(buf: &'a [u8]) -> Result<Self, CodecError> {
        Self::read_at(buf, 0)
    }

    /// View of the tagged value at `offset`.
    pub fn read_at(buf: &'a [u8], offset: usize) -> Result<Self, CodecError> {
        let ty = read_tag(buf, offset)?;
        if ty == BBType::Value {
            return Err(CodecError::UnknownType(ty.code()));
        }
        Ok(Self::at(buf, offset + 1, ty))
    }

    /// View of an untagged payload of type `ty` at `offset`.
    pub fn at(buf: &'a [u8], offset: usize, ty: BBType) -> Self {
        Self {
            buf,
            offset,
            ty,
            bit: None,
        }
    }

    fn packed_bool(buf: &'a [u8], offset: usize, bit: u8) -> Self {
        Self {
            buf,
            offset,
            ty: BBType::Boolean,
            bit: Some(bit),
        }
    }

    /// Stored type.
    pub fn bb_type(&self) -> BBType {
        self.ty
    }

    /// Whether the stored value is null.
    pub fn is_null(&self) -> bool {
        self.ty == BBType::Null
    }

    /// Whether the stored value is an array.
    pub fn is_array(&self) -> bool {
        self.ty == BBType::Array
    }

    /// Whether the stored value is a map.
    pub fn is_map(&self) -> bool {
        self.ty == BBType::Map
    }

    fn mismatch(&self, expected: &'static str) -> CodecError {
        CodecError::TypeMismatch {
            expected,
            found: self.ty,
        }
    }

    /// The only element of an array, for scalar getters. Unwrapping stops
    /// after one level: a nested array element is a mismatch.
    fn single(&self, expected: &'static str) -> Result<PersistedData<'a>, CodecError> {
        let array = self.as_array()?;
        if array.len() != 1 {
            return Err(CodecError::NotSingleElement { len: array.len() });
        }
        let element = array.get(0)?;
        if element.is_array() {
            return Err(element.mismatch(expected));
        }
        Ok(element)
    }

    /// Read as a boolean.
    pub fn as_boolean(&self) -> Result<bool, CodecError> {
        match self.ty {
            BBType::Boolean => {
                let byte = array::<1>(self.buf, self.offset)?[0];
                Ok(match self.bit {
                    Some(bit) => byte & (1 << bit) != 0,
                    None => byte != 0,
                })
            }
            BBType::Array => self.single("boolean")?.as_boolean(),
            _ => Err(self.mismatch("boolean")),
        }
    }

    fn as_number<T>(
        &self,
        from_f32: fn(f32) -> T,
        from_f64: fn(f64) -> T,
        from_i64: fn(i64) -> T,
        from_i32: fn(i32) -> T,
    ) -> Result<T, CodecError> {
        let (buf, at) = (self.buf, self.offset);
        match self.ty {
            BBType::Float => Ok(from_f32(f32::from_le_bytes(array(buf, at)?))),
            BBType::Double => Ok(from_f64(f64::from_le_bytes(array(buf, at)?))),
            BBType::Long => Ok(from_i64(i64::from_le_bytes(array(buf, at)?))),
            BBType::Integer => Ok(from_i32(i32::from_le_bytes(array(buf, at)?))),
            BBType::Array => {
                self.single("number")?.as_number(from_f32, from_f64, from_i64, from_i32)
            }
            _ => Err(self.mismatch("number")),
        }
    }

    /// Read any number as an integer, with `as` conversion.
    pub fn as_integer(&self) -> Result<i32, CodecError> {
        self.as_number(|v| v as i32, |v| v as i32, |v| v as i32, |v| v)
    }

    /// Read any number as a long, with `as` conversion.
    pub fn as_long(&self) -> Result<i64, CodecError> {
        self.as_number(|v| v as i64, |v| v as i64, |v| v, i64::from)
    }

    /// Read any number as a float, with `as` conversion.
    pub fn as_float(&self) -> Result<f32, CodecError> {
        self.as_number(|v| v, |v| v as f32, |v| v as f32, |v| v as f32)
    }

    /// Read any number as a double, with `as` conversion.
    pub fn as_double(&self) -> Result<f64, CodecError> {
        self.as_number(f64::from, |v| v, |v| v as f64, f64::from)
    }

    /// Read as a string.
    pub fn as_string(&self) -> Result<&'a str, CodecError> {
        match self.ty {
            BBType::String => {
                let (blob, _) = read_blob(self.buf, self.offset)?;
                std::str::from_utf8(blob).map_err(|_| CodecError::InvalidUtf8 {
                    offset: self.offset + 4,
                })
            }
            BBType::Array => self.single("string")?.as_string(),
            _ => Err(self.mismatch("string")),
        }
    }

    /// Read either byte type.
    pub fn as_bytes(&self) -> Result<&'a [u8], CodecError> {
        match self.ty {
            BBType::Bytes | BBType::ByteBuffer => Ok(read_blob(self.buf, self.offset)?.0),
            BBType::Array => self.single("bytes")?.as_bytes(),
            _ => Err(self.mismatch("bytes")),
        }
    }

    /// Read either byte type; the returned slice borrows the buffer.
    pub fn as_byte_buffer(&self) -> Result<&'a [u8], CodecError> {
        self.as_bytes()
    }

    /// Read as an array.
    pub fn as_array(&self) -> Result<PersistedArray<'a>, CodecError> {
        if self.ty != BBType::Array {
            return Err(self.mismatch("array"));
        }
        PersistedArray::read(self.buf, self.offset)
    }

    /// Read as a map.
    pub fn as_map(&self) -> Result<PersistedMap<'a>, CodecError> {
        if self.ty != BBType::Map {
            return Err(self.mismatch("map"));
        }
        PersistedMap::read(self.buf, self.offset)
    }

    /// Booleans of an array (or a single boolean).
    pub fn as_boolean_array(&self) -> Result<Vec<bool>, CodecError> {
        self.collect_elements(|e| e.as_boolean())
    }

    /// Numbers of an array converted to integers.
    pub fn as_integer_array(&self) -> Result<Vec<i32>, CodecError> {
        self.collect_elements(|e| e.as_integer())
    }

    /// Numbers of an array converted to longs.
    pub fn as_long_array(&self) -> Result<Vec<i64>, CodecError> {
        self.collect_elements(|e| e.as_long())
    }

    /// Numbers of an array converted to floats.
    pub fn as_float_array(&self) -> Result<Vec<f32>, CodecError> {
        self.collect_elements(|e| e.as_float())
    }

    /// Numbers of an array converted to doubles.
    pub fn as_double_array(&self) -> Result<Vec<f64>, CodecError> {
        self.collect_elements(|e| e.as_double())
    }

    /// Strings of an array.
    pub fn as_string_array(&self) -> Result<Vec<&'a str>, CodecError> {
        self.collect_elements(|e| e.as_string())
    }

    /// Byte arrays of an array.
    pub fn as_bytes_array(&self) -> Result<Vec<&'a [u8]>, CodecError> {
        self.collect_elements(|e| e.as_bytes())
    }

    /// Apply `read` to every element, treating a scalar as a one-element
    /// array.
    fn collect_elements<T>(
        &self,
        read: impl Fn(&PersistedData<'a>) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        if self.ty != BBType::Array {
            return Ok(vec![read(self)?]);
        }
        self.as_array()?.iter().map(|e| read(&e?)).collect()
    }

    /// Decode the whole value into an owned tree.
    ///
    /// Every value of a well-formed encoding owns at least its tag byte, so
    /// a decode visiting more values than the buffer has bytes must be
    /// following shared map offsets and fails with
    /// [`CodecError::TooManyValues`].
    pub fn to_value(&self) -> Result<Value, CodecError> {
        let mut budget = self.buf.len();
        self.to_value_at_depth(0, &mut budget)
    }

    fn to_value_at_depth(&self, depth: usize, budget: &mut usize) -> Result<Value, CodecError> {
        if depth > MAX_DEPTH {
            return Err(CodecError::TooDeep(MAX_DEPTH));
        }
        *budget = budget.checked_sub(1).ok_or(CodecError::TooManyValues {
            limit: self.buf.len(),
        })?;
        Ok(match self.ty {
            BBType::Null => Value::Null,
            BBType::Boolean => Value::Boolean(self.as_boolean()?),
            BBType::Float => Value::Float(self.as_float()?),
            BBType::Double => Value::Double(self.as_double()?),
            BBType::Long => Value::Long(self.as_long()?),
            BBType::Integer => Value::Integer(self.as_integer()?),
            BBType::String => Value::String(self.as_string()?.to_string()),
            BBType::Bytes => Value::Bytes(self.as_bytes()?.to_vec()),
            BBType::ByteBuffer => Value::ByteBuffer(self.as_bytes()?.to_vec()),
            BBType::Array => Value::Array(self.as_array()?.to_array_value(depth, budget)?),
            BBType::Map => {
                let map = self.as_map()?;
                let mut entries = Vec::new();
                for entry in map.iter() {
                    let (key, value) = entry?;
                    entries.push((key.to_string(), value.to_value_at_depth(depth + 1, budget)?));
                }
                Value::Map(entries)
            }
            BBType::Value => return Err(CodecError::UnknownType(BBType::Value.code())),
        })
    }
}

/// A view of an encoded array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedArray<'a> {
    buf: &'a [u8],
    element: BBType,
    len: usize,
    /// First element payload, or the size table for value arrays.
    start: usize,
}

impl<'a> PersistedArray<'a> {
    /// Read the array header at `offset` (just past the array tag).
    fn read(buf: &'a [u8], offset: usize) -> Result<Self, CodecError> {
        let element = read_tag(buf, offset)?;
        if !element.is_array_element() {
            return Err(CodecError::InvalidElementType(element));
        }
        let len = read_u32(buf, offset + 1)?;
        let start = offset + 5;
        // Reject counts the buffer cannot possibly hold before anything
        // allocates for them.
        let minimum = match element {
            BBType::Boolean => len.div_ceil(8),
            BBType::String | BBType::Bytes => len.saturating_mul(4),
            BBType::Value => len.saturating_mul(5),
            other => len.saturating_mul(other.fixed_width().unwrap_or(1)),
        };
        slice(buf, start, minimum)?;
        Ok(Self {
            buf,
            element,
            len,
            start,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element type.
    pub fn element_type(&self) -> BBType {
        self.element
    }

    /// View of element `index`.
    ///
    /// Fixed-width elements are addressed directly; strings, bytes and
    /// tagged values walk the preceding elements.
    pub fn get(&self, index: usize) -> Result<PersistedData<'a>, CodecError> {
        if index >= self.len {
            return Err(CodecError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        match self.element {
            BBType::Boolean => Ok(PersistedData::packed_bool(
                self.buf,
                self.start + index / 8,
                (index % 8) as u8,
            )),
            BBType::String | BBType::Bytes => {
                let mut at = self.start;
                for _ in 0..index {
                    at = read_blob(self.buf, at)?.1;
                }
                Ok(PersistedData::at(self.buf, at, self.element))
            }
            BBType::Value => {
                let mut at = self.start + self.len * 4;
                for i in 0..index {
                    at = at.saturating_add(read_u32(self.buf, self.start + i * 4)?);
                }
                PersistedData::read_at(self.buf, at)
            }
            fixed => {
                let width = fixed.fixed_width().unwrap_or(0);
                Ok(PersistedData::at(self.buf, self.start + index * width, fixed))
            }
        }
    }

    /// Elements in order.
    pub fn iter(&self) -> ArrayIter<'a> {
        ArrayIter {
            array: *self,
            index: 0,
            cursor: match self.element {
                BBType::Value => self.start + self.len * 4,
                _ => self.start,
            },
        }
    }

    fn to_array_value(&self, depth: usize, budget: &mut usize) -> Result<ArrayValue, CodecError> {
        let elements = self.iter();
        Ok(match self.element {
            BBType::Boolean => {
                ArrayValue::Boolean(elements.map(|e| e?.as_boolean()).collect::<Result<_, _>>()?)
            }
            BBType::Float => {
                ArrayValue::Float(elements.map(|e| e?.as_float()).collect::<Result<_, _>>()?)
            }
            BBType::Double => {
                ArrayValue::Double(elements.map(|e| e?.as_double()).collect::<Result<_, _>>()?)
            }
            BBType::Long => {
                ArrayValue::Long(elements.map(|e| e?.as_long()).collect::<Result<_, _>>()?)
            }
            BBType::Integer => {
                ArrayValue::Integer(elements.map(|e| e?.as_integer()).collect::<Result<_, _>>()?)
            }
            BBType::String => ArrayValue::String(
                elements
                    .map(|e| e?.as_string().map(str::to_string))
                    .collect::<Result<_, _>>()?,
            ),
            BBType::Bytes => ArrayValue::Bytes(
                elements
                    .map(|e| e?.as_bytes().map(<[u8]>::to_vec))
                    .collect::<Result<_, _>>()?,
            ),
            BBType::Value => ArrayValue::Value(
                elements
                    .map(|e| e?.to_value_at_depth(depth + 1, budget))
                    .collect::<Result<_, _>>()?,
            ),
            other => return Err(CodecError::InvalidElementType(other)),
        })
    }
}

impl<'a> IntoIterator for PersistedArray<'a> {
    type Item = Result<PersistedData<'a>, CodecError>;
    type IntoIter = ArrayIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential walk over an array's elements.
///
/// Variable-size elements are visited with a running cursor, so a full walk
/// is linear in the array size.
#[derive(Debug, Clone)]
pub struct ArrayIter<'a> {
    array: PersistedArray<'a>,
    index: usize,
    cursor: usize,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Result<PersistedData<'a>, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.array.len {
            return None;
        }
        let index = self.index;
        self.index += 1;
        let buf = self.array.buf;
        let item = match self.array.element {
            BBType::String | BBType::Bytes => read_blob(buf, self.cursor).map(|(_, next)| {
                let element = PersistedData::at(buf, self.cursor, self.array.element);
                self.cursor = next;
                element
            }),
            BBType::Value => read_u32(buf, self.array.start + index * 4).and_then(|size| {
                let element = PersistedData::read_at(buf, self.cursor)?;
                self.cursor = self.cursor.saturating_add(size);
                Ok(element)
            }),
            _ => self.array.get(index),
        };
        if item.is_err() {
            // A malformed element ends the walk.
            self.index = self.array.len;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len - self.index;
        (remaining, Some(remaining))
    }
}

/// A view of an encoded map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedMap<'a> {
    buf: &'a [u8],
    /// Offset of the map tag; entry offsets are relative to it.
    origin: usize,
    len: usize,
}

impl<'a> PersistedMap<'a> {
    /// Read the map header at `offset` (just past the map tag).
    fn read(buf: &'a [u8], offset: usize) -> Result<Self, CodecError> {
        let len = read_u32(buf, offset)?;
        slice(buf, offset + 4, len.saturating_mul(8))?;
        Ok(Self {
            buf,
            origin: offset.saturating_sub(1),
            len,
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Key and value views of entry `index`.
    pub fn entry(&self, index: usize) -> Result<(&'a str, PersistedData<'a>), CodecError> {
        if index >= self.len {
            return Err(CodecError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let row = self.origin + 5 + index * 8;
        let key_offset = read_u32(self.buf, row)?;
        let value_offset = read_u32(self.buf, row + 4)?;
        let key = PersistedData::read_at(self.buf, self.origin.saturating_add(key_offset))?;
        if key.bb_type() != BBType::String {
            return Err(key.mismatch("string map key"));
        }
        let value = PersistedData::read_at(self.buf, self.origin.saturating_add(value_offset))?;
        Ok((key.as_string()?, value))
    }

    /// Value stored under `key`, scanning the entries in order.
    pub fn get(&self, key: &str) -> Result<Option<PersistedData<'a>>, CodecError> {
        for entry in self.iter() {
            let (candidate, value) = entry?;
            if candidate == key {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Whether some entry has `key`.
    pub fn has(&self, key: &str) -> Result<bool, CodecError> {
        Ok(self.get(key)?.is_some())
    }

    /// Keys in stored order.
    pub fn keys(&self) -> Result<Vec<&'a str>, CodecError> {
        self.iter().map(|entry| entry.map(|(key, _)| key)).collect()
    }

    /// Entries in stored order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = Result<(&'a str, PersistedData<'a>), CodecError>> + 'a {
        let map = *self;
        (0..map.len).map(move |index| map.entry(index))
    }
}

//! Owned value trees, the input of the serializer and the output of a full
//! decode.

use crate::types::BBType;

/// An owned persisted value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A 32-bit float.
    Float(f32),
    /// A 64-bit float.
    Double(f64),
    /// A 64-bit integer.
    Long(i64),
    /// A 32-bit integer.
    Integer(i32),
    /// A string.
    String(String),
    /// A byte array.
    Bytes(Vec<u8>),
    /// A byte buffer.
    ByteBuffer(Vec<u8>),
    /// A homogeneous array.
    Array(ArrayValue),
    /// String-keyed entries in insertion order.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Wire tag of this value.
    pub fn bb_type(&self) -> BBType {
        match self {
            Value::Null => BBType::Null,
            Value::Boolean(_) => BBType::Boolean,
            Value::Float(_) => BBType::Float,
            Value::Double(_) => BBType::Double,
            Value::Long(_) => BBType::Long,
            Value::Integer(_) => BBType::Integer,
            Value::String(_) => BBType::String,
            Value::Bytes(_) => BBType::Bytes,
            Value::ByteBuffer(_) => BBType::ByteBuffer,
            Value::Array(_) => BBType::Array,
            Value::Map(_) => BBType::Map,
        }
    }

    /// Map value from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Array payloads, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue {
    /// Bit-packed booleans.
    Boolean(Vec<bool>),
    /// Floats.
    Float(Vec<f32>),
    /// Doubles.
    Double(Vec<f64>),
    /// Longs.
    Long(Vec<i64>),
    /// Integers.
    Integer(Vec<i32>),
    /// Strings.
    String(Vec<String>),
    /// Byte arrays.
    Bytes(Vec<Vec<u8>>),
    /// Tagged values of any type.
    Value(Vec<Value>),
}

impl ArrayValue {
    /// Element type written after the array tag.
    pub fn element_type(&self) -> BBType {
        match self {
            ArrayValue::Boolean(_) => BBType::Boolean,
            ArrayValue::Float(_) => BBType::Float,
            ArrayValue::Double(_) => BBType::Double,
            ArrayValue::Long(_) => BBType::Long,
            ArrayValue::Integer(_) => BBType::Integer,
            ArrayValue::String(_) => BBType::String,
            ArrayValue::Bytes(_) => BBType::Bytes,
            ArrayValue::Value(_) => BBType::Value,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Boolean(v) => v.len(),
            ArrayValue::Float(v) => v.len(),
            ArrayValue::Double(v) => v.len(),
            ArrayValue::Long(v) => v.len(),
            ArrayValue::Integer(v) => v.len(),
            ArrayValue::String(v) => v.len(),
            ArrayValue::Bytes(v) => v.len(),
            ArrayValue::Value(v) => v.len(),
        }
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    bool => Boolean,
    f32 => Float,
    f64 => Double,
    i64 => Long,
    i32 => Integer,
    String => String,
    ArrayValue => Array,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_variants() {
        assert_eq!(Value::from(3).bb_type(), BBType::Integer);
        assert_eq!(Value::from(3i64).bb_type(), BBType::Long);
        assert_eq!(Value::from("x").bb_type(), BBType::String);
        assert_eq!(Value::from(vec![1u8]).bb_type(), BBType::Bytes);
        let array = ArrayValue::Value(vec![Value::Null]);
        assert_eq!(array.element_type(), BBType::Value);
        assert_eq!(Value::from(array).bb_type(), BBType::Array);
    }

    #[test]
    fn map_keeps_insertion_order() {
        let map = Value::map([("b", Value::Null), ("a", Value::Boolean(true))]);
        match map {
            Value::Map(entries) => {
                assert_eq!(entries[0].0, "b");
                assert_eq!(entries[1].0, "a");
            }
            other => panic!("not a map: {other:?}"),
        }
    }
}

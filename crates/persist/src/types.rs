//! Type tags and codec errors.

use std::fmt;
use thiserror::Error;

/// One-byte type tag written in front of every tagged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BBType {
    /// No payload.
    Null = 0,
    /// One byte, non-zero is true.
    Boolean = 1,
    /// 32-bit IEEE float.
    Float = 2,
    /// 64-bit IEEE float.
    Double = 3,
    /// 64-bit signed integer.
    Long = 4,
    /// 32-bit signed integer.
    Integer = 5,
    /// Length-prefixed UTF-8.
    String = 6,
    /// Length-prefixed raw bytes.
    Bytes = 7,
    /// Length-prefixed raw bytes, kept apart from [`BBType::Bytes`] so
    /// readers can tell buffers from byte arrays.
    ByteBuffer = 8,
    /// Homogeneous array; the next byte is the element type.
    Array = 9,
    /// String-keyed map with an offset table.
    Map = 10,
    /// Element type of arrays whose elements are tagged values.
    Value = 11,
}

impl BBType {
    /// Wire code of the tag.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Tag for a wire code.
    pub fn from_code(code: u8) -> Result<Self, CodecError> {
        Ok(match code {
            0 => Self::Null,
            1 => Self::Boolean,
            2 => Self::Float,
            3 => Self::Double,
            4 => Self::Long,
            5 => Self::Integer,
            6 => Self::String,
            7 => Self::Bytes,
            8 => Self::ByteBuffer,
            9 => Self::Array,
            10 => Self::Map,
            11 => Self::Value,
            other => return Err(CodecError::UnknownType(other)),
        })
    }

    /// Width of a fixed-size payload, `None` for variable-size types.
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Null => Some(0),
            Self::Boolean => Some(1),
            Self::Float | Self::Integer => Some(4),
            Self::Double | Self::Long => Some(8),
            _ => None,
        }
    }

    /// Whether this tag may follow an [`BBType::Array`] tag.
    pub const fn is_array_element(self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::Float
                | Self::Double
                | Self::Long
                | Self::Integer
                | Self::String
                | Self::Bytes
                | Self::Value
        )
    }

    /// Whether values of this type convert to numbers.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Float | Self::Double | Self::Long | Self::Integer)
    }
}

impl fmt::Display for BBType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Double => "double",
            Self::Long => "long",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::ByteBuffer => "byte buffer",
            Self::Array => "array",
            Self::Map => "map",
            Self::Value => "value",
        };
        f.write_str(name)
    }
}

/// Errors raised while encoding or reading persisted data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The value has a different type than the getter reads.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// What the getter reads.
        expected: &'static str,
        /// What is stored.
        found: BBType,
    },
    /// A scalar was read from an array that does not hold exactly one element.
    #[error("expected a single element, found an array of {len}")]
    NotSingleElement {
        /// Array length.
        len: usize,
    },
    /// An array index outside `[0, len)`.
    #[error("index {index} out of bounds for array of {len}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Array length.
        len: usize,
    },
    /// The buffer ends before the value does.
    #[error("truncated data: {needed} bytes needed at offset {offset}, buffer holds {available}")]
    Truncated {
        /// Where the read started.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Buffer length.
        available: usize,
    },
    /// A tag byte outside the known range.
    #[error("unknown type tag {0}")]
    UnknownType(u8),
    /// An array element type that arrays cannot hold.
    #[error("arrays cannot hold {0} elements")]
    InvalidElementType(BBType),
    /// A string payload that is not UTF-8.
    #[error("invalid utf-8 in string at offset {offset}")]
    InvalidUtf8 {
        /// Payload offset.
        offset: usize,
    },
    /// A length that does not fit the 32-bit wire field.
    #[error("{what} of {len} does not fit in 32 bits")]
    TooLarge {
        /// What was measured.
        what: &'static str,
        /// Its length.
        len: usize,
    },
    /// Values nested deeper than a full decode allows.
    #[error("values nested deeper than {0} levels")]
    TooDeep(usize),
    /// A full decode visited more values than the buffer has bytes.
    #[error("decoded more than {limit} values from a {limit}-byte buffer")]
    TooManyValues {
        /// The buffer length, which caps the value count.
        limit: usize,
    },
}

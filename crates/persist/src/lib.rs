#![warn(missing_docs)]
//! Structured binary persistence.
//!
//! Values are written as tagged little-endian payloads by
//! [`ByteBufferSerializer`] and read back through zero-copy
//! [`PersistedData`] views, which address arrays by index and maps by key
//! without decoding the rest of the buffer.

mod data;
mod serializer;
mod types;
mod value;

pub use data::*;
pub use serializer::*;
pub use types::*;
pub use value::*;

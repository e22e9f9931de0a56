//! # wireflex
//!
//! A reflection-driven binary serialization library with a Protocol Buffers
//! compatible wire format.
//!
//! A type describes its fields once, in one [`Message::fields`] method, and
//! that single description drives three backends over the same call
//! sequence:
//!
//! - [`SizeCalculator`] computes the exact serialized byte length,
//! - [`Encoder`] writes tag/length/value triples into a buffer pre-sized by
//!   the size pass,
//! - [`Decoder`] parses the bytes into a field-number-indexed node arena
//!   and reads typed values back out.
//!
//! Other format backends (JSON, XML, generated code) consume the same
//! [`Archive`] contract; this crate implements the binary wire format.
//!
//! ## Describing a type
//!
//! ```rust
//! use wireflex::{Archive, Field, FieldType, Message, Result};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Person {
//!     id: u32,
//!     has_id: bool,
//!     name: String,
//! }
//!
//! impl Message for Person {
//!     fn fields<A: Archive>(&mut self, archive: &mut A) -> Result<()> {
//!         archive.scalar(
//!             Field::new("id", 1, FieldType::Uint32, &mut self.id)
//!                 .with_presence(&mut self.has_id),
//!         )?;
//!         archive.scalar(Field::new("name", 2, FieldType::String, &mut self.name))?;
//!         Ok(())
//!     }
//! }
//!
//! let mut person = Person { id: 150, has_id: true, name: "ada".into() };
//! let bytes = wireflex::encode(&mut person).unwrap();
//! assert_eq!(bytes.len(), wireflex::encoded_size(&mut person).unwrap());
//!
//! let decoded: Person = wireflex::decode(&bytes).unwrap();
//! assert_eq!(decoded, person);
//! ```
//!
//! `fields` takes `&mut self` because the decoder writes through the same
//! descriptors the other backends read through; the size and encode passes
//! never mutate.
//!
//! ## Failure model
//!
//! Bad input is reported through [`WireError`]: truncated buffers, overlong
//! varints, the unassigned wire types 6 and 7, invalid UTF-8 in a string
//! field. Bad *field descriptions* are defects in the calling code, not
//! input, and panic: an impossible field-type pairing, a group-typed field,
//! or a map entry missing its key or value. A field whose observed wire
//! type disagrees with its declared one is neither: it is skipped and the
//! field keeps its default, tolerating producer/consumer schema drift.
//!
//! The codec is synchronous and owns no shared state; recursion depth
//! equals message nesting depth, so callers decoding hostile input should
//! impose their own nesting cap.

mod decode;
mod encode;
mod field;
mod reader;
mod scalar;
mod size;
mod wire;

use std::collections::BTreeMap;

use bytes::Bytes;

pub use crate::decode::Decoder;
pub use crate::encode::Encoder;
pub use crate::field::{Field, FieldType, WireType};
pub use crate::reader::{Node, Reader};
pub use crate::scalar::Scalar;
pub use crate::size::SizeCalculator;
pub use crate::wire::{
    varint_size, zigzag_decode32, zigzag_decode64, zigzag_encode32, zigzag_encode64,
};

/// Errors produced while decoding a byte buffer.
///
/// Encoding has no input to go wrong on; every variant here reports a
/// malformed or truncated wire stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The buffer ended mid-varint, mid-fixed-width value, or short of a
    /// declared length-delimited payload. The offset is relative to the
    /// innermost length-delimited scope being parsed.
    #[error("unexpected end of input at offset {offset}")]
    Truncated { offset: usize },
    /// A varint ran past the 10-byte maximum.
    #[error("varint exceeds 10 bytes at offset {offset}")]
    VarintTooLong { offset: usize },
    /// A tag carried one of the unassigned wire types 6 or 7.
    #[error("unknown wire type {wire_type} at offset {offset}")]
    UnknownWireType { wire_type: u8, offset: usize },
    /// A string field held bytes that are not valid UTF-8.
    #[error("invalid UTF-8 in string field {number}")]
    InvalidUtf8 { number: u32 },
}

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, WireError>;

/// A self-describing serializable type.
///
/// The one method issues a descriptor call per field, in a fixed
/// declaration order that is authoritative for field order on encode. The
/// same body runs against every backend.
pub trait Message: Default {
    /// Describes each field to `archive`, in declaration order.
    fn fields<A: Archive>(&mut self, archive: &mut A) -> Result<()>;
}

/// The capability interface between a type's field descriptions and one
/// format backend.
///
/// Implemented by [`SizeCalculator`], [`Encoder`] and [`Decoder`]; a field
/// description calls the method matching its shape and the backend decides
/// what the call means.
pub trait Archive {
    /// A singular scalar field.
    fn scalar<T: Scalar>(&mut self, field: Field<'_, T>) -> Result<()>;

    /// A singular nested-message field.
    fn message<M: Message>(&mut self, field: Field<'_, M>) -> Result<()>;

    /// A repeated scalar field, packed or unpacked per the descriptor.
    fn repeated<T: Scalar>(&mut self, field: Field<'_, Vec<T>>) -> Result<()>;

    /// A repeated nested-message field. Always unpacked.
    fn repeated_message<M: Message>(&mut self, field: Field<'_, Vec<M>>) -> Result<()>;

    /// A map field with scalar values. Each entry travels as a synthetic
    /// two-field sub-message: key at field number 1, value at 2.
    fn map<K, V>(&mut self, field: Field<'_, BTreeMap<K, V>>) -> Result<()>
    where
        K: Scalar + Ord,
        V: Scalar;

    /// A map field with message values.
    fn map_message<K, M>(&mut self, field: Field<'_, BTreeMap<K, M>>) -> Result<()>
    where
        K: Scalar + Ord,
        M: Message;
}

/// Computes the exact number of bytes [`encode`] will produce for
/// `message`.
pub fn encoded_size<M: Message>(message: &mut M) -> Result<usize> {
    let mut calculator = SizeCalculator::new();
    message.fields(&mut calculator)?;
    Ok(calculator.size() as usize)
}

/// Encodes `message` to its wire representation.
///
/// Runs the size pass first and reserves the output buffer once, so the
/// write pass never reallocates.
pub fn encode<M: Message>(message: &mut M) -> Result<Bytes> {
    let size = encoded_size(message)?;
    let mut encoder = Encoder::with_capacity(size);
    message.fields(&mut encoder)?;
    Ok(encoder.into_bytes())
}

/// Decodes a message from its wire representation.
///
/// Fields absent from `input` keep their default values and their presence
/// flags stay false; that is not an error.
pub fn decode<M: Message>(input: &[u8]) -> Result<M> {
    let mut message = M::default();
    let mut decoder = Decoder::parse(input)?;
    message.fields(&mut decoder)?;
    Ok(message)
}

//! Scalar wire values.
//!
//! [`Scalar`] connects a Rust value type to the byte layouts its declared
//! [`FieldType`] allows. The size pass, the write pass and the decoder all
//! dispatch through it, so the three stay in agreement per type.
//!
//! Pairing a value with a field type it cannot carry (for example an `i32`
//! declared `Double`) is a defect in the type's field descriptions, not bad
//! input, and panics.

use bytes::{Bytes, BytesMut};

use crate::field::FieldType;
use crate::reader::Node;
use crate::wire;
use crate::{Result, WireError};

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
    impl Sealed for String {}
    impl Sealed for bytes::Bytes {}
}

/// A value that can sit directly in a field, as opposed to a nested message.
///
/// Implemented for `i32`, `i64`, `u32`, `u64`, `f32`, `f64`, `bool`,
/// `String` and [`bytes::Bytes`]. Enum fields are carried as `i32` with
/// [`FieldType::Enum`].
pub trait Scalar: Default + sealed::Sealed {
    /// Serialized size of the raw value, excluding tag and length prefix.
    fn wire_size(&self, ty: FieldType) -> u64;

    /// Appends the raw value bytes. Length prefixes for length-delimited
    /// types are the archive's responsibility.
    fn put_value(&self, ty: FieldType, out: &mut BytesMut);

    /// Converts a parsed node into a typed value. The caller has already
    /// checked that the node's wire type matches the declared field type.
    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self>;

    /// Reads one element out of a packed length-delimited run, advancing
    /// `buf` by the element's stride.
    fn from_packed(buf: &mut &[u8], ty: FieldType) -> Result<Self>;

    /// True when the value is omitted from the wire entirely. Zero-length
    /// strings and bytes encode as nothing, making them indistinguishable
    /// from absent fields.
    fn is_elided(&self) -> bool {
        false
    }
}

impl Scalar for i32 {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Int32 | FieldType::Enum => wire::varint_size(*self as u32 as u64) as u64,
            FieldType::Sfixed32 => 4,
            FieldType::Sint32 => wire::varint_size(wire::zigzag_encode32(*self) as u64) as u64,
            other => panic!("i32 value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::Int32 | FieldType::Enum => wire::put_varint(out, *self as u32 as u64),
            FieldType::Sfixed32 => wire::put_fixed32(out, *self as u32),
            FieldType::Sint32 => wire::put_varint(out, wire::zigzag_encode32(*self) as u64),
            other => panic!("i32 value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Int32 | FieldType::Enum | FieldType::Sfixed32 => {
                node.scalar() as u32 as i32
            }
            FieldType::Sint32 => wire::zigzag_decode32(node.scalar() as u32),
            other => panic!("i32 value cannot carry field type {other:?}"),
        })
    }

    fn from_packed(buf: &mut &[u8], ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Int32 | FieldType::Enum => wire::read_varint(buf, 0)? as u32 as i32,
            FieldType::Sfixed32 => wire::read_fixed32(buf, 0)? as i32,
            FieldType::Sint32 => wire::zigzag_decode32(wire::read_varint(buf, 0)? as u32),
            other => panic!("i32 value cannot carry field type {other:?}"),
        })
    }
}

impl Scalar for i64 {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Int64 => wire::varint_size(*self as u64) as u64,
            FieldType::Sfixed64 => 8,
            FieldType::Sint64 => wire::varint_size(wire::zigzag_encode64(*self)) as u64,
            other => panic!("i64 value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::Int64 => wire::put_varint(out, *self as u64),
            FieldType::Sfixed64 => wire::put_fixed64(out, *self as u64),
            FieldType::Sint64 => wire::put_varint(out, wire::zigzag_encode64(*self)),
            other => panic!("i64 value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Int64 | FieldType::Sfixed64 => node.scalar() as i64,
            FieldType::Sint64 => wire::zigzag_decode64(node.scalar()),
            other => panic!("i64 value cannot carry field type {other:?}"),
        })
    }

    fn from_packed(buf: &mut &[u8], ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Int64 => wire::read_varint(buf, 0)? as i64,
            FieldType::Sfixed64 => wire::read_fixed64(buf, 0)? as i64,
            FieldType::Sint64 => wire::zigzag_decode64(wire::read_varint(buf, 0)?),
            other => panic!("i64 value cannot carry field type {other:?}"),
        })
    }
}

impl Scalar for u32 {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Uint32 => wire::varint_size(*self as u64) as u64,
            FieldType::Fixed32 => 4,
            other => panic!("u32 value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::Uint32 => wire::put_varint(out, *self as u64),
            FieldType::Fixed32 => wire::put_fixed32(out, *self),
            other => panic!("u32 value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Uint32 | FieldType::Fixed32 => node.scalar() as u32,
            other => panic!("u32 value cannot carry field type {other:?}"),
        })
    }

    fn from_packed(buf: &mut &[u8], ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Uint32 => wire::read_varint(buf, 0)? as u32,
            FieldType::Fixed32 => wire::read_fixed32(buf, 0)?,
            other => panic!("u32 value cannot carry field type {other:?}"),
        })
    }
}

impl Scalar for u64 {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Uint64 => wire::varint_size(*self) as u64,
            FieldType::Fixed64 => 8,
            other => panic!("u64 value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::Uint64 => wire::put_varint(out, *self),
            FieldType::Fixed64 => wire::put_fixed64(out, *self),
            other => panic!("u64 value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Uint64 | FieldType::Fixed64 => node.scalar(),
            other => panic!("u64 value cannot carry field type {other:?}"),
        })
    }

    fn from_packed(buf: &mut &[u8], ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Uint64 => wire::read_varint(buf, 0)?,
            FieldType::Fixed64 => wire::read_fixed64(buf, 0)?,
            other => panic!("u64 value cannot carry field type {other:?}"),
        })
    }
}

/// Floats travel as their IEEE-754 bit pattern in a fixed32, reinterpreted
/// with explicit bit casts on both sides.
impl Scalar for f32 {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Float => 4,
            other => panic!("f32 value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::Float => wire::put_fixed32(out, self.to_bits()),
            other => panic!("f32 value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Float => f32::from_bits(node.scalar() as u32),
            other => panic!("f32 value cannot carry field type {other:?}"),
        })
    }

    fn from_packed(buf: &mut &[u8], ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Float => f32::from_bits(wire::read_fixed32(buf, 0)?),
            other => panic!("f32 value cannot carry field type {other:?}"),
        })
    }
}

impl Scalar for f64 {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Double => 8,
            other => panic!("f64 value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::Double => wire::put_fixed64(out, self.to_bits()),
            other => panic!("f64 value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Double => f64::from_bits(node.scalar()),
            other => panic!("f64 value cannot carry field type {other:?}"),
        })
    }

    fn from_packed(buf: &mut &[u8], ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Double => f64::from_bits(wire::read_fixed64(buf, 0)?),
            other => panic!("f64 value cannot carry field type {other:?}"),
        })
    }
}

impl Scalar for bool {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Bool => 1,
            other => panic!("bool value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::Bool => wire::put_varint(out, *self as u64),
            other => panic!("bool value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Bool => node.scalar() != 0,
            other => panic!("bool value cannot carry field type {other:?}"),
        })
    }

    fn from_packed(buf: &mut &[u8], ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Bool => wire::read_varint(buf, 0)? != 0,
            other => panic!("bool value cannot carry field type {other:?}"),
        })
    }
}

impl Scalar for String {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::String | FieldType::Bytes => self.len() as u64,
            other => panic!("string value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::String | FieldType::Bytes => out.extend_from_slice(self.as_bytes()),
            other => panic!("string value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        match ty {
            FieldType::String | FieldType::Bytes => std::str::from_utf8(node.bytes())
                .map(str::to_owned)
                .map_err(|_| WireError::InvalidUtf8 {
                    number: node.number(),
                }),
            other => panic!("string value cannot carry field type {other:?}"),
        }
    }

    fn from_packed(_buf: &mut &[u8], _ty: FieldType) -> Result<Self> {
        panic!("string fields cannot be packed");
    }

    fn is_elided(&self) -> bool {
        self.is_empty()
    }
}

impl Scalar for Bytes {
    fn wire_size(&self, ty: FieldType) -> u64 {
        match ty {
            FieldType::Bytes | FieldType::String => self.len() as u64,
            other => panic!("bytes value cannot carry field type {other:?}"),
        }
    }

    fn put_value(&self, ty: FieldType, out: &mut BytesMut) {
        match ty {
            FieldType::Bytes | FieldType::String => out.extend_from_slice(self),
            other => panic!("bytes value cannot carry field type {other:?}"),
        }
    }

    fn from_node(node: &Node<'_>, ty: FieldType) -> Result<Self> {
        Ok(match ty {
            FieldType::Bytes | FieldType::String => Bytes::copy_from_slice(node.bytes()),
            other => panic!("bytes value cannot carry field type {other:?}"),
        })
    }

    fn from_packed(_buf: &mut &[u8], _ty: FieldType) -> Result<Self> {
        panic!("bytes fields cannot be packed");
    }

    fn is_elided(&self) -> bool {
        self.is_empty()
    }
}

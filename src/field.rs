//! Field descriptors and the field-type to wire-type mapping.

/// The six low-level byte-layout categories of the wire format.
///
/// The numeric values are part of the wire format: the low three bits of
/// every tag hold one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// int32, int64, uint32, uint64, sint32, sint64, bool, enum
    Varint = 0,
    /// fixed64, sfixed64, double
    Fixed64 = 1,
    /// string, bytes, embedded messages, packed repeated fields
    LengthDelimited = 2,
    /// group start (deprecated)
    StartGroup = 3,
    /// group end (deprecated)
    EndGroup = 4,
    /// fixed32, sfixed32, float
    Fixed32 = 5,
}

impl WireType {
    /// Maps the low three bits of a tag to a wire type.
    ///
    /// Returns `None` for the unassigned values 6 and 7.
    pub(crate) fn from_raw(raw: u8) -> Option<WireType> {
        match raw {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

/// The logical/protocol type of a field.
///
/// Discriminants match the protobuf descriptor numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl FieldType {
    /// Maps a field type onto its wire type.
    ///
    /// # Panics
    ///
    /// Panics for [`FieldType::Group`]: producing a wire type for an
    /// unsupported field type would corrupt the stream undetectably, so a
    /// wrong mapping is never returned.
    pub fn wire_type(self) -> WireType {
        match self {
            FieldType::Double | FieldType::Fixed64 | FieldType::Sfixed64 => WireType::Fixed64,
            FieldType::Float | FieldType::Fixed32 | FieldType::Sfixed32 => WireType::Fixed32,
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Uint32
            | FieldType::Uint64
            | FieldType::Bool
            | FieldType::Enum
            | FieldType::Sint32
            | FieldType::Sint64 => WireType::Varint,
            FieldType::String | FieldType::Bytes | FieldType::Message => {
                WireType::LengthDelimited
            }
            FieldType::Group => panic!("group fields have no wire type"),
        }
    }

    /// True for types whose values are preceded by a varint byte count.
    pub fn is_length_delimited(self) -> bool {
        matches!(self, FieldType::String | FieldType::Bytes | FieldType::Message)
    }
}

/// A transient descriptor for one field of a message.
///
/// Created inside a type's [`Message::fields`](crate::Message::fields) call
/// and consumed immediately by the archive; it is never stored and never
/// outlives the call that created it.
///
/// A `number` of 0 means "no binary encoding": the field exists for other
/// format backends only and every binary archive skips it.
pub struct Field<'a, T> {
    name: &'static str,
    number: u32,
    ty: FieldType,
    value_ty: Option<FieldType>,
    value: &'a mut T,
    has: Option<&'a mut bool>,
    packed: bool,
}

impl<'a, T> Field<'a, T> {
    /// Creates a descriptor for a singular or repeated field.
    pub fn new(name: &'static str, number: u32, ty: FieldType, value: &'a mut T) -> Self {
        Field {
            name,
            number,
            ty,
            value_ty: None,
            value,
            has: None,
            packed: false,
        }
    }

    /// Creates a descriptor for a map field. `key_ty` describes the key
    /// (wire field number 1 inside each entry), `value_ty` the value
    /// (wire field number 2).
    pub fn map(
        name: &'static str,
        number: u32,
        key_ty: FieldType,
        value_ty: FieldType,
        value: &'a mut T,
    ) -> Self {
        Field {
            name,
            number,
            ty: key_ty,
            value_ty: Some(value_ty),
            value,
            has: None,
            packed: false,
        }
    }

    /// Attaches a caller-owned presence flag.
    ///
    /// Fields without one are treated as always present (collections use
    /// "non-empty" as their presence notion instead).
    pub fn with_presence(mut self, has: &'a mut bool) -> Self {
        self.has = Some(has);
        self
    }

    /// Marks a repeated scalar field for packed encoding: one tag and one
    /// length prefix covering the concatenated element values.
    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    /// The display/JSON key. Not used by the binary codec, carried for
    /// uniformity across format backends.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The protocol field number, or 0 for fields with no binary encoding.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The declared field type (the key type for map fields).
    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    /// The declared value type of a map field.
    pub fn value_type(&self) -> Option<FieldType> {
        self.value_ty
    }

    /// The wire type of the declared field type.
    pub fn wire_type(&self) -> WireType {
        self.ty.wire_type()
    }

    /// Whether packed encoding was requested.
    pub fn is_packed(&self) -> bool {
        self.packed
    }

    /// Presence per the `has` contract: fields without a flag are always
    /// present.
    pub fn present(&self) -> bool {
        self.has.as_ref().map_or(true, |h| **h)
    }

    /// Sets the presence flag, if the field carries one.
    pub fn mark_present(&mut self) {
        if let Some(has) = self.has.as_mut() {
            **has = true;
        }
    }

    /// Borrows the in-memory value.
    pub fn value(&self) -> &T {
        self.value
    }

    /// Mutably borrows the in-memory value.
    pub fn value_mut(&mut self) -> &mut T {
        self.value
    }
}

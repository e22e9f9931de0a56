//! Size pass: computes the exact serialized length without writing bytes.
//!
//! Nested messages and maps are length-prefixed, so their sizes must be
//! known before any byte is written, and the top-level encode pass reserves
//! its whole output buffer from this pass. Any disagreement between this
//! module and the write pass in `encode` is a defect.

use std::collections::BTreeMap;

use crate::field::{Field, FieldType, WireType};
use crate::scalar::Scalar;
use crate::wire::varint_size;
use crate::{Archive, Message, Result};

/// Archive backend that accumulates byte counts.
#[derive(Default)]
pub struct SizeCalculator {
    size: u64,
}

impl SizeCalculator {
    pub fn new() -> Self {
        SizeCalculator::default()
    }

    /// Total bytes counted so far.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Size of the varint tag for a field.
pub(crate) fn tag_size(number: u32, wire_type: WireType) -> u64 {
    varint_size(((number as u64) << 3) | wire_type as u64) as u64
}

/// Serialized size of a nested message's own fields, excluding tag and
/// length prefix.
pub(crate) fn message_size<M: Message>(message: &mut M) -> Result<u64> {
    let mut calculator = SizeCalculator::new();
    message.fields(&mut calculator)?;
    Ok(calculator.size)
}

/// Size of one half of a map entry: the 1-byte inner tag, the length
/// prefix when the type is length-delimited, and the value bytes.
///
/// Inner field numbers are 1 and 2, so the inner tag always fits one byte.
pub(crate) fn map_part_size(value_len: u64, ty: FieldType) -> u64 {
    let mut part = 1 + value_len;
    if ty.is_length_delimited() {
        part += varint_size(value_len) as u64;
    }
    part
}

impl Archive for SizeCalculator {
    fn scalar<T: Scalar>(&mut self, field: Field<'_, T>) -> Result<()> {
        if !field.present() || field.number() == 0 {
            return Ok(());
        }
        let ty = field.field_type();
        let value = field.value();
        if value.is_elided() {
            return Ok(());
        }
        let len = value.wire_size(ty);
        self.size += tag_size(field.number(), ty.wire_type());
        if ty.is_length_delimited() {
            self.size += varint_size(len) as u64;
        }
        self.size += len;
        Ok(())
    }

    fn message<M: Message>(&mut self, mut field: Field<'_, M>) -> Result<()> {
        if !field.present() || field.number() == 0 {
            return Ok(());
        }
        let len = message_size(field.value_mut())?;
        self.size += tag_size(field.number(), WireType::LengthDelimited);
        self.size += varint_size(len) as u64;
        self.size += len;
        Ok(())
    }

    fn repeated<T: Scalar>(&mut self, field: Field<'_, Vec<T>>) -> Result<()> {
        if !field.present() || field.number() == 0 || field.value().is_empty() {
            return Ok(());
        }
        let ty = field.field_type();
        if field.is_packed() {
            if ty.is_length_delimited() {
                panic!("packed encoding requires a numeric field type, not {ty:?}");
            }
            // One tag, one length prefix over the concatenated raw values.
            let length: u64 = field.value().iter().map(|item| item.wire_size(ty)).sum();
            self.size += tag_size(field.number(), WireType::LengthDelimited);
            self.size += varint_size(length) as u64;
            self.size += length;
        } else {
            for item in field.value() {
                let len = item.wire_size(ty);
                self.size += tag_size(field.number(), ty.wire_type());
                if ty.is_length_delimited() {
                    self.size += varint_size(len) as u64;
                }
                self.size += len;
            }
        }
        Ok(())
    }

    fn repeated_message<M: Message>(&mut self, mut field: Field<'_, Vec<M>>) -> Result<()> {
        if !field.present() || field.number() == 0 || field.value().is_empty() {
            return Ok(());
        }
        let number = field.number();
        for item in field.value_mut() {
            let len = message_size(item)?;
            self.size += tag_size(number, WireType::LengthDelimited);
            self.size += varint_size(len) as u64;
            self.size += len;
        }
        Ok(())
    }

    fn map<K, V>(&mut self, field: Field<'_, BTreeMap<K, V>>) -> Result<()>
    where
        K: Scalar + Ord,
        V: Scalar,
    {
        if !field.present() || field.number() == 0 || field.value().is_empty() {
            return Ok(());
        }
        let key_ty = field.field_type();
        let value_ty = field
            .value_type()
            .expect("map field descriptor is missing its value type");
        for (key, value) in field.value() {
            let entry = map_part_size(key.wire_size(key_ty), key_ty)
                + map_part_size(value.wire_size(value_ty), value_ty);
            self.size += tag_size(field.number(), WireType::LengthDelimited);
            self.size += varint_size(entry) as u64;
            self.size += entry;
        }
        Ok(())
    }

    fn map_message<K, M>(&mut self, mut field: Field<'_, BTreeMap<K, M>>) -> Result<()>
    where
        K: Scalar + Ord,
        M: Message,
    {
        if !field.present() || field.number() == 0 || field.value().is_empty() {
            return Ok(());
        }
        let number = field.number();
        let key_ty = field.field_type();
        for (key, value) in field.value_mut() {
            let entry = map_part_size(key.wire_size(key_ty), key_ty)
                + map_part_size(message_size(value)?, FieldType::Message);
            self.size += tag_size(number, WireType::LengthDelimited);
            self.size += varint_size(entry) as u64;
            self.size += entry;
        }
        Ok(())
    }
}

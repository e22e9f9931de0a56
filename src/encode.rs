//! Write pass: appends tag/length/value triples in declaration order.
//!
//! Mirrors the size pass in `size` field kind by field kind; the two must
//! agree byte-for-byte because every length prefix here was computed there.

use std::collections::BTreeMap;

use bytes::{Bytes, BytesMut};

use crate::field::{Field, FieldType, WireType};
use crate::scalar::Scalar;
use crate::size::{map_part_size, message_size};
use crate::wire::put_varint;
use crate::{Archive, Message, Result};

/// Archive backend that writes the wire representation.
///
/// Create it through [`crate::encode`], which runs the size pass first and
/// reserves the full output capacity up front; appending then never
/// reallocates. That is a performance contract, not a correctness one.
pub struct Encoder {
    out: BytesMut,
}

impl Encoder {
    pub fn with_capacity(capacity: usize) -> Self {
        Encoder {
            out: BytesMut::with_capacity(capacity),
        }
    }

    /// Freezes and returns the written bytes.
    pub fn into_bytes(self) -> Bytes {
        self.out.freeze()
    }

    fn put_tag(&mut self, number: u32, wire_type: WireType) {
        put_varint(&mut self.out, ((number as u64) << 3) | wire_type as u64);
    }

    /// Writes one length-prefix-if-needed plus raw value.
    fn put_scalar<T: Scalar>(&mut self, value: &T, ty: FieldType) {
        if ty.is_length_delimited() {
            put_varint(&mut self.out, value.wire_size(ty));
        }
        value.put_value(ty, &mut self.out);
    }

    fn put_message<M: Message>(&mut self, value: &mut M) -> Result<()> {
        let len = message_size(value)?;
        put_varint(&mut self.out, len);
        value.fields(self)?;
        Ok(())
    }
}

impl Archive for Encoder {
    fn scalar<T: Scalar>(&mut self, field: Field<'_, T>) -> Result<()> {
        if !field.present() || field.number() == 0 {
            return Ok(());
        }
        let ty = field.field_type();
        if field.value().is_elided() {
            return Ok(());
        }
        self.put_tag(field.number(), ty.wire_type());
        self.put_scalar(field.value(), ty);
        Ok(())
    }

    fn message<M: Message>(&mut self, mut field: Field<'_, M>) -> Result<()> {
        if !field.present() || field.number() == 0 {
            return Ok(());
        }
        self.put_tag(field.number(), WireType::LengthDelimited);
        self.put_message(field.value_mut())
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
            let length: u64 = field.value().iter().map(|item| item.wire_size(ty)).sum();
            self.put_tag(field.number(), WireType::LengthDelimited);
            put_varint(&mut self.out, length);
            for item in field.value() {
                item.put_value(ty, &mut self.out);
            }
        } else {
            for item in field.value() {
                self.put_tag(field.number(), ty.wire_type());
                self.put_scalar(item, ty);
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
            self.put_tag(number, WireType::LengthDelimited);
            self.put_message(item)?;
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
            self.put_tag(field.number(), WireType::LengthDelimited);
            put_varint(&mut self.out, entry);
            self.put_tag(1, key_ty.wire_type());
            self.put_scalar(key, key_ty);
            self.put_tag(2, value_ty.wire_type());
            self.put_scalar(value, value_ty);
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
            self.put_tag(number, WireType::LengthDelimited);
            put_varint(&mut self.out, entry);
            self.put_tag(1, key_ty.wire_type());
            self.put_scalar(key, key_ty);
            self.put_tag(2, WireType::LengthDelimited);
            self.put_message(value)?;
        }
        Ok(())
    }
}

//! Decode pass: reads typed values back out of the parsed node arena.
//!
//! Lookups are by field number. An absent field is normal; a field whose
//! observed wire type disagrees with its declared one is skipped without
//! error, tolerating schema drift between producer and consumer. Malformed
//! map entries, by contrast, indicate a broken producer and panic.

use std::collections::BTreeMap;

use crate::field::{Field, WireType};
use crate::reader::Reader;
use crate::scalar::Scalar;
use crate::{Archive, Message, Result};

/// Archive backend that populates a message from parsed bytes.
///
/// Owns the node arena for one message scope; each nested message or map
/// entry gets a fresh `Decoder` over its bounded byte slice.
pub struct Decoder<'a> {
    reader: Reader<'a>,
}

impl<'a> Decoder<'a> {
    /// Parses `input` into the node arena, ready for field reads.
    pub fn parse(input: &'a [u8]) -> Result<Self> {
        Ok(Decoder {
            reader: Reader::parse(input)?,
        })
    }

    fn decode_into<M: Message>(data: &[u8], value: &mut M) -> Result<()> {
        let mut decoder = Decoder::parse(data)?;
        value.fields(&mut decoder)
    }
}

impl Archive for Decoder<'_> {
    fn scalar<T: Scalar>(&mut self, mut field: Field<'_, T>) -> Result<()> {
        if field.number() == 0 {
            return Ok(());
        }
        let Some(node) = self.reader.node_by_number(field.number()) else {
            return Ok(());
        };
        if node.wire_type() != field.wire_type() {
            return Ok(());
        }
        // A singular field repeated on the wire reads its first occurrence.
        *field.value_mut() = T::from_node(node, field.field_type())?;
        field.mark_present();
        Ok(())
    }

    fn message<M: Message>(&mut self, mut field: Field<'_, M>) -> Result<()> {
        if field.number() == 0 {
            return Ok(());
        }
        let Some(node) = self.reader.node_by_number(field.number()) else {
            return Ok(());
        };
        if node.wire_type() != WireType::LengthDelimited {
            return Ok(());
        }
        Decoder::decode_into(node.bytes(), field.value_mut())?;
        field.mark_present();
        Ok(())
    }

    fn repeated<T: Scalar>(&mut self, mut field: Field<'_, Vec<T>>) -> Result<()> {
        if field.number() == 0 {
            return Ok(());
        }
        let Some(first) = self.reader.node_by_number(field.number()) else {
            return Ok(());
        };
        let declared = field.wire_type();
        if first.wire_type() != declared && first.wire_type() != WireType::LengthDelimited {
            return Ok(());
        }
        field.mark_present();
        let ty = field.field_type();
        let out = field.value_mut();
        out.clear();
        let mut node = Some(first);
        while let Some(n) = node {
            if n.wire_type() == declared {
                out.push(T::from_node(n, ty)?);
            } else if n.wire_type() == WireType::LengthDelimited {
                // Packed run: split the length-delimited payload back into
                // elements by varint or fixed-width stride.
                let mut buf = n.bytes();
                while !buf.is_empty() {
                    out.push(T::from_packed(&mut buf, ty)?);
                }
            }
            node = self.reader.next_node(n);
        }
        Ok(())
    }

    fn repeated_message<M: Message>(&mut self, mut field: Field<'_, Vec<M>>) -> Result<()> {
        if field.number() == 0 {
            return Ok(());
        }
        let Some(first) = self.reader.node_by_number(field.number()) else {
            return Ok(());
        };
        if first.wire_type() != WireType::LengthDelimited {
            return Ok(());
        }
        field.mark_present();
        let out = field.value_mut();
        out.clear();
        let mut node = Some(first);
        while let Some(n) = node {
            let mut item = M::default();
            Decoder::decode_into(n.bytes(), &mut item)?;
            out.push(item);
            node = self.reader.next_node(n);
        }
        Ok(())
    }

    fn map<K, V>(&mut self, mut field: Field<'_, BTreeMap<K, V>>) -> Result<()>
    where
        K: Scalar + Ord,
        V: Scalar,
    {
        if field.number() == 0 {
            return Ok(());
        }
        let Some(first) = self.reader.node_by_number(field.number()) else {
            return Ok(());
        };
        if first.wire_type() != WireType::LengthDelimited {
            return Ok(());
        }
        field.mark_present();
        let key_ty = field.field_type();
        let value_ty = field
            .value_type()
            .expect("map field descriptor is missing its value type");
        let name = field.name();
        let out = field.value_mut();
        out.clear();
        let mut node = Some(first);
        while let Some(n) = node {
            let entry = Decoder::parse(n.bytes())?;
            let (Some(key_node), Some(value_node)) = (
                entry.reader.node_by_number(1),
                entry.reader.node_by_number(2),
            ) else {
                panic!("map entry for field {name} is missing its key or value");
            };
            let key = K::from_node(key_node, key_ty)?;
            let value = V::from_node(value_node, value_ty)?;
            out.insert(key, value);
            node = self.reader.next_node(n);
        }
        Ok(())
    }

    fn map_message<K, M>(&mut self, mut field: Field<'_, BTreeMap<K, M>>) -> Result<()>
    where
        K: Scalar + Ord,
        M: Message,
    {
        if field.number() == 0 {
            return Ok(());
        }
        let Some(first) = self.reader.node_by_number(field.number()) else {
            return Ok(());
        };
        if first.wire_type() != WireType::LengthDelimited {
            return Ok(());
        }
        field.mark_present();
        let key_ty = field.field_type();
        let name = field.name();
        let out = field.value_mut();
        out.clear();
        let mut node = Some(first);
        while let Some(n) = node {
            let entry = Decoder::parse(n.bytes())?;
            let (Some(key_node), Some(value_node)) = (
                entry.reader.node_by_number(1),
                entry.reader.node_by_number(2),
            ) else {
                panic!("map entry for field {name} is missing its key or value");
            };
            let key = K::from_node(key_node, key_ty)?;
            let mut value = M::default();
            Decoder::decode_into(value_node.bytes(), &mut value)?;
            out.insert(key, value);
            node = self.reader.next_node(n);
        }
        Ok(())
    }
}

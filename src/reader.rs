//! Raw parse tree: a pre-sized node arena indexed by field number.
//!
//! Parsing makes two full passes over the input. The first scans every
//! tag/length/value triple and only counts; the second allocates each node
//! into a store pre-sized to the exact final count, so the arena never
//! reallocates while links are being issued. Nodes reference each other by
//! slot index, and the whole arena drops with the [`Reader`].

use crate::field::WireType;
use crate::{Result, WireError};

/// One parsed field occurrence.
///
/// Carries the observed wire type (used for cross-validation against the
/// declared type), the field number from the tag, and a zero-copy slice of
/// the value bytes. Varint and fixed-width nodes additionally cache the
/// decoded numeric value.
#[derive(Debug)]
pub struct Node<'a> {
    wire_type: WireType,
    number: u32,
    data: &'a [u8],
    scalar: u64,
    next: Option<u32>,
}

impl<'a> Node<'a> {
    /// The wire type observed on the wire, not the declared field type.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// The protocol field number read from the tag.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The raw value bytes, borrowed from the original input.
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The cached numeric value of a varint/fixed32/fixed64 node.
    /// Zero for length-delimited nodes.
    pub(crate) fn scalar(&self) -> u64 {
        self.scalar
    }
}

/// Parsed form of one message's bytes.
///
/// Same-number nodes encountered back to back chain into a sibling list in
/// encounter order; each first occurrence registers in a field-number index
/// for lookup. Lives exactly as long as values borrowed from it are needed,
/// once per decode (including once per nested message or map entry).
#[derive(Debug)]
pub struct Reader<'a> {
    nodes: Vec<Node<'a>>,
    index: Vec<u32>,
}

impl<'a> Reader<'a> {
    /// Parses a raw byte buffer into the node arena.
    ///
    /// Fails on a buffer truncated mid-value and on the unassigned wire
    /// types 6 and 7. Group tags are recognized but produce no node.
    pub fn parse(input: &'a [u8]) -> Result<Self> {
        // Counting pass: scan exactly as the populate pass will, tallying
        // nodes and distinct contiguous field-number runs.
        let mut node_count = 0usize;
        let mut run_count = 0usize;
        let mut last_number = None;
        scan(input, |number, _, _, _| {
            node_count += 1;
            if last_number != Some(number) {
                run_count += 1;
            }
            last_number = Some(number);
        })?;

        let mut nodes: Vec<Node<'a>> = Vec::with_capacity(node_count);
        let mut index: Vec<u32> = Vec::with_capacity(run_count);
        scan(input, |number, wire_type, scalar, data| {
            let slot = nodes.len() as u32;
            match nodes.last_mut() {
                Some(prev) if prev.number == number => prev.next = Some(slot),
                _ => index.push(slot),
            }
            nodes.push(Node {
                wire_type,
                number,
                data,
                scalar,
                next: None,
            });
        })?;
        debug_assert_eq!(nodes.len(), node_count);
        debug_assert_eq!(index.len(), run_count);

        Ok(Reader { nodes, index })
    }

    /// Looks up the first node carrying `field_number`.
    ///
    /// A linear scan over the field-number index; message field counts are
    /// bounded by schema size, not input size.
    pub fn node_by_number(&self, field_number: u32) -> Option<&Node<'a>> {
        self.index
            .iter()
            .map(|&slot| &self.nodes[slot as usize])
            .find(|node| node.number == field_number)
    }

    /// The next sibling sharing `node`'s field number, if any.
    pub fn next_node(&self, node: &Node<'a>) -> Option<&Node<'a>> {
        node.next.map(|slot| &self.nodes[slot as usize])
    }
}

/// Scans every tag/length/value triple in `input`, handing each field
/// occurrence to `sink` as (number, wire type, cached scalar, value slice).
///
/// Both parse passes run this same scan, so they agree on counts and
/// failures. Start/end group tags are skipped without a `sink` call.
fn scan<'a, F>(input: &'a [u8], mut sink: F) -> Result<()>
where
    F: FnMut(u32, WireType, u64, &'a [u8]),
{
    let mut buf = input;
    while !buf.is_empty() {
        let tag_offset = input.len() - buf.len();
        let tag = crate::wire::read_varint(&mut buf, tag_offset)?;
        let raw_wire = (tag & 0x07) as u8;
        let number = (tag >> 3) as u32;
        let wire_type = WireType::from_raw(raw_wire).ok_or(WireError::UnknownWireType {
            wire_type: raw_wire,
            offset: tag_offset,
        })?;
        let offset = input.len() - buf.len();
        match wire_type {
            WireType::Varint => {
                let start = buf;
                let value = crate::wire::read_varint(&mut buf, offset)?;
                let consumed = start.len() - buf.len();
                sink(number, wire_type, value, &start[..consumed]);
            }
            WireType::Fixed64 => {
                let data = &buf[..buf.len().min(8)];
                let value = crate::wire::read_fixed64(&mut buf, offset)?;
                sink(number, wire_type, value, data);
            }
            WireType::Fixed32 => {
                let data = &buf[..buf.len().min(4)];
                let value = crate::wire::read_fixed32(&mut buf, offset)?;
                sink(number, wire_type, value as u64, data);
            }
            WireType::LengthDelimited => {
                let len = crate::wire::read_varint(&mut buf, offset)? as usize;
                if len > buf.len() {
                    return Err(WireError::Truncated {
                        offset: input.len() - buf.len(),
                    });
                }
                let data = &buf[..len];
                buf = &buf[len..];
                sink(number, wire_type, 0, data);
            }
            // Deprecated group markers: no payload of their own, no node.
            WireType::StartGroup | WireType::EndGroup => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_input() {
        let reader = Reader::parse(&[]).unwrap();
        assert!(reader.node_by_number(1).is_none());
    }

    #[test]
    fn parse_varint_field() {
        // field 1, varint 150
        let reader = Reader::parse(&[0x08, 0x96, 0x01]).unwrap();
        let node = reader.node_by_number(1).unwrap();
        assert_eq!(node.wire_type(), WireType::Varint);
        assert_eq!(node.scalar(), 150);
        assert_eq!(node.bytes(), &[0x96, 0x01]);
        assert!(reader.next_node(node).is_none());
    }

    #[test]
    fn parse_length_delimited_field() {
        // field 2, "abc"
        let reader = Reader::parse(&[0x12, 0x03, b'a', b'b', b'c']).unwrap();
        let node = reader.node_by_number(2).unwrap();
        assert_eq!(node.wire_type(), WireType::LengthDelimited);
        assert_eq!(node.bytes(), b"abc");
    }

    #[test]
    fn repeated_occurrences_chain_in_order() {
        // field 4 varint, three occurrences: 1, 2, 3
        let reader = Reader::parse(&[0x20, 0x01, 0x20, 0x02, 0x20, 0x03]).unwrap();
        let mut values = Vec::new();
        let mut node = reader.node_by_number(4);
        while let Some(n) = node {
            values.push(n.scalar());
            node = reader.next_node(n);
        }
        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn distinct_numbers_indexed_separately() {
        // field 1 varint 7, field 2 varint 9
        let reader = Reader::parse(&[0x08, 0x07, 0x10, 0x09]).unwrap();
        assert_eq!(reader.node_by_number(1).unwrap().scalar(), 7);
        assert_eq!(reader.node_by_number(2).unwrap().scalar(), 9);
        assert!(reader.node_by_number(3).is_none());
    }

    #[test]
    fn fixed_width_fields_cache_scalar() {
        // field 1 fixed32, field 2 fixed64
        let mut data = vec![0x0D];
        data.extend_from_slice(&0xAABBCCDDu32.to_le_bytes());
        data.push(0x11);
        data.extend_from_slice(&0x1122334455667788u64.to_le_bytes());
        let reader = Reader::parse(&data).unwrap();
        assert_eq!(reader.node_by_number(1).unwrap().scalar(), 0xAABBCCDD);
        assert_eq!(
            reader.node_by_number(2).unwrap().scalar(),
            0x1122334455667788
        );
    }

    #[test]
    fn group_tags_are_skipped() {
        // field 1 start group, field 1 end group, field 2 varint 5
        let reader = Reader::parse(&[0x0B, 0x0C, 0x10, 0x05]).unwrap();
        assert!(reader.node_by_number(1).is_none());
        assert_eq!(reader.node_by_number(2).unwrap().scalar(), 5);
    }

    #[test]
    fn unknown_wire_type_fails() {
        // wire type 6 is unassigned
        let err = Reader::parse(&[0x0E, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            WireError::UnknownWireType { wire_type: 6, .. }
        ));
    }

    #[test]
    fn truncated_varint_fails() {
        let err = Reader::parse(&[0x08, 0x80]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn truncated_fixed_fails() {
        let err = Reader::parse(&[0x0D, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn truncated_length_delimited_fails() {
        // declared 5 bytes, only 2 present
        let err = Reader::parse(&[0x12, 0x05, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }
}

use std::collections::BTreeMap;

use bytes::Bytes;
use wireflex::{decode, encode, encoded_size, Archive, Field, FieldType, Message, Result};

#[derive(Default, Debug, Clone, PartialEq)]
struct Scalars {
    double: f64,
    float: f32,
    int32: i32,
    int64: i64,
    uint32: u32,
    uint64: u64,
    sint32: i32,
    sint64: i64,
    fixed32: u32,
    fixed64: u64,
    sfixed32: i32,
    sfixed64: i64,
    flag: bool,
    kind: i32,
    text: String,
    blob: Bytes,
}

impl Message for Scalars {
    fn fields<A: Archive>(&mut self, ar: &mut A) -> Result<()> {
        ar.scalar(Field::new("double", 1, FieldType::Double, &mut self.double))?;
        ar.scalar(Field::new("float", 2, FieldType::Float, &mut self.float))?;
        ar.scalar(Field::new("int32", 3, FieldType::Int32, &mut self.int32))?;
        ar.scalar(Field::new("int64", 4, FieldType::Int64, &mut self.int64))?;
        ar.scalar(Field::new("uint32", 5, FieldType::Uint32, &mut self.uint32))?;
        ar.scalar(Field::new("uint64", 6, FieldType::Uint64, &mut self.uint64))?;
        ar.scalar(Field::new("sint32", 7, FieldType::Sint32, &mut self.sint32))?;
        ar.scalar(Field::new("sint64", 8, FieldType::Sint64, &mut self.sint64))?;
        ar.scalar(Field::new("fixed32", 9, FieldType::Fixed32, &mut self.fixed32))?;
        ar.scalar(Field::new("fixed64", 10, FieldType::Fixed64, &mut self.fixed64))?;
        ar.scalar(Field::new("sfixed32", 11, FieldType::Sfixed32, &mut self.sfixed32))?;
        ar.scalar(Field::new("sfixed64", 12, FieldType::Sfixed64, &mut self.sfixed64))?;
        ar.scalar(Field::new("flag", 13, FieldType::Bool, &mut self.flag))?;
        ar.scalar(Field::new("kind", 14, FieldType::Enum, &mut self.kind))?;
        ar.scalar(Field::new("text", 15, FieldType::String, &mut self.text))?;
        ar.scalar(Field::new("blob", 16, FieldType::Bytes, &mut self.blob))?;
        Ok(())
    }
}

fn sample_scalars() -> Scalars {
    Scalars {
        double: 2535.78925,
        float: 253.28503,
        int32: -25,
        int64: -847,
        uint32: 253,
        uint64: 3_647_457,
        sint32: -123_456,
        sint64: -9_876_543_210,
        fixed32: 0xDEADBEEF,
        fixed64: 0x0123_4567_89AB_CDEF,
        sfixed32: -42,
        sfixed64: -4_200_000_000,
        flag: true,
        kind: 2,
        text: "1111".to_string(),
        blob: Bytes::from_static(&[0x00, 0xFF, 0x7F]),
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
struct Inner {
    id: u32,
    label: String,
}

impl Message for Inner {
    fn fields<A: Archive>(&mut self, ar: &mut A) -> Result<()> {
        ar.scalar(Field::new("id", 1, FieldType::Uint32, &mut self.id))?;
        ar.scalar(Field::new("label", 2, FieldType::String, &mut self.label))?;
        Ok(())
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
struct Outer {
    inner: Inner,
    has_inner: bool,
    packed: Vec<i32>,
    unpacked: Vec<i32>,
    names: Vec<String>,
    items: Vec<Inner>,
    tags: BTreeMap<i32, String>,
    children: BTreeMap<String, Inner>,
}

impl Message for Outer {
    fn fields<A: Archive>(&mut self, ar: &mut A) -> Result<()> {
        ar.message(
            Field::new("inner", 1, FieldType::Message, &mut self.inner)
                .with_presence(&mut self.has_inner),
        )?;
        ar.repeated(Field::new("packed", 2, FieldType::Int32, &mut self.packed).packed())?;
        ar.repeated(Field::new("unpacked", 3, FieldType::Int32, &mut self.unpacked))?;
        ar.repeated(Field::new("names", 4, FieldType::String, &mut self.names))?;
        ar.repeated_message(Field::new("items", 5, FieldType::Message, &mut self.items))?;
        ar.map(Field::map(
            "tags",
            6,
            FieldType::Int32,
            FieldType::String,
            &mut self.tags,
        ))?;
        ar.map_message(Field::map(
            "children",
            7,
            FieldType::String,
            FieldType::Message,
            &mut self.children,
        ))?;
        Ok(())
    }
}

#[test]
fn scalars_roundtrip() {
    let mut value = sample_scalars();
    let bytes = encode(&mut value).unwrap();
    let decoded: Scalars = decode(&bytes).unwrap();

    assert!((decoded.double - value.double).abs() < 1e-11);
    assert!((decoded.float - value.float).abs() < 1e-6);
    assert_eq!(decoded.int32, value.int32);
    assert_eq!(decoded.int64, value.int64);
    assert_eq!(decoded.uint32, value.uint32);
    assert_eq!(decoded.uint64, value.uint64);
    assert_eq!(decoded.sint32, value.sint32);
    assert_eq!(decoded.sint64, value.sint64);
    assert_eq!(decoded.fixed32, value.fixed32);
    assert_eq!(decoded.fixed64, value.fixed64);
    assert_eq!(decoded.sfixed32, value.sfixed32);
    assert_eq!(decoded.sfixed64, value.sfixed64);
    assert_eq!(decoded.flag, value.flag);
    assert_eq!(decoded.kind, value.kind);
    assert_eq!(decoded.text, value.text);
    assert_eq!(decoded.blob, value.blob);
}

#[test]
fn scalars_size_agreement() {
    let mut value = sample_scalars();
    let bytes = encode(&mut value).unwrap();
    assert_eq!(bytes.len(), encoded_size(&mut value).unwrap());
}

#[test]
fn extreme_integers_roundtrip() {
    let mut value = Scalars {
        int32: i32::MIN,
        int64: i64::MIN,
        uint32: u32::MAX,
        uint64: u64::MAX,
        sint32: i32::MIN,
        sint64: i64::MIN,
        ..Scalars::default()
    };
    let bytes = encode(&mut value).unwrap();
    assert_eq!(bytes.len(), encoded_size(&mut value).unwrap());
    let decoded: Scalars = decode(&bytes).unwrap();
    assert_eq!(decoded.int32, i32::MIN);
    assert_eq!(decoded.int64, i64::MIN);
    assert_eq!(decoded.uint32, u32::MAX);
    assert_eq!(decoded.uint64, u64::MAX);
    assert_eq!(decoded.sint32, i32::MIN);
    assert_eq!(decoded.sint64, i64::MIN);
}

#[test]
fn containers_roundtrip() {
    let mut value = Outer {
        inner: Inner {
            id: 150,
            label: "inner".to_string(),
        },
        has_inner: true,
        packed: vec![3, 270, 86942],
        unpacked: vec![1, 2, 3],
        names: vec!["a".to_string(), "b".to_string()],
        items: vec![
            Inner {
                id: 1,
                label: "one".to_string(),
            },
            Inner {
                id: 2,
                label: "two".to_string(),
            },
        ],
        tags: BTreeMap::from([(1, "a".to_string()), (2, "b".to_string())]),
        children: BTreeMap::from([(
            "k".to_string(),
            Inner {
                id: 9,
                label: "v".to_string(),
            },
        )]),
    };
    let bytes = encode(&mut value).unwrap();
    assert_eq!(bytes.len(), encoded_size(&mut value).unwrap());

    let decoded: Outer = decode(&bytes).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn unpacked_repeated_preserves_order() {
    let mut value = Outer {
        unpacked: vec![1, 2, 3],
        ..Outer::default()
    };
    let bytes = encode(&mut value).unwrap();
    let decoded: Outer = decode(&bytes).unwrap();
    assert_eq!(decoded.unpacked, [1, 2, 3]);
}

#[test]
fn packed_run_splits_back_into_elements() {
    let mut value = Outer {
        packed: vec![-1, 0, 127, 128, 300_000],
        ..Outer::default()
    };
    let bytes = encode(&mut value).unwrap();
    let decoded: Outer = decode(&bytes).unwrap();
    assert_eq!(decoded.packed, value.packed);
}

#[test]
fn map_roundtrip() {
    let mut value = Outer {
        tags: BTreeMap::from([(1, "a".to_string()), (2, "b".to_string())]),
        ..Outer::default()
    };
    let bytes = encode(&mut value).unwrap();
    let decoded: Outer = decode(&bytes).unwrap();
    assert_eq!(decoded.tags, value.tags);
}

#[test]
fn absent_message_field_stays_default() {
    let mut value = Outer::default();
    let bytes = encode(&mut value).unwrap();
    assert!(bytes.is_empty());
    let decoded: Outer = decode(&bytes).unwrap();
    assert!(!decoded.has_inner);
    assert_eq!(decoded, Outer::default());
}

#[derive(Default, Debug, PartialEq)]
struct Named {
    name: String,
    has_name: bool,
}

impl Message for Named {
    fn fields<A: Archive>(&mut self, ar: &mut A) -> Result<()> {
        ar.scalar(
            Field::new("name", 1, FieldType::String, &mut self.name)
                .with_presence(&mut self.has_name),
        )?;
        Ok(())
    }
}

#[test]
fn empty_string_is_elided_from_the_wire() {
    // A present-but-empty string contributes zero bytes, making it
    // indistinguishable from an absent field after a roundtrip.
    let mut value = Named {
        name: String::new(),
        has_name: true,
    };
    let bytes = encode(&mut value).unwrap();
    assert!(bytes.is_empty());

    let decoded: Named = decode(&bytes).unwrap();
    assert!(!decoded.has_name);
    assert_eq!(decoded.name, "");
}

#[test]
fn present_string_roundtrips_with_presence() {
    let mut value = Named {
        name: "hello".to_string(),
        has_name: true,
    };
    let bytes = encode(&mut value).unwrap();
    let decoded: Named = decode(&bytes).unwrap();
    assert!(decoded.has_name);
    assert_eq!(decoded.name, "hello");
}

#[test]
fn unset_presence_flag_skips_encoding() {
    let mut value = Named {
        name: "ignored".to_string(),
        has_name: false,
    };
    let bytes = encode(&mut value).unwrap();
    assert!(bytes.is_empty());
}

#[derive(Default, Debug, PartialEq)]
struct JsonOnly {
    // number 0 means "no binary encoding": the field belongs to other
    // format backends only.
    note: String,
    id: u32,
}

impl Message for JsonOnly {
    fn fields<A: Archive>(&mut self, ar: &mut A) -> Result<()> {
        ar.scalar(Field::new("note", 0, FieldType::String, &mut self.note))?;
        ar.scalar(Field::new("id", 1, FieldType::Uint32, &mut self.id))?;
        Ok(())
    }
}

#[test]
fn zero_numbered_fields_have_no_binary_encoding() {
    let mut value = JsonOnly {
        note: "not on the wire".to_string(),
        id: 7,
    };
    let bytes = encode(&mut value).unwrap();
    assert_eq!(&bytes[..], &[0x08, 0x07]);

    let decoded: JsonOnly = decode(&bytes).unwrap();
    assert_eq!(decoded.note, "");
    assert_eq!(decoded.id, 7);
}

#[derive(Default, Debug, PartialEq)]
struct DeepNest {
    leaf: u32,
    child: Option<Box<DeepNest>>,
}

// Option<Box<_>> keeps the recursive type finite; presence doubles as the
// recursion terminator.
impl Message for DeepNest {
    fn fields<A: Archive>(&mut self, ar: &mut A) -> Result<()> {
        ar.scalar(Field::new("leaf", 1, FieldType::Uint32, &mut self.leaf))?;
        let mut has_child = self.child.is_some();
        let mut child = self.child.take().map(|b| *b).unwrap_or_default();
        ar.message(
            Field::new("child", 2, FieldType::Message, &mut child).with_presence(&mut has_child),
        )?;
        if has_child {
            self.child = Some(Box::new(child));
        }
        Ok(())
    }
}

#[test]
fn nested_messages_recurse() {
    let mut value = DeepNest {
        leaf: 1,
        child: Some(Box::new(DeepNest {
            leaf: 2,
            child: Some(Box::new(DeepNest {
                leaf: 3,
                child: None,
            })),
        })),
    };
    let bytes = encode(&mut value).unwrap();
    assert_eq!(bytes.len(), encoded_size(&mut value).unwrap());
    let decoded: DeepNest = decode(&bytes).unwrap();
    assert_eq!(decoded, value);
}

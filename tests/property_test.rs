use proptest::prelude::*;
use wireflex::{
    decode, encode, encoded_size, varint_size, zigzag_decode32, zigzag_decode64, zigzag_encode32,
    zigzag_encode64, Archive, Field, FieldType, Message, Result,
};

#[derive(Default, Debug, Clone, PartialEq)]
struct Numbers {
    uint64: u64,
    int32: i32,
    sint64: i64,
    fixed32: u32,
    double: f64,
    packed: Vec<i64>,
}

impl Message for Numbers {
    fn fields<A: Archive>(&mut self, ar: &mut A) -> Result<()> {
        ar.scalar(Field::new("uint64", 1, FieldType::Uint64, &mut self.uint64))?;
        ar.scalar(Field::new("int32", 2, FieldType::Int32, &mut self.int32))?;
        ar.scalar(Field::new("sint64", 3, FieldType::Sint64, &mut self.sint64))?;
        ar.scalar(Field::new("fixed32", 4, FieldType::Fixed32, &mut self.fixed32))?;
        ar.scalar(Field::new("double", 5, FieldType::Double, &mut self.double))?;
        ar.repeated(Field::new("packed", 6, FieldType::Sint64, &mut self.packed).packed())?;
        Ok(())
    }
}

#[derive(Default, Debug, PartialEq)]
struct OneU64 {
    value: u64,
}

impl Message for OneU64 {
    fn fields<A: Archive>(&mut self, ar: &mut A) -> Result<()> {
        ar.scalar(Field::new("value", 1, FieldType::Uint64, &mut self.value))?;
        Ok(())
    }
}

proptest! {
    #[test]
    fn zigzag_involution_32(v in any::<i32>()) {
        prop_assert_eq!(zigzag_decode32(zigzag_encode32(v)), v);
    }

    #[test]
    fn zigzag_involution_64(v in any::<i64>()) {
        prop_assert_eq!(zigzag_decode64(zigzag_encode64(v)), v);
    }

    #[test]
    fn zigzag_preserves_magnitude_order(v in any::<i32>()) {
        // |encoded| is within one bit of 2|v|, so small values stay small.
        let encoded = zigzag_encode32(v) as u64;
        prop_assert!(encoded <= 2 * v.unsigned_abs() as u64);
    }

    #[test]
    fn varint_size_matches_encoding(v in any::<u64>()) {
        let mut msg = OneU64 { value: v };
        let bytes = encode(&mut msg).unwrap();
        // one tag byte plus the value
        prop_assert_eq!(bytes.len(), 1 + varint_size(v));
    }

    #[test]
    fn numbers_roundtrip(
        uint64 in any::<u64>(),
        int32 in any::<i32>(),
        sint64 in any::<i64>(),
        fixed32 in any::<u32>(),
        double in any::<f64>().prop_filter("NaN compares unequal", |d| !d.is_nan()),
        packed in proptest::collection::vec(any::<i64>(), 0..16),
    ) {
        let mut msg = Numbers { uint64, int32, sint64, fixed32, double, packed };
        let bytes = encode(&mut msg).unwrap();
        prop_assert_eq!(bytes.len(), encoded_size(&mut msg).unwrap());

        let decoded: Numbers = decode(&bytes).unwrap();
        prop_assert_eq!(decoded, msg);
    }

    #[test]
    fn random_bytes_never_panic_the_decoder(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        // Malformed input must fail with an error, not crash.
        let _ = decode::<Numbers>(&data);
    }
}

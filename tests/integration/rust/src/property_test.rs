//! Property-based tests for the frame codec and numeric conversions.

use proptest::collection::{hash_map, vec};
use proptest::prelude::*;
use sfs::{pack, unpack, FromSfs, Limits, Object, Packer, ToSfs, TypeTag, Unpacker, Value};

const PROPTEST_CASES: u32 = 256;

// ============================================================================
// GENERATORS
// ============================================================================

fn finite_f32() -> impl Strategy<Value = f32> {
    prop::num::f32::NORMAL | prop::num::f32::SUBNORMAL | prop::num::f32::ZERO
}

fn finite_f64() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
}

fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_$]{1,16}"
}

/// Any non-container value. Null is left out: it cannot appear inside a
/// decoded object.
fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<u8>().prop_map(Value::Byte),
        any::<i16>().prop_map(Value::Short),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        finite_f32().prop_map(Value::Float),
        finite_f64().prop_map(Value::Double),
        "\\PC{0,24}".prop_map(Value::Str),
        "\\PC{0,24}".prop_map(Value::Text),
        vec(any::<bool>(), 0..16).prop_map(Value::BoolArray),
        vec(any::<u8>(), 0..64).prop_map(Value::ByteArray),
        vec(any::<i16>(), 0..16).prop_map(Value::ShortArray),
        vec(any::<i32>(), 0..16).prop_map(Value::IntArray),
        vec(any::<i64>(), 0..16).prop_map(Value::LongArray),
        vec(finite_f32(), 0..16).prop_map(Value::FloatArray),
        vec(finite_f64(), 0..16).prop_map(Value::DoubleArray),
        vec("\\PC{0,8}", 0..8).prop_map(Value::StrArray),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..8).prop_map(Value::Array),
            hash_map(key(), inner, 0..8).prop_map(Value::Object),
        ]
    })
}

fn root() -> impl Strategy<Value = Object> {
    hash_map(key(), tree(), 0..8)
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn prop_plain_roundtrip(root in root()) {
        let frame = pack(&root, false).unwrap();
        prop_assert_eq!(unpack(&frame).unwrap(), root);
    }

    #[test]
    fn prop_compressed_roundtrip(root in root()) {
        let frame = pack(&root, true).unwrap();
        prop_assert_eq!(unpack(&frame).unwrap(), root);
    }

    #[test]
    fn prop_length_field_matches_payload(root in root()) {
        let frame = pack(&root, false).unwrap();
        let declared = if frame[0] & sfs::LARGE_LENGTH_FLAG != 0 {
            u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]) as usize + 5
        } else {
            u16::from_be_bytes([frame[1], frame[2]]) as usize + 3
        };
        prop_assert_eq!(declared, frame.len());
    }

    #[test]
    fn prop_sorted_packing_is_canonical(root in root()) {
        let packer = Packer::new().with_sorted_keys(true);
        let first = packer.pack(&root, false).unwrap();
        let again = packer.pack(&unpack(&first).unwrap(), false).unwrap();
        prop_assert_eq!(first, again);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in vec(any::<u8>(), 0..512)) {
        let unpacker = Unpacker::with_limits(
            Limits::new().with_max_frame_size(4096).with_max_depth(8),
        );
        let _ = unpacker.unpack_value(&bytes);
    }

    #[test]
    fn prop_truncated_frames_fail(root in root(), cut in 1usize..64) {
        let frame = pack(&root, false).unwrap();
        prop_assume!(cut < frame.len());
        prop_assert!(unpack(&frame[..frame.len() - cut]).is_err());
    }

    #[test]
    fn prop_narrowing_checks_range(x in any::<i32>()) {
        let fits = i8::try_from(x).is_ok();
        prop_assert_eq!(i8::from_sfs(&Value::Int(x), None).is_ok(), fits);
        prop_assert_eq!(x.to_sfs(Some(TypeTag::Byte)).is_ok(), (0..=255).contains(&x));
    }

    #[test]
    fn prop_same_width_reinterprets(x in any::<u32>()) {
        let value = x.to_sfs(None).unwrap().unwrap();
        prop_assert_eq!(&value, &Value::Int(x as i32));
        prop_assert_eq!(u32::from_sfs(&value, None).unwrap(), x);
    }
}

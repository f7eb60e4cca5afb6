//! Wire compatibility tests for Rust.
//!
//! These tests verify that the Rust codec decodes captured server frames
//! and lays out bytes exactly as SFS peers expect.

use sfs::{
    from_bytes, marshal, pack, unmarshal, unpack, Error, Object, Packer, TypeTag, Unpacker,
    Value, COMPRESSED_FLAG, LARGE_LENGTH_FLAG,
};

use crate::interop::*;

fn login_return_frame() -> Vec<u8> {
    hex::decode(LOGIN_RETURN_FRAME).unwrap()
}

/// The captured frame with its length field corrected.
fn patched_login_return_frame() -> Vec<u8> {
    let mut frame = login_return_frame();
    frame[1..3].copy_from_slice(&LOGIN_RETURN_PAYLOAD_LEN.to_be_bytes());
    frame
}

fn expected_login_return() -> Envelope {
    Envelope {
        params: LoginParams {
            params: LoginData {
                login_room: "SLOT_ROOM".to_string(),
                data: true,
                balance: 8888.0,
                test_mode: false,
                server_id: "01".to_string(),
                ts: 1755497091484.0,
            },
            command: "gameLoginReturn".to_string(),
        },
        action: 13.0,
        controller: 1.0,
    }
}

fn test_respond() -> Respond {
    Respond {
        code: 200,
        data: vec![Data {
            name: "xxx".to_string(),
            age: 18,
        }],
        msg: "success".to_string(),
    }
}

fn test_all_types() -> AllTypes {
    AllTypes {
        flag: true,
        tiny: -5,
        byte: 250,
        short: -1234,
        int: i32::MIN,
        long: i64::MAX,
        unsigned: u64::MAX,
        float: 3.5,
        double: -2.718281828459045,
        text: "Hello, 世界! 🎉".to_string(),
        flags: vec![true, false, true],
        bytes: vec![0xde, 0xad, 0xbe, 0xef],
        shorts: vec![i16::MIN, 0, i16::MAX],
        ints: vec![1, -1],
        longs: vec![i64::MIN],
        floats: vec![0.25; 300],
        doubles: vec![1e300, -0.0],
        names: vec!["a".to_string(), String::new(), "ü".to_string()],
        nested: vec![Data::default(), Data {
            name: "n".to_string(),
            age: 7,
        }],
        narrowed: -300,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_return_declared_length_truncates() {
        let frame = login_return_frame();
        assert_eq!(frame.len(), 3 + LOGIN_RETURN_PAYLOAD_LEN as usize);

        let err = unpack(&frame).unwrap_err();
        println!("Captured frame error: {err}");
        assert!(matches!(err.root_cause(), Error::Truncated { .. }));
    }

    #[test]
    fn test_login_return_decode() {
        let frame = patched_login_return_frame();
        println!("Patched LoginReturn hex: {}", hex::encode(&frame));

        let root = unpack(&frame).unwrap();
        assert_eq!(root.len(), 3);
        assert_eq!(root["a"], Value::Double(13.0));
        assert_eq!(root["c"], Value::Double(1.0));

        let params = &root["p"];
        assert_eq!(params.get("c"), Some(&Value::from("gameLoginReturn")));

        let data = params.get("p").and_then(Value::as_object).unwrap();
        assert_eq!(data.len(), 6);
        assert_eq!(data["loginRoom"], Value::from("SLOT_ROOM"));
        assert_eq!(data["data"], Value::Bool(true));
        assert_eq!(data["balance"], Value::Double(8888.0));
        assert_eq!(data["testMode"], Value::Bool(false));
        assert_eq!(data["serverId"], Value::from("01"));
        assert_eq!(data["ts"], Value::Double(1755497091484.0));
    }

    #[test]
    fn test_login_return_into_records() {
        let frame = patched_login_return_frame();

        let envelope: Envelope = from_bytes(&frame).unwrap();
        assert_eq!(envelope, expected_login_return());

        let root = unpack(&frame).unwrap();
        let mut reused = Envelope::default();
        unmarshal(&root, &mut reused).unwrap();
        assert_eq!(reused, envelope);
    }

    #[test]
    fn test_login_return_reencode() {
        let root = unpack(&patched_login_return_frame()).unwrap();

        for compress in [false, true] {
            let frame = pack(&root, compress).unwrap();
            assert_eq!(unpack(&frame).unwrap(), root);
        }

        // Same tree, same size: only key order may differ
        let frame = pack(&root, false).unwrap();
        assert_eq!(frame.len(), 3 + LOGIN_RETURN_PAYLOAD_LEN as usize);
        assert_eq!(frame[0], 0x00);
    }

    #[test]
    fn test_respond_layout() {
        let root = marshal(&test_respond()).unwrap();
        let frame = Packer::new().with_sorted_keys(true).pack(&root, false).unwrap();

        println!("Respond encoded: {}", hex::encode(&frame));
        assert_eq!(
            hex::encode(&frame),
            concat!(
                "00003f",
                "120003",
                "0004636f646504000000c8",
                "000464617461110001",
                "120002",
                "00036167650400000012",
                "00046e616d65080003787878",
                "00036d736708000773756363657373",
            )
        );

        let decoded: Respond = from_bytes(&frame).unwrap();
        assert_eq!(decoded, test_respond());
    }

    #[test]
    fn test_all_types_roundtrip() {
        let record = test_all_types();

        for compress in [false, true] {
            let frame = sfs::to_bytes(&record, compress).unwrap();
            assert_eq!(frame[0] & COMPRESSED_FLAG != 0, compress);

            let decoded: AllTypes = from_bytes(&frame).unwrap();
            assert_eq!(decoded, record);
        }
    }

    #[test]
    fn test_all_types_wire_tags() {
        let root = marshal(&test_all_types()).unwrap();
        let tags: Vec<(&str, TypeTag)> = [
            "flag", "tiny", "byte", "short", "int", "long", "unsigned", "float", "double", "text",
            "flags", "bytes", "shorts", "ints", "longs", "floats", "doubles", "names", "nested",
            "narrowed",
        ]
        .into_iter()
        .map(|key| (key, root[key].tag()))
        .collect();

        assert_eq!(
            tags,
            vec![
                ("flag", TypeTag::Bool),
                ("tiny", TypeTag::Byte),
                ("byte", TypeTag::Byte),
                ("short", TypeTag::Short),
                ("int", TypeTag::Int),
                ("long", TypeTag::Long),
                ("unsigned", TypeTag::Long),
                ("float", TypeTag::Float),
                ("double", TypeTag::Double),
                ("text", TypeTag::Text),
                ("flags", TypeTag::BoolArray),
                ("bytes", TypeTag::ByteArray),
                ("shorts", TypeTag::ShortArray),
                ("ints", TypeTag::IntArray),
                ("longs", TypeTag::LongArray),
                ("floats", TypeTag::FloatArray),
                ("doubles", TypeTag::DoubleArray),
                ("names", TypeTag::UtfStringArray),
                ("nested", TypeTag::SfsArray),
                ("narrowed", TypeTag::Short),
            ]
        );
    }

    #[test]
    fn test_array_count_widths() {
        let mut root = Object::new();
        root.insert("f".to_string(), Value::FloatArray(vec![1.0; 300]));
        let frame = Packer::new().pack(&root, false).unwrap();

        // header(3) + object tag and count(3) + key "f"(3), then the array
        let array = &frame[9..];
        assert_eq!(array[0], TypeTag::FloatArray as u8);
        assert_eq!(&array[1..3], &300u16.to_be_bytes());
        assert_eq!(array.len(), 1 + 2 + 300 * 4);

        let mut root = Object::new();
        root.insert("b".to_string(), Value::BoolArray(vec![true; 3]));
        let frame = Packer::new().pack(&root, false).unwrap();

        let array = &frame[9..];
        assert_eq!(array[0], TypeTag::BoolArray as u8);
        assert_eq!(&array[1..5], &3u32.to_be_bytes());
        assert_eq!(unpack(&frame).unwrap(), root);
    }

    #[test]
    fn test_compressed_header_carries_payload_length() {
        let root = marshal(&test_respond()).unwrap();
        let plain = pack(&root, false).unwrap();
        let compressed = pack(&root, true).unwrap();

        assert_eq!(compressed[0], COMPRESSED_FLAG);
        assert_eq!(compressed[1..3], plain[1..3]);
        assert_eq!(unpack(&compressed).unwrap(), root);
    }

    #[test]
    fn test_large_frame_uses_wide_length() {
        let mut root = Object::new();
        root.insert("t".to_string(), Value::Text("x".repeat(70_000)));
        let frame = pack(&root, false).unwrap();

        assert_eq!(frame[0], LARGE_LENGTH_FLAG);
        let length = u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]);
        assert_eq!(length as usize, frame.len() - 5);
        assert_eq!(unpack(&frame).unwrap(), root);
    }

    #[test]
    fn test_unpack_value_any_root() {
        let mut frame = vec![0x00, 0x00, 0x05];
        frame.extend_from_slice(&[TypeTag::Int as u8, 0, 0, 0, 42]);

        assert_eq!(Unpacker::new().unpack_value(&frame).unwrap(), Value::Int(42));
        assert!(matches!(
            unpack(&frame).unwrap_err(),
            Error::TypeMismatch {
                found: TypeTag::Int,
                ..
            }
        ));
    }
}

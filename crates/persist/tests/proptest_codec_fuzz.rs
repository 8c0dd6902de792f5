//! Fuzz-style property tests for the persisted data codec.
//!
//! Critical properties:
//! - Reading arbitrary bytes never panics
//! - Every value tree survives encode then full decode
//! - Scalar getters see through one-element arrays

use proptest::prelude::*;
use terablock_persist::{ArrayValue, ByteBufferSerializer, PersistedData, Value};

fn finite_f32() -> impl Strategy<Value = f32> {
    prop::num::f32::NORMAL | prop::num::f32::ZERO | prop::num::f32::SUBNORMAL
}

fn finite_f64() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::ZERO | prop::num::f64::SUBNORMAL
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        finite_f32().prop_map(Value::Float),
        finite_f64().prop_map(Value::Double),
        any::<i64>().prop_map(Value::Long),
        any::<i32>().prop_map(Value::Integer),
        ".*".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::ByteBuffer),
    ]
}

fn primitive_array() -> impl Strategy<Value = ArrayValue> {
    prop_oneof![
        prop::collection::vec(any::<bool>(), 0..20).prop_map(ArrayValue::Boolean),
        prop::collection::vec(finite_f32(), 0..8).prop_map(ArrayValue::Float),
        prop::collection::vec(finite_f64(), 0..8).prop_map(ArrayValue::Double),
        prop::collection::vec(any::<i64>(), 0..8).prop_map(ArrayValue::Long),
        prop::collection::vec(any::<i32>(), 0..8).prop_map(ArrayValue::Integer),
        prop::collection::vec(".{0,6}", 0..6).prop_map(ArrayValue::String),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..6), 0..6)
            .prop_map(ArrayValue::Bytes),
    ]
}

fn value_tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![scalar(), primitive_array().prop_map(Value::Array)];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|values| Value::Array(ArrayValue::Value(values))),
            prop::collection::vec(("[a-z]{0,4}", inner), 0..6).prop_map(Value::Map),
        ]
    })
}

proptest! {
    /// Property: Arbitrary bytes don't crash the reader
    #[test]
    fn arbitrary_bytes_dont_crash(bytes in prop::collection::vec(any::<u8>(), 0..1024)) {
        if let Ok(view) = PersistedData::read(&bytes) {
            let _ = view.to_value();
            let _ = view.as_integer();
            let _ = view.as_string();
            let _ = view.as_boolean_array();
            if let Ok(array) = view.as_array() {
                for element in array.iter().take(64) {
                    let _ = element.and_then(|e| e.to_value());
                }
                let _ = array.get(array.len().saturating_sub(1));
            }
            if let Ok(map) = view.as_map() {
                let _ = map.get("a");
                let _ = map.keys();
            }
        }
    }

    /// Property: Corrupting one byte of a valid encoding never panics
    #[test]
    fn corrupted_encodings_dont_crash(
        tree in value_tree(),
        index in any::<prop::sample::Index>(),
        byte in any::<u8>(),
    ) {
        let mut bytes = ByteBufferSerializer.serialize(&tree).unwrap().into_bytes();
        let at = index.index(bytes.len());
        bytes[at] = byte;
        if let Ok(view) = PersistedData::read(&bytes) {
            let _ = view.to_value();
        }
    }

    /// Property: Value trees roundtrip
    #[test]
    fn value_trees_roundtrip(tree in value_tree()) {
        let encoded = ByteBufferSerializer.serialize(&tree).unwrap();
        prop_assert_eq!(encoded.view().to_value().unwrap(), tree.clone());
        let reread = PersistedData::read(encoded.as_bytes()).unwrap();
        prop_assert_eq!(reread.to_value().unwrap(), tree);
    }

    /// Property: One-element arrays read like their element
    #[test]
    fn single_element_arrays_coerce(int in any::<i32>(), text in ".*", flag in any::<bool>()) {
        let ser = ByteBufferSerializer;
        prop_assert_eq!(ser.serialize_integers(&[int]).unwrap().view().as_integer().unwrap(), int);
        let longs = ser.serialize_longs(&[i64::from(int)]).unwrap();
        prop_assert_eq!(longs.view().as_integer().unwrap(), int);
        let strings = ser.serialize_strings(&[text.as_str()]).unwrap();
        prop_assert_eq!(
            strings.view().as_string().unwrap(),
            text.as_str()
        );
        let flags = ser.serialize_booleans(&[flag]).unwrap();
        prop_assert_eq!(flags.view().as_boolean().unwrap(), flag);
        let wrapped = ser.serialize_values(&[Value::Integer(int)]).unwrap();
        prop_assert_eq!(wrapped.view().as_long().unwrap(), i64::from(int));
    }
}

#[test]
fn edge_values_roundtrip() {
    let edges = vec![
        Value::Integer(0),
        Value::Integer(i32::MIN),
        Value::Long(i64::MIN),
        Value::Long(-1),
        Value::Float(-0.0),
        Value::Double(f64::MAX),
        Value::from(""),
        Value::from("日本語 ✓"),
        Value::Bytes(Vec::new()),
        Value::Array(ArrayValue::Boolean(Vec::new())),
        Value::Array(ArrayValue::Value(Vec::new())),
        Value::Map(Vec::new()),
    ];
    for value in edges {
        let encoded = ByteBufferSerializer.serialize(&value).unwrap();
        assert_eq!(encoded.view().to_value().unwrap(), value);
    }
}

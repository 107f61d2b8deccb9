//! Property-based tests for the round-trip and narrowing guarantees.
//!
//! Every generated record goes through the full pipeline: build the tree,
//! encode it, decode it, apply it.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_conf::{from_value, marshal_with, unmarshal_with, Codec, Json, Value, Yaml};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone)]
struct Inner {
    #[serde(rename = "name")]
    name: String,
    #[serde(rename = "flags")]
    flags: Vec<bool>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone)]
struct Record {
    #[serde(rename = "i8")]
    small: i8,
    #[serde(rename = "i32")]
    int: i32,
    #[serde(rename = "i64")]
    long: i64,
    #[serde(rename = "u16")]
    half: u16,
    #[serde(rename = "u64")]
    quad: u64,
    #[serde(rename = "f64")]
    double: f64,
    #[serde(rename = "text")]
    text: String,
    #[serde(rename = "array")]
    array: [u8; 4],
    #[serde(rename = "list")]
    list: Vec<i32>,
    #[serde(rename = "map")]
    map: BTreeMap<String, u32>,
    #[serde(rename = "keyed")]
    keyed: BTreeMap<i16, bool>,
    #[serde(rename = "inner")]
    inner: Inner,
    #[serde(rename = "maybe")]
    maybe: Option<Inner>,
}

fn inner_strategy() -> impl Strategy<Value = Inner> {
    ("[a-zA-Z0-9 _-]{0,12}", prop::collection::vec(any::<bool>(), 0..5))
        .prop_map(|(name, flags)| Inner { name, flags })
}

/// Floats with an exact short decimal form, so every codec parses them back bit for bit.
fn quarter_strategy() -> impl Strategy<Value = f64> {
    (-4_000_000i32..4_000_000).prop_map(|n| f64::from(n) / 4.0)
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        (any::<i8>(), any::<i32>(), any::<i64>(), any::<u16>(), any::<u64>()),
        (quarter_strategy(), "[ -~]{0,24}", any::<[u8; 4]>()),
        (
            prop::collection::vec(any::<i32>(), 0..8),
            prop::collection::btree_map("[a-z]{1,6}", any::<u32>(), 0..5),
            prop::collection::btree_map(any::<i16>(), any::<bool>(), 0..5),
        ),
        (inner_strategy(), proptest::option::of(inner_strategy())),
    )
        .prop_map(
            |((small, int, long, half, quad), (double, text, array), (list, map, keyed), (inner, maybe))| {
                Record {
                    small,
                    int,
                    long,
                    half,
                    quad,
                    double,
                    text,
                    array,
                    list,
                    map,
                    keyed,
                    inner,
                    maybe,
                }
            },
        )
}

fn roundtrip<C: Codec>(record: &Record, codec: &C) -> Record {
    let mut sink = Vec::new();
    marshal_with(&mut sink, record, codec).unwrap();
    let mut back = Record::default();
    unmarshal_with(sink.as_slice(), &mut back, codec).unwrap();
    back
}

proptest! {
    #[test]
    fn prop_yaml_round_trip(record in record_strategy()) {
        prop_assert_eq!(roundtrip(&record, &Yaml), record);
    }

    #[test]
    fn prop_json_round_trip(record in record_strategy()) {
        prop_assert_eq!(roundtrip(&record, &Json::new()), record);
    }

    #[test]
    fn prop_i8_narrowing_is_twos_complement(n in any::<i64>()) {
        prop_assert_eq!(from_value::<i8>(Value::from(n)).unwrap(), n as i8);
    }

    #[test]
    fn prop_u16_narrowing_is_twos_complement(n in any::<i64>()) {
        prop_assert_eq!(from_value::<u16>(Value::from(n)).unwrap(), n as u16);
    }

    #[test]
    fn prop_f32_narrowing(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        prop_assert_eq!(from_value::<f32>(Value::from(x)).unwrap(), x as f32);
    }
}

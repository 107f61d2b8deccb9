//! Tree building: typed values to document trees.
//!
//! This module provides [`ValueSerializer`], a `serde::Serializer` whose output
//! is a [`Value`] tree rather than text. Records become mappings keyed by their
//! field tags, sequences and fixed-size arrays become sequences, keyed maps
//! become mappings with text keys, and primitives become scalars unchanged.
//!
//! ## Field Tags
//!
//! The tag of a record field is its serde name, so `#[serde(rename = "num")]`
//! sets the mapping key. A field marked `#[serde(skip)]` has no tag and
//! contributes no key at all. An empty rename is not a tag: it fails with
//! [`Error::InvalidDataType`] here and when applying.
//!
//! ```rust
//! use serde_conf::{conf, to_value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Conf {
//!     #[serde(rename = "num")]
//!     num: i32,
//!     #[serde(skip)]
//!     scratch: i32,
//! }
//!
//! let tree = to_value(&Conf { num: 1337, scratch: 7 }).unwrap();
//! assert_eq!(tree, conf!({ "num": 1337 }));
//! ```
//!
//! ## Unsupported Kinds
//!
//! Kinds with no mapping to the document model fail with
//! [`Error::InvalidDataType`] and abort the whole build: enum variants carrying
//! data, 128-bit integers outside the 64-bit range, and map keys that are not
//! scalars.

use crate::{Error, Mapping, Number, Result, Value, MAX_DEPTH};
use serde::{ser, Serialize};

/// Builds a [`Value`] tree from any `T: Serialize`.
///
/// Most callers should use [`to_value`](crate::to_value).
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueSerializer {
    depth: usize,
}

impl ValueSerializer {
    /// Creates a serializer for a top-level value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the serializer for the children of a container opened at this depth.
    fn nested(self) -> Result<ValueSerializer> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::RecursionLimitExceeded(MAX_DEPTH));
        }
        Ok(ValueSerializer {
            depth: self.depth + 1,
        })
    }
}

pub struct SerializeVec {
    vec: Vec<Value>,
    child: ValueSerializer,
}

pub struct SerializeMap {
    map: Mapping,
    current_key: Option<String>,
    child: ValueSerializer,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = ser::Impossible<Value, Error>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = ser::Impossible<Value, Error>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(Number::Integer(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        if let Ok(i) = i64::try_from(v) {
            Ok(Value::Number(Number::Integer(i)))
        } else if let Ok(u) = u64::try_from(v) {
            Ok(Value::Number(Number::Unsigned(u)))
        } else {
            Err(Error::invalid_data_type("128-bit integer out of 64-bit range"))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        match u64::try_from(v) {
            Ok(u) => Ok(Value::Number(Number::from(u))),
            Err(_) => Err(Error::invalid_data_type("128-bit integer out of 64-bit range")),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Number(Number::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        self.nested()?;
        let vec = v.iter().map(|&b| Value::from(b)).collect();
        Ok(Value::Sequence(vec))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::invalid_data_type(&format!(
            "newtype variant {}::{}",
            name, variant
        )))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self.nested()?, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self.nested()?, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(self.nested()?, len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::invalid_data_type(&format!(
            "tuple variant {}::{}",
            name, variant
        )))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(self.nested()?, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(self.nested()?, len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::invalid_data_type(&format!(
            "struct variant {}::{}",
            name, variant
        )))
    }
}

impl SerializeVec {
    fn new(child: ValueSerializer, capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            child,
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(value.serialize(self.child)?);
        Ok(())
    }
}

impl SerializeMap {
    fn new(child: ValueSerializer, capacity: usize) -> Self {
        SerializeMap {
            map: Mapping::with_capacity(capacity),
            current_key: None,
            child,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Sequence(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Sequence(self.vec))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Sequence(self.vec))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Mapping(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if key.is_empty() {
            return Err(Error::invalid_data_type("record field with an empty tag"));
        }
        self.map.insert(key.to_string(), value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Mapping(self.map))
    }
}

/// Converts a keyed map's key to its text form.
struct MapKeySerializer;

fn key_must_be_scalar(found: &str) -> Error {
    Error::invalid_data_type(&format!("map key must be a scalar, found {}", found))
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_must_be_scalar("bytes"))
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_must_be_scalar("null"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_scalar("option"))
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_must_be_scalar("null"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_must_be_scalar("null"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_scalar("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_scalar("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_scalar("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_scalar("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_scalar("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_scalar("mapping"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_scalar("record"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_scalar("struct variant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_value;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct TestConf {
        #[serde(rename = "num")]
        num: i32,
        #[serde(rename = "str")]
        text: String,
        #[serde(skip)]
        _cache: Vec<u8>,
        #[serde(skip)]
        _dirty: bool,
    }

    #[derive(Serialize)]
    struct EmptyTags {
        #[serde(rename = "kept")]
        kept: u8,
        #[serde(rename = "")]
        first: String,
        #[serde(rename = "")]
        second: String,
    }

    #[derive(Serialize)]
    enum Shape {
        Square,
        Circle(f64),
    }

    #[test]
    fn test_record_builds_mapping_in_declaration_order() {
        let conf = TestConf {
            num: 1337,
            text: "foo".to_string(),
            _cache: vec![1, 2],
            _dirty: true,
        };
        let value = to_value(&conf).unwrap();
        let map = value.as_mapping().unwrap();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["num", "str"]);
        assert_eq!(map.get("num"), Some(&Value::Number(Number::Integer(1337))));
        assert_eq!(map.get("str"), Some(&Value::String("foo".to_string())));
    }

    #[test]
    fn test_empty_tag_is_invalid() {
        let conf = EmptyTags {
            kept: 1,
            first: "a".to_string(),
            second: "b".to_string(),
        };
        assert!(to_value(&conf).unwrap_err().is_invalid_data_type());
    }

    #[test]
    fn test_sequences_and_arrays_preserve_order() {
        assert_eq!(
            to_value(&[3u8, 1, 2]).unwrap(),
            Value::Sequence(vec![Value::from(3), Value::from(1), Value::from(2)])
        );
        assert_eq!(
            to_value(&vec!["foo", "bar"]).unwrap(),
            Value::Sequence(vec![Value::from("foo"), Value::from("bar")])
        );
    }

    #[test]
    fn test_map_keys_become_text() {
        let mut map = BTreeMap::new();
        map.insert(1u16, "one");
        map.insert(2u16, "two");
        let value = to_value(&map).unwrap();
        assert_eq!(value.get("1"), Some(&Value::from("one")));
        assert_eq!(value.get("2"), Some(&Value::from("two")));
    }

    #[test]
    fn test_composite_map_key_is_invalid() {
        let mut map = BTreeMap::new();
        map.insert(vec![1], 1);
        assert!(to_value(&map).unwrap_err().is_invalid_data_type());
    }

    #[test]
    fn test_unit_variant_builds_text() {
        assert_eq!(to_value(&Shape::Square).unwrap(), Value::from("Square"));
    }

    #[test]
    fn test_data_variant_is_invalid() {
        let err = to_value(&vec![Shape::Square, Shape::Circle(1.0)]).unwrap_err();
        match err {
            Error::InvalidDataType(what) => assert_eq!(what, "newtype variant Shape::Circle"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wide_integers() {
        assert_eq!(to_value(&u64::MAX).unwrap(), Value::Number(Number::Unsigned(u64::MAX)));
        assert_eq!(to_value(&-5i128).unwrap(), Value::from(-5));
        assert!(to_value(&i128::MIN).unwrap_err().is_invalid_data_type());
        assert!(to_value(&u128::MAX).unwrap_err().is_invalid_data_type());
    }

    #[test]
    fn test_options_and_units() {
        assert_eq!(to_value(&None::<i32>).unwrap(), Value::Null);
        assert_eq!(to_value(&Some(3)).unwrap(), Value::from(3));
        assert_eq!(to_value(&()).unwrap(), Value::Null);
    }

    #[test]
    fn test_recursion_limit() {
        #[derive(Serialize)]
        struct Node {
            next: Option<Box<Node>>,
        }

        let mut node = Node { next: None };
        for _ in 0..MAX_DEPTH + 1 {
            node = Node {
                next: Some(Box::new(node)),
            };
        }
        assert!(matches!(
            to_value(&node),
            Err(Error::RecursionLimitExceeded(MAX_DEPTH))
        ));
    }
}

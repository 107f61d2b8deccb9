//! Tree applying: document trees to typed values.
//!
//! This module provides [`ValueDeserializer`], a `serde::Deserializer` that walks
//! a [`Value`] tree and the target type's shape in lockstep.
//!
//! ## Overview
//!
//! - **Records** iterate their declared field catalog in order and fetch each
//!   tag from the mapping. Keys the record does not declare are never visited.
//! - **Absent values** (a missing key or an explicit `null`) apply as the zero
//!   value of the target: `false`, `0`, `""`, empty sequences and mappings,
//!   `None`, a record whose fields are all zero, the first variant of an enum.
//!   Only unit variants can be applied, so an enum whose first declared variant
//!   carries data has no zero value and an absent node fails with
//!   [`Error::InvalidDataType`]. Declare the default unit variant first.
//! - **Field tags** come from the catalog of declared fields. `#[serde(skip)]`
//!   fields are not in it and keep their `Default`. An empty rename fails with
//!   [`Error::InvalidDataType`].
//! - **Integers** narrow to the declared width by two's-complement truncation.
//! - **Fixed-size arrays** need at least as many elements as they hold; extras
//!   are ignored.
//!
//! ```rust
//! use serde_conf::{conf, from_value};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Conf {
//!     #[serde(rename = "num")]
//!     num: i8,
//!     #[serde(rename = "str")]
//!     text: String,
//! }
//!
//! let conf: Conf = from_value(conf!({ "num": 300, "extra": true })).unwrap();
//! assert_eq!(conf, Conf { num: 44, text: String::new() });
//! ```
//!
//! ## Failure
//!
//! The first error stops the walk. A node whose kind disagrees with the target
//! fails with [`Error::TypeMismatch`], enum variants carrying data fail with
//! [`Error::InvalidDataType`], and targets that can only borrow from the
//! document (`&str`, `&[u8]`) fail with [`Error::FieldUnsettable`] because the
//! tree is owned and dropped once applied.

use crate::{Error, Kind, Mapping, Number, Result, Value, MAX_DEPTH};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, IntoDeserializer};

/// Position of a node within the walk: nesting depth and the nearest field tag.
#[derive(Clone, Copy, Debug, Default)]
struct Context {
    depth: usize,
    field: Option<&'static str>,
}

impl Context {
    fn nested(self) -> Result<Context> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::RecursionLimitExceeded(MAX_DEPTH));
        }
        Ok(Context {
            depth: self.depth + 1,
            ..self
        })
    }

    fn in_field(self, field: &'static str) -> Context {
        Context {
            field: Some(field),
            ..self
        }
    }
}

/// Applies an owned [`Value`] tree to any `T: Deserialize`.
///
/// A `null` node applies as the zero value of whatever is asked for. For an
/// enum that is the first declared variant, which must be a unit variant.
///
/// Most callers should use [`from_value`](crate::from_value).
pub struct ValueDeserializer {
    value: Value,
    cx: Context,
}

impl ValueDeserializer {
    /// Creates a deserializer for a top-level document tree.
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer {
            value,
            cx: Context::default(),
        }
    }

    fn with_context(value: Value, cx: Context) -> Self {
        ValueDeserializer { value, cx }
    }
}

/// Maps a visitor's refusal of owned data to the unsettable-field error.
///
/// The visitor asked for a string (or bytes) and then rejected one: it can only
/// hold data borrowed from the document.
fn owned_rejected(err: Error, kind: Kind, field: Option<&str>) -> Error {
    match err {
        Error::TypeMismatch { found, .. } if found == kind => Error::field_unsettable(field),
        err => err,
    }
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            match self.value {
                Value::Null => visitor.$visit(0),
                Value::Number(n) => match n.bits() {
                    Some(bits) => visitor.$visit(bits as $ty),
                    None => Err(Error::type_mismatch(stringify!($ty), Kind::Float)),
                },
                other => Err(Error::type_mismatch(stringify!($ty), other.kind())),
            }
        }
    )*};
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::Unsigned(u)) => visitor.visit_u64(u),
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Sequence(seq) => visitor.visit_seq(SeqDeserializer::new(seq, self.cx.nested()?)),
            Value::Mapping(map) => visitor.visit_map(MapDeserializer::new(map, self.cx.nested()?)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_bool(false),
            Value::Bool(b) => visitor.visit_bool(b),
            other => Err(Error::type_mismatch("bool", other.kind())),
        }
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
    }

    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_i128(0),
            Value::Number(Number::Integer(i)) => visitor.visit_i128(i as i128),
            Value::Number(Number::Unsigned(u)) => visitor.visit_i128(u as i128),
            other => Err(Error::type_mismatch("i128", other.kind())),
        }
    }

    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_u128(0),
            Value::Number(Number::Integer(i)) => visitor.visit_u128(i as u128),
            Value::Number(Number::Unsigned(u)) => visitor.visit_u128(u as u128),
            other => Err(Error::type_mismatch("u128", other.kind())),
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_f32(0.0),
            Value::Number(n) => visitor.visit_f32(n.as_f64() as f32),
            other => Err(Error::type_mismatch("f32", other.kind())),
        }
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_f64(0.0),
            Value::Number(n) => visitor.visit_f64(n.as_f64()),
            other => Err(Error::type_mismatch("f64", other.kind())),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_char('\0'),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => visitor.visit_char(c),
                    _ => Err(de::Error::invalid_value(de::Unexpected::Str(&s), &"a single character")),
                }
            }
            other => Err(Error::type_mismatch("char", other.kind())),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let field = self.cx.field;
        let s = match self.value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => return Err(Error::type_mismatch("string", other.kind())),
        };
        visitor
            .visit_string(s)
            .map_err(|err| owned_rejected(err, Kind::String, field))
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let field = self.cx.field;
        let bytes = match self.value {
            Value::Null => Vec::new(),
            Value::String(s) => s.into_bytes(),
            Value::Sequence(seq) => seq
                .into_iter()
                .map(|element| match element {
                    Value::Number(n) => n
                        .bits()
                        .map(|bits| bits as u8)
                        .ok_or_else(|| Error::type_mismatch("byte", Kind::Float)),
                    other => Err(Error::type_mismatch("byte", other.kind())),
                })
                .collect::<Result<Vec<u8>>>()?,
            other => return Err(Error::type_mismatch("bytes", other.kind())),
        };
        visitor
            .visit_byte_buf(bytes)
            .map_err(|err| owned_rejected(err, Kind::Bytes, field))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            other => Err(Error::type_mismatch("null", other.kind())),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let cx = self.cx.nested()?;
        match self.value {
            Value::Null => visitor.visit_seq(SeqDeserializer::new(Vec::new(), cx)),
            Value::Sequence(seq) => visitor.visit_seq(SeqDeserializer::new(seq, cx)),
            other => Err(Error::type_mismatch("sequence", other.kind())),
        }
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let cx = self.cx.nested()?;
        match self.value {
            Value::Null => visitor.visit_seq(SeqDeserializer::new(vec![Value::Null; len], cx)),
            Value::Sequence(mut seq) => {
                if seq.len() < len {
                    return Err(Error::InvalidLength {
                        expected: format!("a sequence of at least {} elements", len),
                        found: seq.len(),
                    });
                }
                seq.truncate(len);
                visitor.visit_seq(SeqDeserializer::new(seq, cx))
            }
            other => Err(Error::type_mismatch("sequence", other.kind())),
        }
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let cx = self.cx.nested()?;
        match self.value {
            Value::Null => visitor.visit_map(MapDeserializer::new(Mapping::new(), cx)),
            Value::Mapping(map) => visitor.visit_map(MapDeserializer::new(map, cx)),
            other => Err(Error::type_mismatch("mapping", other.kind())),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let cx = self.cx.nested()?;
        match self.value {
            Value::Null => visitor.visit_map(StructDeserializer::new(fields, Mapping::new(), cx)),
            Value::Mapping(map) => visitor.visit_map(StructDeserializer::new(fields, map, cx)),
            other => Err(Error::type_mismatch("mapping", other.kind())),
        }
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => match variants.first() {
                Some(first) => visitor.visit_enum(EnumDeserializer::new(first.to_string(), name)),
                None => Err(Error::type_mismatch("enum variant name", Kind::Null)),
            },
            Value::String(variant) => visitor.visit_enum(EnumDeserializer::new(variant, name)),
            Value::Mapping(_) => Err(Error::invalid_data_type(&format!(
                "enum variant with data for {}",
                name
            ))),
            other => Err(Error::type_mismatch("enum variant name", other.kind())),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        drop(self);
        visitor.visit_unit()
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
    cx: Context,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>, cx: Context) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
            cx,
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer::with_context(value, self.cx))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Walks a keyed mapping target: every entry of the node, keys converted from text.
struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
    cx: Context,
}

impl MapDeserializer {
    fn new(map: Mapping, cx: Context) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
            cx,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(MapKeyDeserializer { key }).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::with_context(value, self.cx)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

/// Walks a record target: one entry per declared field, in declaration order.
struct StructDeserializer {
    fields: std::slice::Iter<'static, &'static str>,
    map: Mapping,
    pending: Option<(&'static str, Value)>,
    cx: Context,
}

impl StructDeserializer {
    fn new(fields: &'static [&'static str], map: Mapping, cx: Context) -> Self {
        StructDeserializer {
            fields: fields.iter(),
            map,
            pending: None,
            cx,
        }
    }
}

impl<'de> de::MapAccess<'de> for StructDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some(&field) = self.fields.next() else {
            return Ok(None);
        };
        if field.is_empty() {
            return Err(Error::invalid_data_type("record field with an empty tag"));
        }
        let value = match self.map.swap_remove(field) {
            Some(value) => value,
            None => {
                trace!(field, "field absent, applying zero value");
                Value::Null
            }
        };
        self.pending = Some((field, value));
        seed.deserialize(BorrowedStrDeserializer::<Error>::new(field))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some((field, value)) => {
                seed.deserialize(ValueDeserializer::with_context(value, self.cx.in_field(field)))
            }
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

struct EnumDeserializer {
    variant: String,
    name: &'static str,
}

impl EnumDeserializer {
    fn new(variant: String, name: &'static str) -> Self {
        EnumDeserializer { variant, name }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = UnitVariant;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let deserializer: de::value::StringDeserializer<Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(deserializer)?;
        Ok((variant, UnitVariant { name: self.name }))
    }
}

/// Only unit variants map to the document model; they are written as their name.
struct UnitVariant {
    name: &'static str,
}

impl UnitVariant {
    fn carries_data(&self, what: &str) -> Error {
        Error::invalid_data_type(&format!("{} of {}", what, self.name))
    }
}

impl<'de> de::VariantAccess<'de> for UnitVariant {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, _seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        Err(self.carries_data("newtype variant"))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.carries_data("tuple variant"))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.carries_data("struct variant"))
    }
}

/// Converts a text mapping key into the key type of a keyed mapping target.
struct MapKeyDeserializer {
    key: String,
}

fn key_must_be_scalar(found: &str) -> Error {
    Error::invalid_data_type(&format!("map key must be a scalar, found {}", found))
}

macro_rules! deserialize_parsed_key {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            match self.key.parse::<$ty>() {
                Ok(parsed) => visitor.$visit(parsed),
                Err(_) => Err(Error::type_mismatch(
                    concat!(stringify!($ty), " key"),
                    Kind::String,
                )),
            }
        }
    )*};
}

macro_rules! deserialize_composite_key {
    ($($method:ident($($arg:ident: $ty:ty),*) => $found:literal),* $(,)?) => {$(
        fn $method<V>(self, $(_: $ty,)* _visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            Err(key_must_be_scalar($found))
        }
    )*};
}

impl<'de> de::Deserializer<'de> for MapKeyDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.key)
    }

    deserialize_parsed_key! {
        deserialize_bool => visit_bool(bool),
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
        deserialize_char => visit_char(char),
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor
            .visit_string(self.key)
            .map_err(|err| owned_rejected(err, Kind::String, None))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(EnumDeserializer::new(self.key, name))
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    deserialize_composite_key! {
        deserialize_bytes() => "bytes",
        deserialize_byte_buf() => "bytes",
        deserialize_unit() => "null",
        deserialize_unit_struct(name: &'static str) => "null",
        deserialize_seq() => "sequence",
        deserialize_tuple(len: usize) => "tuple",
        deserialize_tuple_struct(name: &'static str, len: usize) => "tuple struct",
        deserialize_map() => "mapping",
        deserialize_struct(name: &'static str, fields: &'static [&'static str]) => "record",
    }
}

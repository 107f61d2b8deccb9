//! # serde_conf
//!
//! Marshal tagged Rust structs to configuration documents and back.
//!
//! ## How it works
//!
//! Marshaling walks a value through its `Serialize` impl and builds a generic
//! document tree ([`Value`]): records become mappings keyed by their field tags,
//! sequences become sequences, scalars stay scalars. A [`Codec`] then encodes the
//! finished tree as YAML (the default) or JSON. Unmarshaling runs the same steps
//! in reverse and applies the decoded tree onto the target's declared fields.
//!
//! The field tag is the serde rename: `#[serde(rename = "num")]`. Fields marked
//! `#[serde(skip)]` have no tag and are neither written nor read. An empty
//! rename is rejected with [`Error::InvalidDataType`].
//!
//! ## Key Features
//!
//! - **Lenient reads**: [`unmarshal`] leaves fields whose key is missing from the
//!   document as they were, [`from_str`] and [`from_value`] give them their zero
//!   value; keys the struct does not declare are ignored
//! - **Narrowing**: integers are truncated to the declared width, `f32` fields
//!   narrow from any number
//! - **Deterministic output**: mappings keep declaration order
//! - **Pluggable codecs**: YAML via `serde_yaml`, JSON via `serde_json`
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_conf::{marshal, unmarshal};
//!
//! #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
//! struct Conf {
//!     #[serde(rename = "num")]
//!     num: i32,
//!     #[serde(rename = "str")]
//!     text: String,
//! }
//!
//! let conf = Conf { num: 1337, text: "foo".to_string() };
//!
//! let mut sink = Vec::new();
//! marshal(&mut sink, &conf).unwrap();
//! assert_eq!(sink, b"num: 1337\nstr: foo\n");
//!
//! let mut back = Conf::default();
//! unmarshal(sink.as_slice(), &mut back).unwrap();
//! assert_eq!(back, conf);
//! ```
//!
//! ### Dynamic Values with conf! Macro
//!
//! ```rust
//! use serde_conf::{conf, Value};
//!
//! let doc = conf!({
//!     "num": 1337,
//!     "nested": { "str": "bar" }
//! });
//!
//! assert_eq!(doc.get("nested").and_then(|n| n.get("str")).and_then(Value::as_str), Some("bar"));
//! ```
//!
//! ## Errors
//!
//! Every operation stops at the first error. See [`Error`] for the categories.
//! Unmarshaling assigns into the target only once the whole document applied
//! cleanly, so a failed call leaves the target untouched.
//!
//! ## Logging
//!
//! With the `tracing` feature enabled, marshal and unmarshal calls log at debug
//! level and fields left at their zero value log at trace level.

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($tt:tt)*) => {
        ::tracing::trace!($($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($tt:tt)*) => {
        ::tracing::debug!($($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}

pub mod codec;
pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod ser;
pub mod value;

pub use codec::{Codec, Json, Yaml};
pub use de::ValueDeserializer;
pub use error::{Error, Result};
pub use map::Mapping;
pub use ser::ValueSerializer;
pub use value::{Kind, Number, Value};

use serde::{Deserialize, Serialize};
use std::io;

/// Maximum nesting of sequences, mappings and records in one document.
pub const MAX_DEPTH: usize = 128;

/// Builds the document tree for any `T: Serialize`.
///
/// # Examples
///
/// ```rust
/// use serde_conf::to_value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point {
///     #[serde(rename = "x")]
///     x: i32,
///     #[serde(skip)]
///     cache: u64,
/// }
///
/// let value = to_value(&Point { x: 1, cache: 9 }).unwrap();
/// assert!(value.is_mapping());
/// assert!(value.get("cache").is_none());
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidDataType`] if any nested value has no document mapping.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer::new())
}

/// Applies a document tree to a new `T`.
///
/// # Errors
///
/// Returns an error if the tree's shape disagrees with `T`, or if `T` holds
/// kinds the document model cannot fill.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<'de, T>(value: Value) -> Result<T>
where
    T: Deserialize<'de>,
{
    T::deserialize(ValueDeserializer::new(value))
}

/// Marshals a record to `writer` as YAML.
///
/// # Errors
///
/// See [`marshal_with`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn marshal<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    marshal_with(writer, value, &Yaml)
}

/// Marshals a record to `writer` with the given codec.
///
/// The document is encoded in full before anything is written, so a failed
/// call writes nothing.
///
/// # Examples
///
/// ```rust
/// use serde_conf::{marshal_with, Json};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Conf {
///     #[serde(rename = "num")]
///     num: i32,
/// }
///
/// let mut sink = Vec::new();
/// marshal_with(&mut sink, &Conf { num: 1 }, &Json::new()).unwrap();
/// assert_eq!(sink, br#"{"num":1}"#);
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidDataType`] for unsupported kinds, a type mismatch if
/// `value` does not build a mapping, the codec's error if encoding fails, or
/// [`Error::Io`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn marshal_with<W, T, C>(mut writer: W, value: &T, codec: &C) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
    C: ?Sized + Codec,
{
    let tree = build_document(value)?;
    let bytes = codec.encode(&tree)?;
    debug!(codec = codec.name(), len = bytes.len(), "marshaled document");
    writer.write_all(&bytes)?;
    Ok(())
}

/// Unmarshals YAML from `reader` into `target`.
///
/// # Errors
///
/// See [`unmarshal_with`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn unmarshal<'de, R, T>(reader: R, target: &mut T) -> Result<()>
where
    R: io::Read,
    T: Serialize + Deserialize<'de>,
{
    unmarshal_with(reader, target, &Yaml)
}

/// Unmarshals a document from `reader` into `target` with the given codec.
///
/// The reader is drained before decoding. Only the top-level keys present in
/// the document are applied: every other field of `target` keeps its current
/// value, so a struct filled with defaults can be overlaid with a partial file.
/// Keys present in the document replace their field as a whole, nested records
/// included. An empty document leaves `target` unchanged.
///
/// The overlay starts from the tree built from `target` itself, which is why
/// `T` must also be `Serialize`. Fields marked `#[serde(skip)]` are not in that
/// tree and come back as their `Default`.
///
/// `target` is replaced only if the whole document applies.
///
/// # Examples
///
/// ```rust
/// use serde_conf::{unmarshal_with, Json};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Conf {
///     #[serde(rename = "num")]
///     num: i8,
///     #[serde(rename = "port")]
///     port: u16,
/// }
///
/// let mut conf = Conf { num: 0, port: 8080 };
/// unmarshal_with(&br#"{"num": 300, "other": []}"#[..], &mut conf, &Json::new()).unwrap();
/// assert_eq!(conf.num, 44);
/// assert_eq!(conf.port, 8080);
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, the codec's error for malformed input,
/// a type mismatch if the document is not a mapping or disagrees with `T`,
/// [`Error::FieldUnsettable`] for fields that can only borrow, or
/// [`Error::InvalidDataType`] for unsupported kinds in the document or in the
/// current value of `target`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn unmarshal_with<'de, R, T, C>(mut reader: R, target: &mut T, codec: &C) -> Result<()>
where
    R: io::Read,
    T: Serialize + Deserialize<'de>,
    C: ?Sized + Codec,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    debug!(codec = codec.name(), len = bytes.len(), "unmarshaling document");
    let tree = document_tree(codec.decode(&bytes)?)?;
    let merged = overlay(to_value(&*target)?, tree);
    *target = from_value(merged)?;
    Ok(())
}

/// Marshals a record to a YAML string.
///
/// # Errors
///
/// Same as [`marshal`], minus I/O.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let tree = build_document(value)?;
    String::from_utf8(Yaml.encode(&tree)?).map_err(Error::custom)
}

/// Unmarshals a record from YAML text.
///
/// # Examples
///
/// ```rust
/// use serde_conf::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point {
///     #[serde(rename = "x")]
///     x: i32,
///     #[serde(rename = "y")]
///     y: i32,
/// }
///
/// let point: Point = from_str("x: 1").unwrap();
/// assert_eq!(point, Point { x: 1, y: 0 });
/// ```
///
/// # Errors
///
/// Same as [`unmarshal`], minus I/O.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'de, T>(s: &str) -> Result<T>
where
    T: Deserialize<'de>,
{
    from_value(document_tree(Yaml.decode(s.as_bytes())?)?)
}

fn build_document<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    match to_value(value)? {
        tree @ Value::Mapping(_) => Ok(tree),
        other => Err(Error::type_mismatch("record", other.kind())),
    }
}

/// Writes the document's top-level keys over the tree built from the target.
fn overlay(current: Value, document: Value) -> Value {
    match (current, document) {
        (Value::Mapping(mut current), Value::Mapping(document)) => {
            for (key, value) in document {
                current.insert(key, value);
            }
            Value::Mapping(current)
        }
        (_, document) => document,
    }
}

fn document_tree(decoded: Value) -> Result<Value> {
    match decoded {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        tree @ Value::Mapping(_) => Ok(tree),
        other => Err(Error::type_mismatch("record", other.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::io::Write;

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    struct Conf {
        #[serde(rename = "num")]
        num: i32,
        #[serde(rename = "str")]
        text: String,
    }

    #[test]
    fn test_marshal_declaration_order() {
        let conf = Conf {
            num: 1337,
            text: "foo".to_string(),
        };
        assert_eq!(to_string(&conf).unwrap(), "num: 1337\nstr: foo\n");
    }

    #[test]
    fn test_marshal_rejects_non_record() {
        let mut sink = Vec::new();
        let err = marshal(&mut sink, &vec![1, 2]).unwrap_err();
        match err {
            Error::TypeMismatch { expected, found } => {
                assert_eq!(expected, "record");
                assert_eq!(found, Kind::Sequence);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_unmarshal_keeps_fields_missing_from_document() {
        let mut conf = Conf {
            num: 8080,
            text: "default".to_string(),
        };
        unmarshal(&b"num: 1\n"[..], &mut conf).unwrap();
        assert_eq!(conf.num, 1);
        assert_eq!(conf.text, "default");
    }

    #[test]
    fn test_unmarshal_empty_document_keeps_target() {
        let mut conf = Conf {
            num: 5,
            text: "old".to_string(),
        };
        unmarshal(&b""[..], &mut conf).unwrap();
        assert_eq!(conf.num, 5);
        assert_eq!(conf.text, "old");
    }

    #[test]
    fn test_unmarshal_explicit_null_resets_field() {
        let mut conf = Conf {
            num: 5,
            text: "old".to_string(),
        };
        unmarshal(&b"str: ~\n"[..], &mut conf).unwrap();
        assert_eq!(conf.num, 5);
        assert_eq!(conf.text, "");
    }

    #[test]
    fn test_to_string_matches_marshal() {
        let conf = Conf {
            num: 7,
            text: "seven".to_string(),
        };
        let mut sink = Vec::new();
        marshal(&mut sink, &conf).unwrap();
        assert_eq!(to_string(&conf).unwrap().as_bytes(), sink.as_slice());
    }

    #[test]
    fn test_unmarshal_rejects_non_record() {
        let mut conf = Conf::default();
        let err = unmarshal(&b"- 1\n- 2\n"[..], &mut conf).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { found: Kind::Sequence, .. }));
    }

    #[test]
    fn test_unmarshal_failure_leaves_target() {
        let mut conf = Conf {
            num: 7,
            text: "keep".to_string(),
        };
        let err = unmarshal(&b"num: 1\nstr: [x]\n"[..], &mut conf).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(conf.num, 7);
        assert_eq!(conf.text, "keep");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_marshal_write_error() {
        let err = marshal(FailingWriter, &Conf::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let conf = Conf {
            num: -3,
            text: "bar".to_string(),
        };
        let mut sink = Vec::new();
        marshal_with(&mut sink, &conf, &Json::pretty()).unwrap();
        let mut back = Conf::default();
        unmarshal_with(sink.as_slice(), &mut back, &Json::new()).unwrap();
        assert_eq!(back, conf);
    }
}

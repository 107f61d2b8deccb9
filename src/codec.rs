//! Text codecs between document trees and bytes.
//!
//! A [`Codec`] turns a [`Value`] tree into bytes and back. Marshaling and
//! unmarshaling never look at text themselves; they hand the finished tree to a
//! codec, and codec failures pass through unchanged.
//!
//! - [`Yaml`]: the default codec, block-style YAML
//! - [`Json`]: compact or pretty-printed JSON
//!
//! ## Examples
//!
//! ```rust
//! use serde_conf::{conf, Codec, Json, Yaml};
//!
//! let doc = conf!({ "num": 1337, "str": "foo" });
//!
//! let yaml = Yaml.encode(&doc).unwrap();
//! assert_eq!(yaml, b"num: 1337\nstr: foo\n");
//!
//! let json = Json::new().encode(&doc).unwrap();
//! assert_eq!(json, br#"{"num":1337,"str":"foo"}"#);
//! assert_eq!(Json::new().decode(&json).unwrap(), doc);
//! ```

use crate::{Result, Value};

/// Converts document trees to bytes and back.
///
/// Implementations must round-trip every tree they produce: decoding the output of
/// `encode` yields an equal tree, modulo mapping order.
pub trait Codec {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Encodes a complete document.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decodes a complete document.
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

impl<C: Codec + ?Sized> Codec for &C {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        (**self).encode(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        (**self).decode(bytes)
    }
}

/// YAML codec backed by `serde_yaml`.
///
/// An empty (or whitespace-only) document decodes to [`Value::Null`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Yaml;

impl Codec for Yaml {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(serde_yaml::to_string(value)?.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_yaml::from_slice(bytes)?)
    }
}

/// JSON codec backed by `serde_json`.
///
/// # Examples
///
/// ```rust
/// use serde_conf::Json;
///
/// let compact = Json::new();
/// assert!(!compact.pretty);
///
/// let pretty = Json::pretty();
/// assert!(pretty.pretty);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Json {
    pub pretty: bool,
}

impl Json {
    /// Creates a codec producing compact single-line JSON.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec producing indented JSON.
    #[must_use]
    pub fn pretty() -> Self {
        Json { pretty: true }
    }

    /// Sets whether output is indented.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Codec for Json {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{conf, Error, Number};

    #[test]
    fn test_yaml_nested_layout() {
        let doc = conf!({
            "nested": { "str": "bar" },
            "list": ["a", "b"]
        });
        let text = String::from_utf8(Yaml.encode(&doc).unwrap()).unwrap();
        assert_eq!(text, "nested:\n  str: bar\nlist:\n- a\n- b\n");
        assert_eq!(Yaml.decode(text.as_bytes()).unwrap(), doc);
    }

    #[test]
    fn test_yaml_empty_document_is_null() {
        assert_eq!(Yaml.decode(b"").unwrap(), Value::Null);
        assert_eq!(Yaml.decode(b"  \n\t\n").unwrap(), Value::Null);
    }

    #[test]
    fn test_yaml_scalars() {
        let doc = Yaml
            .decode(b"int: -3\nbig: 18446744073709551615\nfloat: 1.5\nflag: yes\nempty: ~\n")
            .unwrap();
        assert_eq!(doc.get("int"), Some(&Value::from(-3)));
        assert_eq!(
            doc.get("big"),
            Some(&Value::Number(Number::Unsigned(u64::MAX)))
        );
        assert_eq!(doc.get("float"), Some(&Value::from(1.5)));
        assert_eq!(doc.get("empty"), Some(&Value::Null));
        // YAML 1.2: `yes` is text.
        assert_eq!(doc.get("flag"), Some(&Value::from("yes")));
    }

    #[test]
    fn test_yaml_non_text_keys_become_text() {
        let doc = Yaml.decode(b"1: one\ntrue: yes\n").unwrap();
        assert_eq!(doc.get("1"), Some(&Value::from("one")));
        assert_eq!(doc.get("true"), Some(&Value::from("yes")));
    }

    #[test]
    fn test_yaml_malformed_passes_through() {
        let err = Yaml.decode(b"key: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_json_pretty() {
        let doc = conf!({ "a": [1] });
        let text = String::from_utf8(Json::pretty().encode(&doc).unwrap()).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}");
        assert_eq!(Json::new().with_pretty(true), Json::pretty());
    }

    #[test]
    fn test_json_malformed_passes_through() {
        let err = Json::new().decode(b"{\"a\":").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_codec_through_reference() {
        fn encode_with<C: Codec>(codec: C) -> Vec<u8> {
            codec.encode(&Value::from(true)).unwrap()
        }
        let yaml = Yaml;
        assert_eq!(encode_with(&yaml), b"true\n");
        let boxed: Box<dyn Codec> = Box::new(Json::new());
        assert_eq!(encode_with(boxed.as_ref()), b"true");
    }
}

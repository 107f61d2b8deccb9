//! Error types for configuration marshaling and unmarshaling.
//!
//! Every failure is terminal for the call that produced it. The first error
//! encountered while walking a value or a document tree stops the walk and is
//! returned to the caller.
//!
//! ## Error Categories
//!
//! - **Invalid data types**: a kind with no mapping to the document model
//!   (enum variants carrying data, out-of-range 128-bit integers, composite map keys)
//! - **Unsettable fields**: a destination that cannot be written from an owned document
//! - **Type mismatches**: the document tree's shape disagrees with the target's shape
//! - **Codec errors**: malformed YAML/JSON, passed through unchanged
//! - **I/O errors**: reading the source or writing the sink failed
//!
//! ## Examples
//!
//! ```rust
//! use serde_conf::{from_str, Error};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug)]
//! struct Conf {
//!     #[serde(rename = "port")]
//!     port: u16,
//! }
//!
//! let err = from_str::<Conf>("port: [1, 2]").unwrap_err();
//! assert!(matches!(err, Error::TypeMismatch { .. }));
//! ```

use crate::value::Kind;
use serde::de::{Expected, Unexpected};
use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while marshaling or unmarshaling.
#[derive(Debug, Error)]
pub enum Error {
    /// A kind with no defined mapping to the document model.
    #[error("invalid data type: {0}")]
    InvalidDataType(String),

    /// A destination field exists but cannot be written.
    #[error("struct field not settable: {field}")]
    FieldUnsettable { field: String },

    /// The document node's kind disagrees with the target's kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: Kind },

    /// A sequence is shorter than the fixed-size target requires.
    #[error("invalid length {found}, expected {expected}")]
    InvalidLength { expected: String, found: usize },

    /// Nesting exceeded [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("recursion limit of {0} exceeded")]
    RecursionLimitExceeded(usize),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// YAML codec error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// JSON codec error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Custom error, usually raised by a type's own `Serialize`/`Deserialize` impl
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates an invalid data type error for kinds the document model cannot hold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_conf::Error;
    ///
    /// let err = Error::invalid_data_type("newtype variant");
    /// assert_eq!(err.to_string(), "invalid data type: newtype variant");
    /// ```
    pub fn invalid_data_type(what: &str) -> Self {
        Error::InvalidDataType(what.to_string())
    }

    /// Creates an unsettable field error naming the field's tag.
    pub fn field_unsettable(field: Option<&str>) -> Self {
        Error::FieldUnsettable {
            field: field.unwrap_or("<root>").to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_conf::{Error, Kind};
    ///
    /// let err = Error::type_mismatch("sequence", Kind::Mapping);
    /// assert_eq!(err.to_string(), "type mismatch: expected sequence, found mapping");
    /// ```
    pub fn type_mismatch(expected: &str, found: Kind) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found,
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns `true` for errors raised because a value has no document mapping.
    #[must_use]
    pub fn is_invalid_data_type(&self) -> bool {
        matches!(self, Error::InvalidDataType(_))
    }

    /// Returns `true` for errors raised because a destination cannot be written.
    #[must_use]
    pub fn is_field_unsettable(&self) -> bool {
        matches!(self, Error::FieldUnsettable { .. })
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    fn invalid_type(unexp: Unexpected, exp: &dyn Expected) -> Self {
        Error::TypeMismatch {
            expected: exp.to_string(),
            found: Kind::from(unexp),
        }
    }

    fn invalid_length(len: usize, exp: &dyn Expected) -> Self {
        Error::InvalidLength {
            expected: exp.to_string(),
            found: len,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::Error as _;

    #[test]
    fn test_invalid_type_is_structured() {
        let err = Error::invalid_type(Unexpected::Str("x"), &"a borrowed string");
        match err {
            Error::TypeMismatch { expected, found } => {
                assert_eq!(expected, "a borrowed string");
                assert_eq!(found, Kind::String);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_length_is_structured() {
        let err = Error::invalid_length(2, &"an array of length 3");
        assert!(matches!(err, Error::InvalidLength { found: 2, .. }));
    }

    #[test]
    fn test_field_unsettable_names_field() {
        assert_eq!(
            Error::field_unsettable(Some("name")).to_string(),
            "struct field not settable: name"
        );
        assert_eq!(
            Error::field_unsettable(None).to_string(),
            "struct field not settable: <root>"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "short read"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

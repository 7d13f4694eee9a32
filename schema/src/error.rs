//! Error types for schema operations

use crate::version::FormatVersion;
use thiserror::Error;

/// Error type for schema decode/encode operations.
///
/// Every variant is fatal and propagates to the top-level `decode_*`/`encode`
/// call; a failed decode yields no usable record.
#[derive(Error, Debug)]
pub enum Error {
    /// A cursor read ran past the end of the buffer.
    #[error("end of buffer: requested {requested} bytes, only {remaining} left")]
    Underrun { requested: usize, remaining: usize },
    /// Strict-mode decode finished with unconsumed bytes.
    #[error("{0} bytes left over after parsing all fields")]
    TrailingBytes(usize),
    /// A field, alias, or union is not applicable to the instance's version.
    #[error("{name:?} is not supported in struct version {version}")]
    Version {
        name: String,
        version: FormatVersion,
    },
    /// A record has a compressed section but no compression implementation.
    #[error("{0:?} has a compressed section but no compression implementation")]
    Compression(&'static str),
    /// A list field's stored length disagrees with its declared repeat.
    #[error("length of {name:?} is {actual}, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// A set-time validator rejected a value.
    #[error("invalid value for {name:?}: {message}")]
    Validation { name: String, message: String },
    /// A field without a default or default factory was asked to materialize one.
    #[error("no default value available for {0:?}")]
    MissingDefault(String),
    /// A value of the wrong kind was stored in or requested from a field.
    #[error("type mismatch: expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid data in {0}: {1}")]
    Invalid(String, String), // context, message
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

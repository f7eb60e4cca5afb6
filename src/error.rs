//! Error types for SFS operations.

use thiserror::Error;

use crate::types::TypeTag;

/// Result type for SFS operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for SFS operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A value or target does not have the shape an operation requires.
    #[error("shape error: {0}")]
    Shape(String),

    /// A value has no mapping to any type tag.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A required wire key is absent.
    #[error("required field {0} not found")]
    MissingField(String),

    /// The stored value does not match the declared or static type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: TypeTag },

    /// A numeric value does not fit the destination width.
    #[error("value {value} overflows {target}")]
    Overflow { value: String, target: &'static str },

    /// Buffer ends before an expected fixed or declared-length field.
    #[error("truncated input: needed {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    /// Unrecognized type tag byte.
    #[error("invalid type tag: {0}")]
    InvalidTypeTag(u8),

    /// Corrupt or truncated compressed stream.
    #[error("compression error: {0}")]
    Compression(String),

    /// A length or count exceeds the width of its field.
    #[error("{what} length {len} exceeds maximum {max}")]
    LimitExceeded {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// Unknown type name in a field tag.
    #[error("unknown data type: {0}")]
    UnknownDataType(String),

    /// Object key outside the accepted key length range.
    #[error("invalid object key length: {0}")]
    InvalidKeyLength(usize),

    /// A decoded object entry or array element is null.
    #[error("null value where a value is required")]
    NullValue,

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An inner error annotated with the field, key or index it came from.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a truncated input error.
    pub fn truncated(needed: usize, available: usize) -> Self {
        Self::Truncated { needed, available }
    }

    /// Creates a type mismatch error.
    pub fn mismatch(expected: impl Into<String>, found: TypeTag) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found,
        }
    }

    /// Creates an overflow error.
    pub fn overflow(value: impl ToString, target: &'static str) -> Self {
        Self::Overflow {
            value: value.to_string(),
            target,
        }
    }

    /// Creates a limit exceeded error.
    pub fn limit(what: &'static str, len: usize, max: usize) -> Self {
        Self::LimitExceeded { what, len, max }
    }

    /// Wraps this error with a context label.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping context layers.
    pub fn root_cause(&self) -> &Error {
        let mut err = self;
        while let Error::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// Returns the context labels from outermost to innermost.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut err = self;
        while let Error::Context { context, source } = err {
            path.push(context.as_str());
            err = source;
        }
        path
    }
}

/// Attaches field, key or index context to a failing result.
pub(crate) trait ResultExt<T> {
    fn field(self, name: &str) -> Result<T>;
    fn key(self, key: &str) -> Result<T>;
    fn index(self, index: usize) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn field(self, name: &str) -> Result<T> {
        self.map_err(|e| e.context(format!("field {name}")))
    }

    fn key(self, key: &str) -> Result<T> {
        self.map_err(|e| e.context(format!("key {key}")))
    }

    fn index(self, index: usize) -> Result<T> {
        self.map_err(|e| e.context(format!("index {index}")))
    }
}

//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a value was complete.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes required by the value being decoded.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// A fixed-size sequence was stored with a different length.
    #[error("length mismatch: expected {expected} elements, found {actual}")]
    LengthMismatch {
        /// Static length of the destination.
        expected: usize,
        /// Length prefix found in the input.
        actual: usize,
    },

    /// A sequence prefix claims more items than the input can hold.
    #[error("sequence of {len} items exceeds the limit of {limit}")]
    TooManyItems {
        /// Length prefix found in the input.
        len: usize,
        /// Most items the remaining input allows.
        limit: usize,
    },

    /// A length does not fit the 4-byte length prefix.
    #[error("length {len} exceeds the 4-byte length prefix")]
    LengthOverflow {
        /// The offending length.
        len: usize,
    },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A presence flag was neither 0 nor 1.
    #[error("invalid presence flag {0:#04x}")]
    InvalidPresenceFlag(u8),

    /// A tag byte did not name any variant of an enum.
    #[error("invalid {type_name} tag {tag}")]
    InvalidTag {
        /// Name of the enum being decoded.
        type_name: String,
        /// The unrecognized tag.
        tag: u8,
    },

    /// Text bytes were not valid UTF-8.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Bytes were left over after a complete value.
    #[error("{remaining} trailing bytes after value")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        remaining: usize,
    },

    /// The shape is not one the codec knows.
    #[error("unsupported type: {type_name}")]
    UnsupportedType {
        /// Name of the unsupported type.
        type_name: String,
    },

    /// A dynamic value does not match the shape it is encoded with.
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch {
        /// The shape being encoded.
        expected: String,
        /// Kind of the value that was supplied.
        found: String,
    },

    /// A shape expression could not be parsed.
    #[error("invalid shape at {position}: {message}")]
    InvalidShape {
        /// Byte position in the expression.
        position: usize,
        /// Description of the problem.
        message: String,
    },

    /// A buffer seek landed outside the written region.
    #[error("seek to {position} outside buffer of length {len}")]
    SeekOutOfBounds {
        /// The requested absolute position.
        position: i128,
        /// Current buffer length.
        len: usize,
    },
}

impl CodecError {
    /// Create an unexpected end-of-input error.
    pub fn unexpected_eof(needed: usize, remaining: usize) -> Self {
        Self::UnexpectedEof { needed, remaining }
    }

    /// Create an invalid tag error.
    pub fn invalid_tag(type_name: impl Into<String>, tag: u8) -> Self {
        Self::InvalidTag {
            type_name: type_name.into(),
            tag,
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid shape error.
    pub fn invalid_shape(position: usize, message: impl Into<String>) -> Self {
        Self::InvalidShape {
            position,
            message: message.into(),
        }
    }
}

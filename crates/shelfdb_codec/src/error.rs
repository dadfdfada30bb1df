//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value to bytes.
    #[error("{codec} encoding failed: {message}")]
    EncodingFailed {
        /// Name of the codec that failed.
        codec: &'static str,
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode bytes into a value.
    #[error("{codec} decoding failed: {message}")]
    DecodingFailed {
        /// Name of the codec that failed.
        codec: &'static str,
        /// Description of the decoding error.
        message: String,
    },

    /// A typed value could not be converted to or from the dynamic form.
    #[error("value conversion failed: {message}")]
    Conversion {
        /// Description of the conversion error.
        message: String,
    },

    /// Integer does not fit into a signed 128-bit value.
    #[error("integer overflow")]
    IntegerOverflow,

    /// The codec refused to register a record shape.
    #[error("cannot register shape {shape}: {message}")]
    Registration {
        /// Type name of the record shape.
        shape: String,
        /// Why registration failed.
        message: String,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(codec: &'static str, message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            codec,
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(codec: &'static str, message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            codec,
            message: message.into(),
        }
    }

    /// Create a conversion error.
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create a registration error.
    pub fn registration(shape: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registration {
            shape: shape.into(),
            message: message.into(),
        }
    }
}

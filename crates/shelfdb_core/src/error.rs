//! Error types for ShelfDB core.

use shelfdb_codec::CodecError;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in ShelfDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The collection has not been initialized yet.
    #[error("collection is not initialized (call init() first)")]
    NotInitialized,

    /// `init` was called on an already initialized collection.
    #[error("collection is already initialized")]
    AlreadyInitialized,

    /// The record does not encode to a structured map.
    #[error("record should be a struct or map")]
    InvalidRecordType,

    /// A record with this id already exists.
    #[error("id is not unique: {id}")]
    IdNotUnique {
        /// The conflicting id.
        id: String,
    },

    /// Another record already holds this value for an indexed field.
    #[error("{field:?} is not unique")]
    IndexedValueNotUnique {
        /// The indexed field whose value collided.
        field: String,
    },

    /// Record or index key not found.
    #[error("not found")]
    NotFound,

    /// Argument rejected before touching disk.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// Collection or store misconfiguration.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// Codec failure with the operation that triggered it.
    #[error("{context}: {source}")]
    Codec {
        /// Operation being performed (e.g. "decoding data").
        context: &'static str,
        /// Underlying codec error.
        #[source]
        source: CodecError,
    },

    /// Filesystem failure with the operation that triggered it.
    #[error("{context}: {source}")]
    Storage {
        /// Operation being performed (e.g. "loading record").
        context: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wraps a codec error with operation context.
    pub fn codec(context: &'static str, source: CodecError) -> Self {
        Self::Codec { context, source }
    }

    /// Wraps an I/O error with operation context.
    pub fn storage(context: &'static str, source: io::Error) -> Self {
        Self::Storage { context, source }
    }

    /// Returns true if this is a [`CoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

//! Error types for typedkv
//!
//! This module defines every error surfaced by the codec, the facades and
//! the transports. We use `thiserror` for automatic `Display` and `Error`
//! trait implementations.
//!
//! ## Taxonomy
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | `EncodingError` | codec, when a value cannot be serialized |
//! | `DecodingError` | codec, when stored text does not parse as the target type |
//! | `TransportError` | the store; propagated unchanged, never retried |
//! | `PreconditionError` | facades and transports, for invalid arguments |
//! | `ConfigError` | configuration loading |
//!
//! "Not found" is never an error: reads return `Option::None` or an empty
//! collection instead.

use thiserror::Error;

/// Result type alias for typedkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for typedkv
#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be encoded to its text representation
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Stored text could not be decoded into the requested type
    #[error("Decoding error: cannot decode {target}: {message}")]
    DecodingError {
        /// Name of the requested target type
        target: &'static str,
        /// Parser message
        message: String,
    },

    /// Connectivity or protocol failure reported by the store
    #[error("Transport error: {0}")]
    TransportError(#[from] TransportError),

    /// Caller supplied an invalid argument
    #[error("Precondition failed: {0}")]
    PreconditionError(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::PreconditionError(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::ConfigError(message.into())
    }

    /// Whether this error came from the store rather than from this layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::TransportError(_))
    }
}

/// Failures reported by a transport
///
/// These mirror the error replies of a Redis-style server. Facades never
/// inspect or recover from them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Command ran against a key holding a different collection type
    #[error("WRONGTYPE operation against key '{key}' holding the wrong kind of value")]
    WrongType {
        /// Offending key
        key: String,
    },

    /// Stored value is not an integer/float, or the result would overflow
    #[error("value at '{key}' is not a number or out of range")]
    NotNumeric {
        /// Offending key
        key: String,
    },

    /// Command requires an existing key
    #[error("no such key '{key}'")]
    NoSuchKey {
        /// Missing key
        key: String,
    },

    /// The connection is closed or unreachable
    #[error("connection unavailable: {0}")]
    Unavailable(String),

    /// Malformed request or reply
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Create a wrong-type error for `key`
    pub fn wrong_type(key: &str) -> Self {
        TransportError::WrongType {
            key: key.to_string(),
        }
    }

    /// Create a not-numeric error for `key`
    pub fn not_numeric(key: &str) -> Self {
        TransportError::NotNumeric {
            key: key.to_string(),
        }
    }

    /// Create a no-such-key error for `key`
    pub fn no_such_key(key: &str) -> Self {
        TransportError::NoSuchKey {
            key: key.to_string(),
        }
    }
}

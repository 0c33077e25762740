//! # Error Types
//!
//! Error handling for the tag format, the wire codec and the object mapper.
//!
//! ## Error Categories
//! - **Format Errors**: bad header tokens, truncated or corrupt streams, unknown kinds
//! - **Recursion Errors**: a tree deeper than the configured limit (encode, decode or mapping)
//! - **Mapping Errors**: no applicable dispatch rule, kind mismatches, wrong arity
//! - **Configuration Errors**: handler misconfiguration, invalid settings
//!
//! Recursion errors are always reported as their own variant so callers can tell
//! oversized input apart from corrupt input.
//!
//! ## Example Usage
//! ```rust
//! use hyper_tag::error::{ErrorMode, TagError};
//! use hyper_tag::{decode, DEFAULT_MAX_DEPTH};
//!
//! match decode(b"not a tag stream", DEFAULT_MAX_DEPTH) {
//!     Err(TagError::Format(reason)) => println!("corrupt input: {reason}"),
//!     Err(e) if e.is_recursion() => println!("input too deep"),
//!     other => println!("{other:?}"),
//! }
//!
//! // Suppress mode turns any failure into `None`.
//! let decoded = ErrorMode::Suppress.apply(decode(b"", DEFAULT_MAX_DEPTH)).unwrap();
//! assert!(decoded.is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;
use tracing::debug;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Header validation errors
    pub const ERR_BAD_MAGIC: &str = "The magic string is not correct";
    pub const ERR_BAD_FORMAT: &str = "This stream is not a tag stream";
    pub const ERR_NEGATIVE_LENGTH: &str = "Negative length in stream";
    pub const ERR_TRUNCATED_PAYLOAD: &str =
        "Compressed payload is shorter than its declared length";

    /// Stream decoding errors
    pub const ERR_UNEXPECTED_EOF: &str = "Unexpected end of data";
    pub const ERR_VARINT_TOO_LONG: &str = "Variable-length integer is malformed";
    pub const ERR_INVALID_UTF8: &str = "Invalid UTF-8 sequence";
    pub const ERR_INVALID_DECIMAL: &str = "Invalid decimal flags";

    /// Mapping errors
    pub const ERR_NO_DISPATCH_RULE: &str =
        "Type has no registered handler, is not self-describing and is not an aggregate";
    pub const ERR_EXPECTED_BLOB: &str = "Expected a Blob tag holding a boxed value";
    pub const ERR_EXPECTED_CONTAINER: &str = "Expected a Container tag";
    pub const ERR_ABSENT_VALUE: &str = "Cannot map an Absent tag to a non-optional value";

    /// Registry / configuration errors
    pub const ERR_NON_SCALAR_KEY: &str =
        "Map key type must map directly to a scalar or array kind";
}

/// TagError is the primary error type for all tag operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum TagError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Recursion depth has exceeded the allowed maximum limit ({depth}/{max_depth})")]
    Recursion { depth: usize, max_depth: usize },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Compression failed")]
    CompressionFailure,

    #[error("Decompression failed")]
    DecompressionFailure,

    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),
}

impl TagError {
    /// Build a format error from any message
    pub fn format(message: impl Into<String>) -> Self {
        TagError::Format(message.into())
    }

    /// Build a mapping error from any message
    pub fn mapping(message: impl Into<String>) -> Self {
        TagError::Mapping(message.into())
    }

    /// Build a configuration error from any message
    pub fn configuration(message: impl Into<String>) -> Self {
        TagError::Configuration(message.into())
    }

    /// True when the error is a depth-limit violation
    pub fn is_recursion(&self) -> bool {
        matches!(self, TagError::Recursion { .. })
    }

    /// True when the error describes corrupt or truncated input
    pub fn is_format(&self) -> bool {
        matches!(self, TagError::Format(_) | TagError::DecompressionFailure)
    }

    /// True when the object mapper could not map a value
    pub fn is_mapping(&self) -> bool {
        matches!(self, TagError::Mapping(_))
    }
}

/// Type alias for Results using TagError
pub type Result<T> = std::result::Result<T, TagError>;

/// How a public entry point reports failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Surface the specific error to the caller.
    Raise,
    /// Swallow the error and yield `None`.
    #[default]
    Suppress,
}

impl ErrorMode {
    /// Resolve an operation outcome according to the mode.
    ///
    /// In `Raise` mode errors propagate unchanged; in `Suppress` mode they are
    /// logged at debug level and replaced by `Ok(None)`.
    pub fn apply<T>(self, outcome: Result<T>) -> Result<Option<T>> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(e) => match self {
                ErrorMode::Raise => Err(e),
                ErrorMode::Suppress => {
                    debug!(error = %e, "Suppressed tag error");
                    Ok(None)
                }
            },
        }
    }

    /// Parse a mode name as used in configuration files and environment variables
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "raise" | "throw" => Some(ErrorMode::Raise),
            "suppress" | "none" => Some(ErrorMode::Suppress),
            _ => None,
        }
    }
}

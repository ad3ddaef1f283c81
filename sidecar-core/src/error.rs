//! Error types for the sidecar analysis toolkit.
//!
//! Analyses themselves never fail on malformed cell values; errors only come
//! from the edges: reading input, compiling quality rules, building tables of
//! the wrong shape, and loading or saving settings.

use std::path::Path;

use thiserror::Error;

/// Main error type for sidecar operations.
#[derive(Debug, Error)]
pub enum SidecarError {
    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Delimited text could not be read or written
    #[error("Delimited text processing failed: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A quality rule pattern did not compile
    #[error("Invalid quality rule for field '{field}'")]
    InvalidRule {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A row does not line up with the table header
    #[error("Row {row} has {found} values but the table has {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience type alias for Results with SidecarError
pub type Result<T> = std::result::Result<T, SidecarError>;

impl SidecarError {
    /// Creates an I/O error that names the file involved
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context: format!("Failed to {} {}", action, path.display()),
            source,
        }
    }

    /// Creates a delimited-text error with context
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Creates an invalid rule error for a field
    pub fn invalid_rule(field: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidRule {
            field: field.into(),
            source,
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

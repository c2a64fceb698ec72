//! Unified error types for chatsift.
//!
//! Every fallible operation in the crate returns [`ChatsiftError`]. Variants
//! carry the path or record position that caused the failure so the CLI can
//! print an actionable message without extra context.
//!
//! # Fatal vs. recoverable
//!
//! - Rule loading failures ([`ConfigNotFound`](ChatsiftError::ConfigNotFound),
//!   [`ConfigMalformed`](ChatsiftError::ConfigMalformed)) abort cleaning; no
//!   partially cleaned collection is ever returned.
//! - Malformed entries *inside* an otherwise valid rule document are not
//!   errors at all. They are skipped with a warning.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::Field;

/// A specialized [`Result`] type for chatsift operations.
///
/// # Example
///
/// ```rust
/// use chatsift::error::Result;
/// use chatsift::Record;
///
/// fn load() -> Result<Vec<Record>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatsiftError>;

/// The error type for all chatsift operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatsiftError {
    /// An I/O error occurred while reading input or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The exclusion-rule document could not be located.
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound {
        /// The path that was tried
        path: PathBuf,
    },

    /// The exclusion-rule document exists but is not valid YAML.
    #[error("Failed to parse configuration{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    ConfigMalformed {
        /// The document path, `None` for inline documents
        path: Option<PathBuf>,
        /// The underlying YAML error
        #[source]
        source: serde_yaml::Error,
    },

    /// The combined exclusion pattern could not be compiled.
    ///
    /// Patterns are escaped before compilation, so this only happens when the
    /// alternation exceeds the regex engine's size limit.
    #[error("Failed to compile exclusion patterns: {0}")]
    Pattern(#[from] regex::Error),

    /// A record is missing a field the operation requires.
    #[error("Record {index} is missing required field '{field}'")]
    MissingField {
        /// Position of the record in the input collection
        index: usize,
        /// The missing field
        field: Field,
    },

    /// A timestamp value could not be interpreted.
    #[error("Invalid timestamp '{input}'. Expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or Unix seconds")]
    InvalidTimestamp {
        /// The offending value
        input: String,
    },

    /// The input or output format is not usable.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// CSV reading or writing error.
    #[cfg(feature = "csv-io")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::string::FromUtf8Error> for ChatsiftError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ChatsiftError::InvalidFormat {
            format: "output",
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatsiftError {
    /// Creates a config-not-found error.
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        ChatsiftError::ConfigNotFound { path: path.into() }
    }

    /// Creates a malformed-config error.
    pub fn config_malformed(source: serde_yaml::Error, path: Option<PathBuf>) -> Self {
        ChatsiftError::ConfigMalformed { path, source }
    }

    /// Creates a missing-field error.
    pub fn missing_field(index: usize, field: Field) -> Self {
        ChatsiftError::MissingField { index, field }
    }

    /// Creates an invalid timestamp error.
    pub fn invalid_timestamp(input: impl Into<String>) -> Self {
        ChatsiftError::InvalidTimestamp {
            input: input.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatsiftError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatsiftError::Io(_))
    }

    /// Returns `true` if the rule document could not be loaded.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ChatsiftError::ConfigNotFound { .. } | ChatsiftError::ConfigMalformed { .. }
        )
    }

    /// Returns `true` if a record lacked a required field.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, ChatsiftError::MissingField { .. })
    }
}

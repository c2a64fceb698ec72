//! Output format selection.
//!
//! [`OutputFormat`] picks one of the writers in [`core::output`](crate::core::output)
//! and works with any [`OutputRow`]: cleaned records, initiation rows or
//! initiating records.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(all(feature = "csv-io", feature = "json-io"))]
//! # fn example() -> chatsift::Result<()> {
//! use chatsift::format::{OutputFormat, to_format_string};
//! use chatsift::core::models::OutputConfig;
//! use chatsift::Record;
//! use chrono::Utc;
//!
//! let records = vec![Record::new(Utc::now(), "Alice", "Hello!")];
//! let csv = to_format_string(&records, OutputFormat::Csv, &OutputConfig::new())?;
//!
//! // Or detect the format from an extension
//! let format = OutputFormat::from_path("cleaned.jsonl")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::core::models::OutputConfig;
use crate::core::output::OutputRow;
use crate::error::ChatsiftError;

/// Output format for exports.
///
/// - [`Csv`](OutputFormat::Csv) - Delimited text, opens in any spreadsheet
/// - [`Json`](OutputFormat::Json) - Structured array, good for APIs
/// - [`Jsonl`](OutputFormat::Jsonl) - One JSON per line, good for pipelines
///
/// # Example
///
/// ```rust
/// use chatsift::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("jsonl").unwrap();
/// assert_eq!(format, OutputFormat::Jsonl);
/// assert_eq!(format.extension(), "jsonl");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Delimited text with a header row (default)
    #[default]
    Csv,

    /// JSON array of objects
    Json,

    /// JSON Lines - one JSON object per line
    ///
    /// Also known as NDJSON.
    Jsonl,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatsift::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Csv.extension(), "csv");
    /// assert_eq!(OutputFormat::Json.extension(), "json");
    /// assert_eq!(OutputFormat::Jsonl.extension(), "jsonl");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["csv", "json", "jsonl", "ndjson"]
    }

    /// Returns all available formats.
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Csv, OutputFormat::Json, OutputFormat::Jsonl]
    }

    /// Detects format from a file path based on extension.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatsift::format::OutputFormat;
    ///
    /// let format = OutputFormat::from_path("output.jsonl").unwrap();
    /// assert_eq!(format, OutputFormat::Jsonl);
    /// ```
    pub fn from_path(path: &str) -> Result<Self, ChatsiftError> {
        let ext = std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(ChatsiftError::InvalidFormat {
                format: "output",
                message: format!(
                    "Unknown file extension: '.{}'. Expected one of: csv, json, jsonl",
                    ext
                ),
            }),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "CSV"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Writes rows to a file in the specified format.
///
/// # Example
///
/// ```rust,no_run
/// # #[cfg(all(feature = "csv-io", feature = "json-io"))]
/// # fn example() -> chatsift::Result<()> {
/// use chatsift::format::{OutputFormat, write_to_format};
/// use chatsift::core::models::OutputConfig;
/// use chatsift::Record;
/// use chrono::Utc;
///
/// let records = vec![Record::new(Utc::now(), "Alice", "Hello!")];
/// let config = OutputConfig::new();
///
/// write_to_format(&records, "cleaned.csv", OutputFormat::Csv, &config)?;
/// write_to_format(&records, "cleaned.jsonl", OutputFormat::Jsonl, &config)?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The required feature for the format is not enabled
/// - The file cannot be written
#[allow(unused_variables)]
pub fn write_to_format<T: OutputRow>(
    rows: &[T],
    path: &str,
    format: OutputFormat,
    config: &OutputConfig,
) -> Result<(), ChatsiftError> {
    match format {
        #[cfg(feature = "csv-io")]
        OutputFormat::Csv => crate::core::output::write_csv(rows, path, config),
        #[cfg(feature = "json-io")]
        OutputFormat::Json => crate::core::output::write_json(rows, path, config),
        #[cfg(feature = "json-io")]
        OutputFormat::Jsonl => crate::core::output::write_jsonl(rows, path, config),
        #[allow(unreachable_patterns)]
        _ => Err(missing_feature(format)),
    }
}

/// Converts rows to a string in the specified format.
#[allow(unused_variables)]
pub fn to_format_string<T: OutputRow>(
    rows: &[T],
    format: OutputFormat,
    config: &OutputConfig,
) -> Result<String, ChatsiftError> {
    match format {
        #[cfg(feature = "csv-io")]
        OutputFormat::Csv => crate::core::output::to_csv(rows, config),
        #[cfg(feature = "json-io")]
        OutputFormat::Json => crate::core::output::to_json(rows, config),
        #[cfg(feature = "json-io")]
        OutputFormat::Jsonl => crate::core::output::to_jsonl(rows, config),
        #[allow(unreachable_patterns)]
        _ => Err(missing_feature(format)),
    }
}

#[allow(dead_code)]
fn missing_feature(format: OutputFormat) -> ChatsiftError {
    ChatsiftError::InvalidFormat {
        format: "output",
        message: format!(
            "Output format {:?} requires the '{}' feature to be enabled",
            format,
            match format {
                OutputFormat::Csv => "csv-io",
                OutputFormat::Json | OutputFormat::Jsonl => "json-io",
            }
        ),
    }
}

//! Load record collections produced by an upstream transcript parser.
//!
//! chatsift does not parse raw chat exports itself. It reads the structured
//! output of a parser in one of three shapes:
//!
//! | Format | Shape |
//! |--------|-------|
//! | JSON | Array of objects |
//! | JSONL | One object per line, blank lines ignored |
//! | CSV | Header row, `,` or `;` delimited (detected from the header) |
//!
//! Column names are matched case-insensitively. `datetime` is accepted for
//! `timestamp`, `sender` for `user` and `text` for `message`. Empty cells and
//! JSON `null` become missing fields, which the cleaning stage later drops.
//! Every other column is kept in [`Record::extra`].
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "json-io")]
//! # fn main() -> chatsift::Result<()> {
//! use chatsift::input::{InputFormat, parse_records};
//!
//! let jsonl = r#"{"timestamp":"2024-01-15 10:00:00","user":"Alice","message":"hi"}
//! {"timestamp":"2024-01-15 10:01:00","user":null,"message":"orphan"}"#;
//!
//! let records = parse_records(jsonl, InputFormat::Jsonl)?;
//! assert_eq!(records.len(), 2);
//! assert!(records[0].is_complete());
//! assert!(!records[1].is_complete());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "json-io"))]
//! # fn main() {}
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::Record;
use crate::error::ChatsiftError;

/// Shape of an input record file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum InputFormat {
    /// JSON array of record objects
    Json,
    /// One JSON record object per line
    Jsonl,
    /// Delimited text with a header row
    Csv,
}

impl InputFormat {
    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson", "csv"]
    }

    /// Detects the format from a file extension.
    ///
    /// ```rust
    /// use chatsift::input::InputFormat;
    ///
    /// assert_eq!(InputFormat::from_path("chat.csv".as_ref()).unwrap(), InputFormat::Csv);
    /// assert!(InputFormat::from_path("chat.txt".as_ref()).is_err());
    /// ```
    pub fn from_path(path: &Path) -> Result<Self, ChatsiftError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        ext.parse().map_err(|_| {
            ChatsiftError::invalid_format(
                "input",
                format!(
                    "Unknown file extension: '.{}'. Expected one of: {}",
                    ext,
                    InputFormat::all_names().join(", ")
                ),
            )
        })
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Json => write!(f, "JSON"),
            InputFormat::Jsonl => write!(f, "JSONL"),
            InputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(InputFormat::Json),
            "jsonl" | "ndjson" => Ok(InputFormat::Jsonl),
            "csv" => Ok(InputFormat::Csv),
            _ => Err(format!(
                "Unknown input format: '{}'. Expected one of: {}",
                s,
                InputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Reads records from a file.
///
/// `format` overrides detection from the file extension.
pub fn read_records(path: &Path, format: Option<InputFormat>) -> Result<Vec<Record>, ChatsiftError> {
    let format = match format {
        Some(f) => f,
        None => InputFormat::from_path(path)?,
    };
    let content = fs::read_to_string(path)?;
    let records = parse_records(&content, format)?;
    debug!(path = %path.display(), %format, count = records.len(), "records loaded");
    Ok(records)
}

/// Parses records from an in-memory string.
#[allow(unused_variables)]
pub fn parse_records(content: &str, format: InputFormat) -> Result<Vec<Record>, ChatsiftError> {
    match format {
        #[cfg(feature = "json-io")]
        InputFormat::Json => parse_json(content),
        #[cfg(feature = "json-io")]
        InputFormat::Jsonl => parse_jsonl(content),
        #[cfg(feature = "csv-io")]
        InputFormat::Csv => parse_csv(content),
        #[allow(unreachable_patterns)]
        _ => Err(ChatsiftError::invalid_format(
            "input",
            format!(
                "Input format {} requires the '{}' feature to be enabled",
                format,
                match format {
                    InputFormat::Csv => "csv-io",
                    InputFormat::Json | InputFormat::Jsonl => "json-io",
                }
            ),
        )),
    }
}

#[cfg(feature = "json-io")]
fn parse_json(content: &str) -> Result<Vec<Record>, ChatsiftError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(content)?)
}

#[cfg(feature = "json-io")]
fn parse_jsonl(content: &str) -> Result<Vec<Record>, ChatsiftError> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(ChatsiftError::from))
        .collect()
}

#[cfg(feature = "csv-io")]
fn parse_csv(content: &str) -> Result<Vec<Record>, ChatsiftError> {
    use serde_json::Value;

    use crate::timestamp::parse_timestamp;

    enum Column {
        Timestamp,
        User,
        Message,
        Extra(String),
    }

    let header_line = content.lines().next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<Column> = reader
        .headers()?
        .iter()
        .map(|name| match name.trim().to_lowercase().as_str() {
            "timestamp" | "datetime" => Column::Timestamp,
            "user" | "sender" => Column::User,
            "message" | "text" => Column::Message,
            _ => Column::Extra(name.trim().to_string()),
        })
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = Record::empty();

        for (column, cell) in columns.iter().zip(row.iter()) {
            let value = (!cell.is_empty()).then_some(cell);
            match column {
                Column::Timestamp => {
                    record.timestamp = value.map(parse_timestamp).transpose()?;
                }
                Column::User => record.user = value.map(str::to_string),
                Column::Message => record.message = value.map(str::to_string),
                Column::Extra(name) => {
                    let value = value.map_or(Value::Null, |v| Value::String(v.to_string()));
                    record.extra.insert(name.clone(), value);
                }
            }
        }

        records.push(record);
    }

    Ok(records)
}

/// Picks `;` when the header has more semicolons than commas.
#[cfg(feature = "csv-io")]
fn detect_delimiter(header: &str) -> u8 {
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

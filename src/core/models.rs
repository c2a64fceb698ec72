//! Output configuration shared by all writers.

/// Timestamp layout used in CSV output.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Configuration for output writers.
///
/// Controls pass-through columns, the CSV delimiter and how timestamps are
/// rendered in CSV. JSON output always uses RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Include pass-through columns (`Record::extra`) in output
    pub include_extra: bool,
    /// CSV field delimiter (default: `;`)
    pub delimiter: u8,
    /// `strftime` layout for CSV timestamps
    pub timestamp_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_extra: false,
            delimiter: b';',
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_extra(mut self) -> Self {
        self.include_extra = true;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }
}

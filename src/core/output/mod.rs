//! Output format writers.
//!
//! This module provides writers for the three things chatsift produces:
//! cleaned [`Record`]s, the [`InitiationTable`] rows and the initiating
//! [`AnnotatedRecord`]s. Every writer is generic over [`OutputRow`], so each
//! format works for each kind of row.
//!
//! - [`write_csv`] / [`to_csv`] - delimited text (`;` by default) - requires `csv-io` feature
//! - [`write_json`] / [`to_json`] - JSON array - requires `json-io` feature
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines - requires `json-io` feature
//!
//! # Example
//!
//! ```rust
//! # #[cfg(all(feature = "csv-io", feature = "json-io"))]
//! # fn main() -> chatsift::Result<()> {
//! use chatsift::core::output::{to_csv, to_jsonl};
//! use chatsift::core::models::OutputConfig;
//! use chatsift::Record;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
//! let records = vec![Record::new(ts, "Alice", "Hello!")];
//!
//! let csv = to_csv(&records, &OutputConfig::new())?;
//! assert!(csv.starts_with("timestamp;user;message"));
//!
//! let jsonl = to_jsonl(&records, &OutputConfig::new())?;
//! assert!(jsonl.contains("\"user\":\"Alice\""));
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "csv-io", feature = "json-io")))]
//! # fn main() {}
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::Record;
use crate::core::models::OutputConfig;
use crate::core::session::{AnnotatedRecord, InitiationRow};
use crate::error::{ChatsiftError, Result};

#[cfg(feature = "csv-io")]
mod csv_writer;
#[cfg(feature = "json-io")]
mod json_writer;
#[cfg(feature = "json-io")]
mod jsonl_writer;

#[cfg(feature = "csv-io")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-io")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-io")]
pub use jsonl_writer::{to_jsonl, write_jsonl};

/// A value that can be written as one output row.
pub trait OutputRow {
    /// Fixed columns, in output order.
    fn base_columns() -> &'static [&'static str];

    /// Values for the fixed columns, rendered for CSV.
    fn base_values(&self, config: &OutputConfig) -> Result<Vec<String>>;

    /// The row as a JSON object.
    fn to_json_value(&self, config: &OutputConfig) -> Value;

    /// Pass-through columns carried by this row, if any.
    fn extra(&self) -> Option<&BTreeMap<String, Value>> {
        None
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>, config: &OutputConfig) -> Result<String> {
    let mut out = String::new();
    if let Some(ts) = ts {
        // chrono reports a bad strftime layout as fmt::Error
        write!(out, "{}", ts.format(&config.timestamp_format)).map_err(|_| {
            ChatsiftError::invalid_format(
                "timestamp",
                format!("invalid strftime layout '{}'", config.timestamp_format),
            )
        })?;
    }
    Ok(out)
}

fn record_json(record: &Record, config: &OutputConfig) -> Map<String, Value> {
    let mut obj = Map::new();

    if config.include_extra {
        for (key, value) in &record.extra {
            obj.insert(key.clone(), value.clone());
        }
    }

    obj.insert(
        "timestamp".into(),
        record
            .timestamp()
            .map(|ts| Value::String(ts.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .unwrap_or(Value::Null),
    );
    obj.insert(
        "user".into(),
        record.user().map_or(Value::Null, |u| Value::String(u.into())),
    );
    obj.insert(
        "message".into(),
        record
            .message()
            .map_or(Value::Null, |m| Value::String(m.into())),
    );

    obj
}

impl OutputRow for Record {
    fn base_columns() -> &'static [&'static str] {
        &["timestamp", "user", "message"]
    }

    fn base_values(&self, config: &OutputConfig) -> Result<Vec<String>> {
        Ok(vec![
            format_timestamp(self.timestamp(), config)?,
            self.user().unwrap_or_default().to_string(),
            self.message().unwrap_or_default().to_string(),
        ])
    }

    fn to_json_value(&self, config: &OutputConfig) -> Value {
        Value::Object(record_json(self, config))
    }

    fn extra(&self) -> Option<&BTreeMap<String, Value>> {
        Some(&self.extra)
    }
}

impl OutputRow for AnnotatedRecord {
    fn base_columns() -> &'static [&'static str] {
        &["timestamp", "user", "message", "time_diff", "new_session"]
    }

    fn base_values(&self, config: &OutputConfig) -> Result<Vec<String>> {
        let mut values = self.record.base_values(config)?;
        values.push(self.time_diff.num_seconds().to_string());
        values.push(self.new_session.to_string());
        Ok(values)
    }

    fn to_json_value(&self, config: &OutputConfig) -> Value {
        let mut obj = record_json(&self.record, config);
        obj.insert("time_diff".into(), Value::from(self.time_diff.num_seconds()));
        obj.insert("new_session".into(), Value::Bool(self.new_session));
        Value::Object(obj)
    }

    fn extra(&self) -> Option<&BTreeMap<String, Value>> {
        Some(&self.record.extra)
    }
}

impl OutputRow for InitiationRow {
    fn base_columns() -> &'static [&'static str] {
        &["user", "count", "proportion"]
    }

    fn base_values(&self, _config: &OutputConfig) -> Result<Vec<String>> {
        Ok(vec![
            self.user.clone(),
            self.count.to_string(),
            format!("{:.4}", self.proportion),
        ])
    }

    fn to_json_value(&self, _config: &OutputConfig) -> Value {
        serde_json::json!({
            "user": self.user,
            "count": self.count,
            "proportion": self.proportion,
        })
    }
}

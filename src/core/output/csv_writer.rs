//! CSV output writer.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;

use serde_json::Value;

use super::OutputRow;
use crate::core::models::OutputConfig;
use crate::error::ChatsiftError;

/// Writes rows to a CSV file.
///
/// # Format
/// - Delimiter: `OutputConfig::delimiter` (`;` by default)
/// - Columns: the row type's fixed columns, then (with `include_extra`) every
///   pass-through column seen in any row, sorted by name
/// - Encoding: UTF-8
pub fn write_csv<T: OutputRow>(
    rows: &[T],
    output_path: &str,
    config: &OutputConfig,
) -> Result<(), ChatsiftError> {
    let file = File::create(output_path)?;
    write_rows(rows, file, config)
}

/// Converts rows to a CSV string.
pub fn to_csv<T: OutputRow>(rows: &[T], config: &OutputConfig) -> Result<String, ChatsiftError> {
    let mut buffer = Vec::new();
    write_rows(rows, &mut buffer, config)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_rows<T: OutputRow, W: Write>(
    rows: &[T],
    out: W,
    config: &OutputConfig,
) -> Result<(), ChatsiftError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .from_writer(out);

    let extra_columns = collect_extra_columns(rows, config);

    // Build header dynamically
    let mut header: Vec<&str> = T::base_columns().to_vec();
    header.extend(extra_columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = row.base_values(config)?;
        for column in &extra_columns {
            record.push(extra_value(row, column));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn collect_extra_columns<T: OutputRow>(rows: &[T], config: &OutputConfig) -> Vec<String> {
    if !config.include_extra {
        return Vec::new();
    }

    let base = T::base_columns();
    let mut columns = BTreeSet::new();
    for extra in rows.iter().filter_map(OutputRow::extra) {
        for key in extra.keys() {
            if !base.contains(&key.as_str()) {
                columns.insert(key.clone());
            }
        }
    }
    columns.into_iter().collect()
}

fn extra_value<T: OutputRow>(row: &T, column: &str) -> String {
    match row.extra().and_then(|extra| extra.get(column)) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use crate::core::session::InitiationRow;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn records() -> Vec<Record> {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        vec![
            Record::new(ts, "Alice", "Hello").with_extra("chat", "family"),
            Record::new(ts, "Bob", "Hi; there").with_extra("id", 7),
        ]
    }

    #[test]
    fn test_write_csv_basic() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        write_csv(&records(), path, &OutputConfig::new()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.starts_with("timestamp;user;message\n"));
        assert!(content.contains("2024-01-15 10:30:00;Alice;Hello"));
        // Delimiter inside a field is quoted
        assert!(content.contains("\"Hi; there\""));
        assert!(!content.contains("family"));
    }

    #[test]
    fn test_to_csv_with_extra_columns() {
        let csv = to_csv(&records(), &OutputConfig::new().with_extra()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("timestamp;user;message;chat;id"));
        assert_eq!(lines.next(), Some("2024-01-15 10:30:00;Alice;Hello;family;"));
        assert_eq!(lines.next(), Some("2024-01-15 10:30:00;Bob;\"Hi; there\";;7"));
    }

    #[test]
    fn test_to_csv_comma_delimiter() {
        let csv = to_csv(&records(), &OutputConfig::new().with_delimiter(b',')).unwrap();
        assert!(csv.starts_with("timestamp,user,message\n"));
        assert!(csv.contains("Bob,Hi; there"));
    }

    #[test]
    fn test_table_csv() {
        let rows = vec![
            InitiationRow {
                user: "B".into(),
                count: 3,
                proportion: 0.75,
            },
            InitiationRow {
                user: "A".into(),
                count: 1,
                proportion: 0.25,
            },
        ];
        let csv = to_csv(&rows, &OutputConfig::new()).unwrap();
        assert_eq!(csv, "user;count;proportion\nB;3;0.7500\nA;1;0.2500\n");
    }

    #[test]
    fn test_to_csv_bad_timestamp_layout() {
        let config = OutputConfig::new().with_timestamp_format("%Q");
        let err = to_csv(&records(), &config).unwrap_err();
        assert!(err.to_string().contains("%Q"));
    }

    #[test]
    fn test_empty_rows_still_have_header() {
        let rows: Vec<InitiationRow> = Vec::new();
        let csv = to_csv(&rows, &OutputConfig::new()).unwrap();
        assert_eq!(csv, "user;count;proportion\n");
    }
}

//! JSON output writer.

use std::fs::File;
use std::io::Write;

use serde_json::Value;

use super::OutputRow;
use crate::core::models::OutputConfig;
use crate::error::ChatsiftError;

/// Writes rows to a JSON file as an array.
///
/// # Format
/// ```json
/// [
///   {"message": "hi", "timestamp": "2024-01-15T10:00:00Z", "user": "Alice"},
///   {"message": "ok", "timestamp": "2024-01-15T10:02:00Z", "user": "Alice"}
/// ]
/// ```
pub fn write_json<T: OutputRow>(
    rows: &[T],
    output_path: &str,
    config: &OutputConfig,
) -> Result<(), ChatsiftError> {
    let json = to_json(rows, config)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts rows to a pretty-printed JSON array.
pub fn to_json<T: OutputRow>(rows: &[T], config: &OutputConfig) -> Result<String, ChatsiftError> {
    let values: Vec<Value> = rows.iter().map(|r| r.to_json_value(config)).collect();
    Ok(serde_json::to_string_pretty(&values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use crate::core::session::InitiationRow;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    #[test]
    fn test_to_json_records() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 0).unwrap();
        let records = vec![
            Record::new(ts, "Alice", "Hello"),
            Record::new(ts, "Bob", "Hi").with_extra("chat", "work"),
        ];

        let json = to_json(&records, &OutputConfig::new()).unwrap();
        assert!(json.contains(r#""user": "Alice""#));
        assert!(json.contains(r#""timestamp": "2024-06-15T12:30:00Z""#));
        assert!(!json.contains("work"));

        let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], records[0]);
    }

    #[test]
    fn test_write_json_table() {
        let rows = vec![InitiationRow {
            user: "B".into(),
            count: 1,
            proportion: 1.0,
        }];

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        write_json(&rows, path, &OutputConfig::new()).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let parsed: Vec<InitiationRow> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_to_json_empty() {
        let rows: Vec<Record> = Vec::new();
        assert_eq!(to_json(&rows, &OutputConfig::new()).unwrap(), "[]");
    }
}

//! JSON Lines (JSONL) output writer.
//!
//! One object per line; convenient for piping cleaned transcripts into other
//! tools line by line.

use std::fs::File;
use std::io::{BufWriter, Write};

use super::OutputRow;
use crate::core::models::OutputConfig;
use crate::error::ChatsiftError;

/// Writes rows to a JSONL file.
///
/// Each line is a valid JSON object:
/// ```jsonl
/// {"message":"hi","timestamp":"2024-01-15T10:00:00Z","user":"Alice"}
/// {"message":"back","timestamp":"2024-01-15T12:00:00Z","user":"Bob"}
/// ```
pub fn write_jsonl<T: OutputRow>(
    rows: &[T],
    output_path: &str,
    config: &OutputConfig,
) -> Result<(), ChatsiftError> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    write_lines(rows, &mut writer, config)?;
    writer.flush()?;
    Ok(())
}

/// Converts rows to a JSONL string.
pub fn to_jsonl<T: OutputRow>(rows: &[T], config: &OutputConfig) -> Result<String, ChatsiftError> {
    let mut buffer = Vec::new();
    write_lines(rows, &mut buffer, config)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_lines<T: OutputRow, W: Write>(
    rows: &[T],
    out: &mut W,
    config: &OutputConfig,
) -> Result<(), ChatsiftError> {
    for row in rows {
        serde_json::to_writer(&mut *out, &row.to_json_value(config))?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`OutputFormat`] - Output format options
//!
//! The binary reads a record file, cleans it, segments the cleaned records
//! into sessions and prints who started them:
//!
//! ```text
//! chatsift chat.jsonl --rules config.yaml --gap 90 -o cleaned.csv
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::core::session::{DEFAULT_GAP_MINUTES, MAX_GAP_MINUTES, SessionConfig};
use crate::input::InputFormat;
use crate::rules::{DEFAULT_RULES_PATH, RuleSource};

/// Default path of the cleaned record export.
pub const DEFAULT_OUTPUT: &str = "cleaned_chat.csv";

/// Clean parsed chat transcripts and find out who starts the conversations.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatsift")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatsift chat.jsonl
    chatsift chat.csv --rules skip.yaml -o cleaned.json -f json
    chatsift chat.json --gap 120 --initiations table.csv
    chatsift chat.json --no-clean --show-initiators --count-first")]
pub struct Args {
    /// Path to the parsed record file (JSON, JSONL or CSV)
    pub input: PathBuf,

    /// Input format (detected from the extension by default)
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<InputFormat>,

    /// YAML document with `skip_messages` rules
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_RULES_PATH)]
    pub rules: PathBuf,

    /// Minutes of silence after which a message starts a new session
    #[arg(
        short,
        long,
        value_name = "MIN",
        default_value_t = DEFAULT_GAP_MINUTES,
        value_parser = clap::value_parser!(i64).range(0..=MAX_GAP_MINUTES)
    )]
    pub gap: i64,

    /// Path of the cleaned record export
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Output format for every export
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Also write the initiation table to this path
    #[arg(long, value_name = "PATH")]
    pub initiations: Option<String>,

    /// Print every message that starts a session
    #[arg(long)]
    pub show_initiators: bool,

    /// Count the first message as a session initiation
    #[arg(long)]
    pub count_first: bool,

    /// Skip cleaning; only records with a timestamp and user are required
    #[arg(long)]
    pub no_clean: bool,

    /// Drop pass-through columns from the cleaned export
    #[arg(long)]
    pub no_extra: bool,

    /// Log pipeline details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Rule source for the cleaning stage.
    pub fn rule_source(&self) -> RuleSource {
        RuleSource::path(&self.rules)
    }

    /// Segmentation settings from `--gap` and `--count-first`.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new()
            .with_gap_minutes(self.gap)
            .with_count_first_message(self.count_first)
    }

    /// Output path, with the extension following `--format` when the default
    /// path is in use.
    pub fn output_path(&self) -> String {
        if self.output != DEFAULT_OUTPUT {
            return self.output.clone();
        }

        let lib_format: crate::format::OutputFormat = self.format.into();
        Path::new(DEFAULT_OUTPUT)
            .with_extension(lib_format.extension())
            .to_string_lossy()
            .into_owned()
    }
}

/// Output format options.
///
/// - [`Csv`](OutputFormat::Csv) - Semicolon-delimited, opens in any spreadsheet
/// - [`Json`](OutputFormat::Json) - Structured array, good for APIs
/// - [`Jsonl`](OutputFormat::Jsonl) - One JSON per line, good for pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CSV with semicolon delimiter (default)
    #[default]
    Csv,

    /// JSON array
    Json,

    /// JSON Lines - one JSON object per line
    #[value(alias = "ndjson")]
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::format::OutputFormat::from(*self))
    }
}

// Conversion to library format type
impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> crate::format::OutputFormat {
        match format {
            OutputFormat::Csv => crate::format::OutputFormat::Csv,
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Jsonl => crate::format::OutputFormat::Jsonl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("chatsift").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["chat.jsonl"]);
        assert_eq!(args.input, PathBuf::from("chat.jsonl"));
        assert_eq!(args.rules, PathBuf::from("config.yaml"));
        assert_eq!(args.gap, 60);
        assert_eq!(args.format, OutputFormat::Csv);
        assert!(args.input_format.is_none());
        assert!(!args.no_clean);
        assert!(!args.no_extra);
        assert_eq!(args.output_path(), "cleaned_chat.csv");
    }

    #[test]
    fn test_output_extension_follows_format() {
        let args = parse(&["chat.jsonl", "-f", "jsonl"]);
        assert_eq!(args.output_path(), "cleaned_chat.jsonl");

        let args = parse(&["chat.jsonl", "-f", "json", "-o", "mine.out"]);
        assert_eq!(args.output_path(), "mine.out");
    }

    #[test]
    fn test_session_config_from_flags() {
        let args = parse(&["chat.csv", "--gap", "15", "--count-first"]);
        let config = args.session_config();
        assert_eq!(config.gap_threshold, TimeDelta::minutes(15));
        assert!(config.count_first_message);
    }

    #[test]
    fn test_negative_gap_rejected() {
        let result = Args::try_parse_from(["chatsift", "chat.csv", "--gap", "-5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_gap_rejected() {
        let too_big = (MAX_GAP_MINUTES + 1).to_string();
        assert!(Args::try_parse_from(["chatsift", "chat.csv", "--gap", &too_big]).is_err());
        assert!(
            Args::try_parse_from(["chatsift", "chat.csv", "--gap", "9223372036854775807"]).is_err()
        );

        let max = MAX_GAP_MINUTES.to_string();
        let args = parse(&["chat.csv", "--gap", &max]);
        assert_eq!(
            args.session_config().gap_threshold,
            TimeDelta::minutes(MAX_GAP_MINUTES)
        );
    }

    #[test]
    fn test_input_format_override() {
        let args = parse(&["dump.txt", "--input-format", "csv"]);
        assert_eq!(args.input_format, Some(InputFormat::Csv));

        assert!(Args::try_parse_from(["chatsift", "dump.txt", "--input-format", "xml"]).is_err());
    }

    #[test]
    fn test_rule_source() {
        let args = parse(&["chat.csv", "--rules", "skip.yaml"]);
        assert_eq!(
            args.rule_source().as_path(),
            Some(Path::new("skip.yaml"))
        );
    }

    #[test]
    fn test_format_conversion() {
        let lib: crate::format::OutputFormat = OutputFormat::Jsonl.into();
        assert_eq!(lib, crate::format::OutputFormat::Jsonl);
        assert_eq!(OutputFormat::Json.to_string(), "JSON");
    }

    #[test]
    fn test_format_serde() {
        let json = serde_json::to_string(&OutputFormat::Jsonl).unwrap();
        assert_eq!(json, "\"jsonl\"");
    }
}

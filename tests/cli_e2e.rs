//! End-to-end CLI tests for chatsift.
//!
//! These tests verify the complete CLI workflow by running the actual binary
//! with various arguments and checking the output.
//!
//! # Test Categories
//!
//! - **Basic functionality**: Each input format works via CLI
//! - **Output formats**: CSV, JSON, JSONL generation
//! - **Sessions**: Gap threshold, initiation table and initiator listing
//! - **Rules**: Default, explicit and disabled cleaning
//! - **Error handling**: Proper error messages for bad input
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Creates a temporary directory with a rule document and one record file per
/// input format.
fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");

    let rules = "skip_messages:
  system:
    joined: \"SYSTEM:\"
  whatsapp:
    media: \"<Media omitted>\"
";
    fs::write(dir.path().join("config.yaml"), rules).unwrap();

    // t0, +1m (system), +2m, +120m: B starts the only counted session
    let jsonl = r#"{"timestamp":"2024-01-15 10:00:00","user":"A","message":"hi","chat":"family"}
{"timestamp":"2024-01-15 10:01:00","user":"B","message":"SYSTEM: joined","chat":"family"}
{"timestamp":"2024-01-15 10:02:00","user":"A","message":"ok","chat":"family"}
{"timestamp":"2024-01-15 12:00:00","user":"B","message":"back","chat":"family"}
"#;
    fs::write(dir.path().join("chat.jsonl"), jsonl).unwrap();

    let json = r#"[
  {"timestamp": "2024-01-15T10:00:00Z", "user": "Alice", "message": "Hello!"},
  {"timestamp": "2024-01-15T10:05:00Z", "user": "Bob", "message": "<Media omitted>"},
  {"timestamp": "2024-01-15T11:30:00Z", "user": "Bob", "message": "Anyone?"},
  {"timestamp": "2024-01-15T14:00:00Z", "user": "Carol", "message": "Lunch?"},
  {"timestamp": null, "user": "Ghost", "message": "boo"}
]"#;
    fs::write(dir.path().join("chat.json"), json).unwrap();

    let csv = "datetime;sender;text\n\
               2024-01-15 10:00:00;Иван;Привет!\n\
               2024-01-15 10:10:00;Alice;hi; there\n\
               2024-01-15 13:00:00;Иван;Кто тут?\n";
    fs::write(dir.path().join("chat.csv"), csv).unwrap();

    dir
}

fn chatsift_cmd() -> Command {
    let cmd = std::process::Command::new(env!("CARGO_BIN_EXE_chatsift"));
    Command::from_std(cmd)
}

fn output_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

mod basic_functionality {
    use super::*;

    #[test]
    fn test_jsonl_basic() {
        let fixtures = setup_fixtures();
        let output = output_path(&fixtures, "out.csv");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "-o", output.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Done"))
            .stdout(predicate::str::contains("Found 4 records"))
            .stdout(predicate::str::contains("1 excluded"))
            .stdout(predicate::str::contains("100.0%"));

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.starts_with("timestamp;user;message;chat\n"));
        assert!(content.contains("back"));
        assert!(!content.contains("SYSTEM"));
    }

    #[test]
    fn test_json_basic() {
        let fixtures = setup_fixtures();
        let output = output_path(&fixtures, "out.csv");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.json", "-o", output.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 incomplete"))
            .stdout(predicate::str::contains("Kept 3 records"));

        let content = fs::read_to_string(&output).unwrap();
        assert!(!content.contains("Ghost"));
        assert!(!content.contains("Media"));
    }

    #[test]
    fn test_csv_with_aliases() {
        let fixtures = setup_fixtures();
        let output = output_path(&fixtures, "out.jsonl");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.csv", "-o", output.to_str().unwrap(), "-f", "jsonl"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Иван"));

        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("\"user\":\"Иван\""));
    }

    #[test]
    fn test_input_format_override() {
        let fixtures = setup_fixtures();
        fs::copy(
            fixtures.path().join("chat.jsonl"),
            fixtures.path().join("chat.dump"),
        )
        .unwrap();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.dump", "--input-format", "jsonl"])
            .assert()
            .success();
    }
}

// ============================================================================
// Output Format Tests
// ============================================================================

mod output_formats {
    use super::*;

    #[test]
    fn test_output_json() {
        let fixtures = setup_fixtures();
        let output = output_path(&fixtures, "out.json");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "-o", output.to_str().unwrap(), "-f", "json"])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["user"], "A");
        assert_eq!(parsed[0]["chat"], "family");
    }

    #[test]
    fn test_extra_columns_kept_by_default() {
        let fixtures = setup_fixtures();
        let output = output_path(&fixtures, "out.csv");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "-o", output.to_str().unwrap()])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.starts_with("timestamp;user;message;chat\n"));
        assert!(content.contains(";family"));
    }

    #[test]
    fn test_no_extra_flag() {
        let fixtures = setup_fixtures();
        let output = output_path(&fixtures, "out.csv");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "-o", output.to_str().unwrap(), "--no-extra"])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.starts_with("timestamp;user;message\n"));
        assert!(!content.contains("family"));
    }

    #[test]
    fn test_default_output_filename_changes_with_format() {
        let fixtures = setup_fixtures();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "-f", "jsonl"])
            .assert()
            .success();

        assert!(fixtures.path().join("cleaned_chat.jsonl").exists());
    }

    #[test]
    fn test_initiation_table_export() {
        let fixtures = setup_fixtures();
        let table = output_path(&fixtures, "table.csv");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "--initiations", table.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initiation table saved"));

        let content = fs::read_to_string(&table).unwrap();
        assert_eq!(content, "user;count;proportion\nB;1;1.0000\n");
    }
}

// ============================================================================
// Session Tests
// ============================================================================

mod sessions {
    use super::*;

    #[test]
    fn test_gap_flag_changes_ranking() {
        let fixtures = setup_fixtures();
        let table = output_path(&fixtures, "table.json");

        // chat.json after cleaning: Alice 10:00, Bob 11:30, Carol 14:00
        chatsift_cmd()
            .current_dir(fixtures.path())
            .args([
                "chat.json",
                "--gap",
                "120",
                "-f",
                "json",
                "--initiations",
                table.to_str().unwrap(),
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&table).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["user"], "Carol");
    }

    #[test]
    fn test_show_initiators() {
        let fixtures = setup_fixtures();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "--show-initiators"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initiating messages"))
            .stdout(predicate::str::contains("B (+118 min): back"));
    }

    #[test]
    fn test_count_first() {
        let fixtures = setup_fixtures();
        let table = output_path(&fixtures, "table.csv");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args([
                "chat.jsonl",
                "--count-first",
                "--initiations",
                table.to_str().unwrap(),
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&table).unwrap();
        assert_eq!(content, "user;count;proportion\nA;1;0.5000\nB;1;0.5000\n");
    }

    #[test]
    fn test_no_initiations() {
        let fixtures = setup_fixtures();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "--gap", "600"])
            .assert()
            .success()
            .stdout(predicate::str::contains("no session was initiated"));
    }
}

// ============================================================================
// Rule Tests
// ============================================================================

mod rules {
    use super::*;

    #[test]
    fn test_explicit_rules_path() {
        let fixtures = setup_fixtures();
        let rules = fixtures.path().join("strict.yaml");
        fs::write(&rules, "skip_messages:\n  words:\n    back: \"BACK\"\n").unwrap();
        let output = output_path(&fixtures, "out.csv");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args([
                "chat.jsonl",
                "--rules",
                rules.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("SYSTEM: joined"));
        assert!(!content.contains("back"));
    }

    #[test]
    fn test_no_clean_skips_rules() {
        let fixtures = setup_fixtures();
        let output = output_path(&fixtures, "out.csv");

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args([
                "chat.jsonl",
                "--no-clean",
                "--rules",
                "missing.yaml",
                "-o",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Skipping cleaning"));

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("SYSTEM: joined"));
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

mod error_handling {
    use super::*;

    #[test]
    fn test_missing_input_file() {
        let fixtures = setup_fixtures();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["nope.jsonl"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error"));
    }

    #[test]
    fn test_oversized_gap_is_a_usage_error() {
        let fixtures = setup_fixtures();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "--no-clean", "--gap", "9223372036854775807"])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("--gap"))
            .stderr(predicate::str::contains("panicked").not());
    }

    #[test]
    fn test_missing_rules_file() {
        let fixtures = setup_fixtures();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "--rules", "missing.yaml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"))
            .stderr(predicate::str::contains("missing.yaml"));
    }

    #[test]
    fn test_malformed_rules_file() {
        let fixtures = setup_fixtures();
        fs::write(fixtures.path().join("bad.yaml"), "skip_messages: [oops\n").unwrap();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.jsonl", "--rules", "bad.yaml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse configuration"));
    }

    #[test]
    fn test_no_clean_with_missing_user_fails() {
        let fixtures = setup_fixtures();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.json", "--no-clean"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing required field 'timestamp'"));
    }

    #[test]
    fn test_unknown_extension() {
        let fixtures = setup_fixtures();
        fs::write(fixtures.path().join("chat.txt"), "hello").unwrap();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .args(["chat.txt"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown file extension"));
    }

    #[test]
    fn test_invalid_output_format() {
        chatsift_cmd()
            .args(["chat.jsonl", "-f", "xml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }

    #[test]
    fn test_verbose_logs_to_stderr() {
        let fixtures = setup_fixtures();

        chatsift_cmd()
            .current_dir(fixtures.path())
            .env_remove("RUST_LOG")
            .args(["chat.jsonl", "-v"])
            .assert()
            .success()
            .stderr(predicate::str::contains("records loaded"));
    }
}

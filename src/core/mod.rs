//! Core processing logic for chatsift.
//!
//! This module contains:
//! - [`clean`] - Drop incomplete records and records matching skip rules
//! - [`session`] - Split records into sessions and rank initiators
//! - [`models`] - Output configuration
//! - [`output`] - Format writers (CSV, JSON, JSONL)
//!
//! # Quick Start
//!
//! ```rust
//! # #[cfg(all(feature = "csv-io", feature = "json-io"))]
//! # fn example() {
//! use chatsift::core::{
//!     OutputConfig, SessionConfig,
//!     clean, clean_with_rules, segment,
//!     write_csv, write_json, write_jsonl,
//! };
//! # }
//! ```

pub mod clean;
pub mod models;
pub mod output;
pub mod session;

pub use clean::{Cleaned, CleaningStats, clean, clean_with_rules};
pub use models::OutputConfig;
pub use session::{
    AnnotatedRecord, InitiationRow, InitiationTable, SessionConfig, Segmentation, annotate,
    segment,
};

// Conditionally re-export output writers
#[cfg(feature = "csv-io")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-io")]
pub use output::{to_json, to_jsonl, write_json, write_jsonl};

//! # Chatsift
//!
//! Clean parsed chat transcripts and find out who starts the conversations.
//!
//! ## Overview
//!
//! Chatsift works on the structured output of a chat parser: a collection of
//! [`Record`]s with a timestamp, a sender and a message. It offers two stages:
//!
//! 1. **Cleaning** ([`core::clean`]) drops records with missing fields and
//!    records whose message matches a configurable list of skip phrases
//!    (system notices such as "Messages and calls are end-to-end encrypted").
//! 2. **Session segmentation** ([`core::session`]) sorts records by time,
//!    starts a new session whenever the gap between two consecutive messages
//!    exceeds a threshold, and ranks senders by how many sessions they opened.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatsift::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let records = read_records("chat.jsonl".as_ref(), None)?;
//!
//!     let cleaned = clean(records, &RuleSource::path("config.yaml"))?;
//!     let result = segment(&cleaned.records, &SessionConfig::default())?;
//!
//!     for row in &result.table {
//!         println!("{}: {} ({:.1}%)", row.user, row.count, row.proportion * 100.0);
//!     }
//!
//!     write_csv(result.table.rows(), "initiations.csv", &OutputConfig::new())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Skip rules
//!
//! Rules are a YAML document with a `skip_messages` mapping of categories to
//! named phrases. Phrases are literal and matched case-insensitively anywhere
//! in the message:
//!
//! ```yaml
//! skip_messages:
//!   system:
//!     encrypted: "Messages and calls are end-to-end encrypted"
//!     media: "<Media omitted>"
//! ```
//!
//! ## Module Structure
//!
//! - [`record`] - [`Record`] and [`Field`]
//! - [`rules`] - [`RuleSource`](rules::RuleSource), [`RuleSet`](rules::RuleSet), [`ExclusionMatcher`](rules::ExclusionMatcher)
//! - [`core`] - Cleaning, segmentation and output writers
//! - [`input`] - Reading records from JSON, JSONL and CSV
//! - [`format`] - [`OutputFormat`](format::OutputFormat) dispatch
//! - [`timestamp`] - Timestamp parsing shared by every reader
//! - [`cli`] - CLI arguments (requires `cli` feature)
//! - [`error`] - Unified error types ([`ChatsiftError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod error;
pub mod format;
pub mod input;
pub mod record;
pub mod rules;
pub mod timestamp;

// Re-export the main types at the crate root for convenience
pub use error::{ChatsiftError, Result};
pub use record::{Field, Record};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatsift::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Field, Record};

    // Error types
    pub use crate::error::{ChatsiftError, Result};

    // Rules
    pub use crate::rules::{ExclusionMatcher, RuleSet, RuleSource};

    // Cleaning
    pub use crate::core::clean::{Cleaned, CleaningStats, clean, clean_with_rules};

    // Segmentation
    pub use crate::core::session::{
        AnnotatedRecord, InitiationRow, InitiationTable, SessionConfig, Segmentation, segment,
    };

    pub use crate::core::models::OutputConfig;

    // Output (file writers and string converters)
    #[cfg(feature = "csv-io")]
    pub use crate::core::output::{to_csv, write_csv};
    #[cfg(feature = "json-io")]
    pub use crate::core::output::{to_json, to_jsonl, write_json, write_jsonl};

    pub use crate::format::{OutputFormat, to_format_string, write_to_format};

    // Input
    pub use crate::input::{InputFormat, read_records};
}

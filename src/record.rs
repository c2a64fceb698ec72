//! The message record consumed by every stage.
//!
//! A [`Record`] is one line of a parsed chat transcript. The upstream parser
//! is allowed to leave holes, so each required field is an `Option`:
//!
//! - **Required**: `timestamp`, `user`, `message`
//! - **Pass-through**: any other field lands in `extra` and is carried to the
//!   output untouched
//!
//! # Examples
//!
//! ```
//! use chatsift::Record;
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
//! let rec = Record::new(ts, "Alice", "Hello!");
//! assert!(rec.is_complete());
//! assert_eq!(rec.user(), Some("Alice"));
//! ```
//!
//! Records deserialize from JSON with missing or `null` fields:
//!
//! ```
//! use chatsift::{Field, Record};
//!
//! let rec: Record = serde_json::from_str(r#"{"user":"Bob","message":"hi","timestamp":null}"#)?;
//! assert!(!rec.is_complete());
//! assert_eq!(rec.missing_fields(), vec![Field::Timestamp]);
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A required record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Timestamp,
    User,
    Message,
}

impl Field {
    /// All fields a record must carry to survive cleaning, in column order.
    pub const REQUIRED: [Field; 3] = [Field::Timestamp, Field::User, Field::Message];

    /// Returns the column name of this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Timestamp => "timestamp",
            Field::User => "user",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of a parsed chat transcript.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `timestamp` | `Option<DateTime<Utc>>` | When the message was sent |
/// | `user` | `Option<String>` | Sender identifier |
/// | `message` | `Option<String>` | Text content |
/// | `extra` | `BTreeMap<String, Value>` | Any other column, passed through |
///
/// Cleaning never rewrites a surviving record; it only decides whether the
/// record is kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// When the message was sent.
    #[serde(with = "crate::timestamp::optional", default, alias = "datetime")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Sender identifier as written in the transcript.
    #[serde(default, alias = "sender")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Text content of the message.
    #[serde(default, alias = "text")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Columns the core does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    /// Creates a complete record.
    pub fn new(
        timestamp: DateTime<Utc>,
        user: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Some(timestamp),
            user: Some(user.into()),
            message: Some(message.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Creates a record with every field empty.
    ///
    /// Use the `with_*` builders to fill it in. Mostly useful for building
    /// incomplete records in tests and readers.
    pub fn empty() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Builder method to set the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Builder method to set the sender.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Builder method to set the message text.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Builder method to attach a pass-through column.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the timestamp, if present.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Returns the sender, if present.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns the message text, if present.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    // =========================================================================
    // Schema checks
    // =========================================================================

    /// Returns `true` if the given field holds a value.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Timestamp => self.timestamp.is_some(),
            Field::User => self.user.is_some(),
            Field::Message => self.message.is_some(),
        }
    }

    /// Returns `true` if every required field holds a value.
    pub fn is_complete(&self) -> bool {
        Field::REQUIRED.iter().all(|&f| self.has(f))
    }

    /// Returns the required fields this record lacks, in column order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::REQUIRED
            .iter()
            .copied()
            .filter(|&f| !self.has(f))
            .collect()
    }

    /// Returns the first of `fields` this record lacks.
    pub fn first_missing(&self, fields: &[Field]) -> Option<Field> {
        fields.iter().copied().find(|&f| !self.has(f))
    }
}

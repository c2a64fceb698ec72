//! Split a record stream into sessions and rank who starts them.
//!
//! A session is a maximal run of records whose consecutive gaps never exceed
//! the configured threshold. The record that follows a longer gap *initiates*
//! a new session and is credited to its sender.
//!
//! The very first record of the collection has a gap of zero by definition,
//! so it is not counted as an initiation unless
//! [`SessionConfig::with_count_first_message`] is enabled.
//!
//! # Example
//!
//! ```
//! use chatsift::core::session::{SessionConfig, segment};
//! use chatsift::Record;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! # fn main() -> chatsift::Result<()> {
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
//! let records = vec![
//!     Record::new(t0, "A", "hi"),
//!     Record::new(t0 + Duration::minutes(10), "B", "hey"),
//!     Record::new(t0 + Duration::minutes(90), "C", "anyone?"),
//!     Record::new(t0 + Duration::minutes(95), "D", "here"),
//! ];
//!
//! let result = segment(&records, &SessionConfig::default())?;
//! assert_eq!(result.initiators.len(), 1);
//! assert_eq!(result.table.get("C").map(|row| row.count), Some(1));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChatsiftError;
use crate::record::{Field, Record};

/// Default gap, in minutes, after which a message starts a new session.
pub const DEFAULT_GAP_MINUTES: i64 = 60;

/// Largest gap, in minutes, that fits in a [`TimeDelta`].
pub const MAX_GAP_MINUTES: i64 = i64::MAX / 60_000;

/// Fields the segmenter reads from every record.
const SEGMENT_FIELDS: [Field; 2] = [Field::Timestamp, Field::User];

/// Settings for session segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// A gap strictly longer than this starts a new session.
    pub gap_threshold: TimeDelta,

    /// Treat the first record of the collection as an initiation (default: false)
    pub count_first_message: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gap_threshold: TimeDelta::minutes(DEFAULT_GAP_MINUTES),
            count_first_message: false,
        }
    }
}

impl SessionConfig {
    /// Creates a configuration with the default 60 minute threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gap threshold.
    #[must_use]
    pub fn with_gap(mut self, gap: TimeDelta) -> Self {
        self.gap_threshold = gap;
        self
    }

    /// Sets the gap threshold in minutes.
    ///
    /// Values beyond [`MAX_GAP_MINUTES`] saturate at that bound.
    #[must_use]
    pub fn with_gap_minutes(self, minutes: i64) -> Self {
        let minutes = minutes.clamp(-MAX_GAP_MINUTES, MAX_GAP_MINUTES);
        self.with_gap(TimeDelta::minutes(minutes))
    }

    /// Sets whether the first record counts as an initiation.
    #[must_use]
    pub fn with_count_first_message(mut self, enabled: bool) -> Self {
        self.count_first_message = enabled;
        self
    }
}

/// A record with the two segmentation annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    /// The record as it was received.
    #[serde(flatten)]
    pub record: Record,
    /// Time since the previous record in timestamp order; zero for the first.
    #[serde(serialize_with = "serialize_delta_seconds")]
    pub time_diff: TimeDelta,
    /// `true` if this record starts a new session.
    pub new_session: bool,
}

impl AnnotatedRecord {
    /// Sender of the record.
    ///
    /// Always present: segmentation rejects records without a user.
    pub fn user(&self) -> &str {
        self.record.user().unwrap_or_default()
    }

    /// Timestamp of the record.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.record.timestamp()
    }
}

fn serialize_delta_seconds<S>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(delta.num_seconds())
}

/// One row of the initiation ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiationRow {
    /// Sender.
    pub user: String,
    /// Sessions this sender started.
    pub count: usize,
    /// Share of all initiations, in `0.0..=1.0`.
    pub proportion: f64,
}

/// Per-sender initiation counts, most frequent first.
///
/// Ties keep the order in which senders first initiated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitiationTable {
    rows: Vec<InitiationRow>,
}

impl InitiationTable {
    /// Builds a table by counting the senders of `initiators`.
    pub fn from_initiators(initiators: &[AnnotatedRecord]) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for rec in initiators {
            let user = rec.user();
            match slots.get(user) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    slots.insert(user, counts.len());
                    counts.push((user.to_string(), 1));
                }
            }
        }

        // Stable: equal counts stay in first-seen order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let total = initiators.len();
        let rows = counts
            .into_iter()
            .map(|(user, count)| InitiationRow {
                user,
                count,
                proportion: count as f64 / total as f64,
            })
            .collect();

        Self { rows }
    }

    /// Returns the rows, most frequent first.
    pub fn rows(&self) -> &[InitiationRow] {
        &self.rows
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, InitiationRow> {
        self.rows.iter()
    }

    /// Looks up the row of a sender.
    pub fn get(&self, user: &str) -> Option<&InitiationRow> {
        self.rows.iter().find(|row| row.user == user)
    }

    /// Total number of initiations across all senders.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|row| row.count).sum()
    }

    /// Number of distinct initiating senders.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nobody initiated a session.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a InitiationTable {
    type Item = &'a InitiationRow;
    type IntoIter = std::slice::Iter<'a, InitiationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Result of [`segment`].
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Initiation ranking.
    pub table: InitiationTable,
    /// Records that start a session, in timestamp order.
    pub initiators: Vec<AnnotatedRecord>,
    /// Number of records that were segmented.
    pub record_count: usize,
    /// Number of sessions, including the leading one even when its first
    /// record is not credited as an initiation.
    pub session_count: usize,
}

/// Checks that every record carries the fields segmentation reads.
fn check_schema(records: &[Record]) -> Result<(), ChatsiftError> {
    for (index, rec) in records.iter().enumerate() {
        if let Some(field) = rec.first_missing(&SEGMENT_FIELDS) {
            return Err(ChatsiftError::missing_field(index, field));
        }
    }
    Ok(())
}

/// Sorts records by timestamp and annotates each with its gap and session flag.
///
/// Records with equal timestamps keep their input order.
///
/// # Errors
///
/// Returns [`ChatsiftError::MissingField`] if any record lacks a timestamp or
/// a user.
pub fn annotate(
    records: &[Record],
    config: &SessionConfig,
) -> Result<Vec<AnnotatedRecord>, ChatsiftError> {
    check_schema(records)?;

    let mut sorted: Vec<(DateTime<Utc>, &Record)> = records
        .iter()
        .filter_map(|rec| rec.timestamp().map(|ts| (ts, rec)))
        .collect();
    sorted.sort_by_key(|(ts, _)| *ts);

    let mut previous: Option<DateTime<Utc>> = None;
    let annotated = sorted
        .into_iter()
        .map(|(ts, rec)| {
            let (time_diff, new_session) = match previous {
                Some(prev) => {
                    let diff = ts - prev;
                    (diff, diff > config.gap_threshold)
                }
                None => (TimeDelta::zero(), config.count_first_message),
            };
            previous = Some(ts);

            AnnotatedRecord {
                record: rec.clone(),
                time_diff,
                new_session,
            }
        })
        .collect();

    Ok(annotated)
}

/// Segments `records` into sessions and ranks senders by initiations.
///
/// If no record starts a session, the table is empty.
///
/// # Errors
///
/// Returns [`ChatsiftError::MissingField`] if any record lacks a timestamp or
/// a user.
pub fn segment(records: &[Record], config: &SessionConfig) -> Result<Segmentation, ChatsiftError> {
    let annotated = annotate(records, config)?;
    let record_count = annotated.len();

    let initiators: Vec<AnnotatedRecord> = annotated
        .into_iter()
        .filter(|rec| rec.new_session)
        .collect();
    let table = InitiationTable::from_initiators(&initiators);

    let leading_uncounted = record_count > 0 && !config.count_first_message;
    let session_count = initiators.len() + usize::from(leading_uncounted);

    debug!(
        records = record_count,
        initiations = initiators.len(),
        senders = table.len(),
        gap_minutes = config.gap_threshold.num_minutes(),
        "segmented sessions"
    );

    Ok(Segmentation {
        table,
        initiators,
        record_count,
        session_count,
    })
}

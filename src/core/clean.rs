//! Remove incomplete and system messages from a record collection.
//!
//! Cleaning runs in a fixed order:
//!
//! | Step | What happens |
//! |------|--------------|
//! | Completeness | Records missing `timestamp`, `user` or `message` are dropped |
//! | Rule loading | The exclusion document is read from the [`RuleSource`] |
//! | Assembly | Categories are flattened into one literal pattern list |
//! | Short circuit | No patterns: the complete records are returned as-is |
//! | Exclusion | Records whose message contains any pattern are dropped |
//!
//! Rule loading errors abort the call; there is no partially cleaned result.
//!
//! # Examples
//!
//! ```
//! use chatsift::core::clean::clean_with_rules;
//! use chatsift::rules::RuleSet;
//! use chatsift::Record;
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> chatsift::Result<()> {
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
//! let records = vec![
//!     Record::new(t0, "Alice", "hi"),
//!     Record::new(t0, "Bob", "SYSTEM: joined"),
//!     Record::empty().with_user("Carol"),
//! ];
//!
//! let rules = RuleSet::new().with_pattern("system", "joined", "SYSTEM:");
//! let cleaned = clean_with_rules(records, &rules)?;
//!
//! assert_eq!(cleaned.records.len(), 1);
//! assert_eq!(cleaned.stats.incomplete_dropped(), 1);
//! assert_eq!(cleaned.stats.excluded(), 1);
//! # Ok(())
//! # }
//! ```

use tracing::{debug, error, info};

use crate::Record;
use crate::error::ChatsiftError;
use crate::rules::{ExclusionMatcher, RuleSet, RuleSource};

/// Counts observed while cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleaningStats {
    /// Records handed to the cleaner.
    pub original_count: usize,
    /// Records left after the completeness filter.
    pub complete_count: usize,
    /// Records left after pattern exclusion.
    pub kept_count: usize,
    /// Literal patterns that were active.
    pub pattern_count: usize,
}

impl CleaningStats {
    /// Records dropped for missing required fields.
    pub fn incomplete_dropped(&self) -> usize {
        self.original_count - self.complete_count
    }

    /// Records dropped because their message matched a pattern.
    pub fn excluded(&self) -> usize {
        self.complete_count - self.kept_count
    }

    /// Percentage of the input that was removed.
    pub fn removal_ratio(&self) -> f64 {
        if self.original_count == 0 {
            return 0.0;
        }
        (1.0 - (self.kept_count as f64 / self.original_count as f64)) * 100.0
    }
}

/// Output of a cleaning run.
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    /// Surviving records, in input order.
    pub records: Vec<Record>,
    /// What was dropped and why.
    pub stats: CleaningStats,
}

impl Cleaned {
    /// Discards the stats and returns the surviving records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Cleans `records` with rules read from `source`.
///
/// The rule document is read on every call.
///
/// # Errors
///
/// - [`ChatsiftError::ConfigNotFound`] / [`ChatsiftError::ConfigMalformed`]
///   when the rules cannot be loaded
/// - [`ChatsiftError::Pattern`] when the patterns cannot be compiled
pub fn clean(records: Vec<Record>, source: &RuleSource) -> Result<Cleaned, ChatsiftError> {
    run(records, || RuleSet::load(source)).inspect_err(|e| {
        error!(rules = %source, error = %e, "cleaning failed");
    })
}

/// Cleans `records` with an already loaded rule set.
pub fn clean_with_rules(records: Vec<Record>, rules: &RuleSet) -> Result<Cleaned, ChatsiftError> {
    run(records, || Ok(rules.clone())).inspect_err(|e| {
        error!(error = %e, "cleaning failed");
    })
}

fn run<F>(records: Vec<Record>, load: F) -> Result<Cleaned, ChatsiftError>
where
    F: FnOnce() -> Result<RuleSet, ChatsiftError>,
{
    let original_count = records.len();
    let complete = drop_incomplete(records);
    let complete_count = complete.len();
    debug!(
        before = original_count,
        after = complete_count,
        "dropped incomplete records"
    );

    let rules = load()?;
    let matcher = rules.matcher()?;

    let mut stats = CleaningStats {
        original_count,
        complete_count,
        kept_count: complete_count,
        pattern_count: matcher.pattern_count(),
    };

    if matcher.is_empty() {
        info!("no patterns defined in 'skip_messages'; skipping exclusion");
        return Ok(Cleaned {
            records: complete,
            stats,
        });
    }

    let kept = apply_exclusions(complete, &matcher);
    stats.kept_count = kept.len();
    info!(
        before = complete_count,
        after = stats.kept_count,
        patterns = stats.pattern_count,
        "filtered system messages"
    );

    Ok(Cleaned {
        records: kept,
        stats,
    })
}

/// Drops every record that lacks a required field.
pub fn drop_incomplete(records: Vec<Record>) -> Vec<Record> {
    records.into_iter().filter(Record::is_complete).collect()
}

/// Drops every record whose message contains a match of `matcher`.
///
/// Relative order of the survivors is preserved.
pub fn apply_exclusions(records: Vec<Record>, matcher: &ExclusionMatcher) -> Vec<Record> {
    if matcher.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|rec| !matcher.is_match(rec.message()))
        .collect()
}

//! Timestamp parsing shared by the record readers.
//!
//! Parsed chat transcripts arrive with timestamps in whatever shape the
//! upstream parser produced. The accepted forms are:
//!
//! | Form | Example |
//! |------|---------|
//! | RFC 3339 | `2024-01-15T10:30:00+02:00` |
//! | Naive, space separated | `2024-01-15 10:30:00` |
//! | Naive, `T` separated | `2024-01-15T10:30:00` |
//! | Naive, minutes only | `2024-01-15 10:30` |
//! | Unix seconds | `1705314600` |
//!
//! Naive values are interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::ChatsiftError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a timestamp string in any of the accepted forms.
///
/// # Example
///
/// ```rust
/// use chatsift::timestamp::parse_timestamp;
///
/// let a = parse_timestamp("2024-01-15 10:30:00")?;
/// let b = parse_timestamp("2024-01-15T10:30:00Z")?;
/// let c = parse_timestamp("1705314600")?;
/// assert_eq!(a, b);
/// assert_eq!(a, c);
/// # Ok::<(), chatsift::ChatsiftError>(())
/// ```
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ChatsiftError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(secs) = trimmed.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(secs, 0) {
            return Ok(dt);
        }
    }

    Err(ChatsiftError::invalid_timestamp(input))
}

/// Serde helpers for `Option<DateTime<Utc>>` fields.
///
/// Deserialization accepts `null`, any string form understood by
/// [`parse_timestamp`] and integer Unix seconds. Serialization always writes
/// RFC 3339.
pub mod optional {
    use std::fmt;

    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TimestampVisitor)
    }

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = Option<DateTime<Utc>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a timestamp string, Unix seconds or null")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            if v.trim().is_empty() {
                return Ok(None);
            }
            super::parse_timestamp(v).map(Some).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            DateTime::from_timestamp(v, 0)
                .map(Some)
                .ok_or_else(|| E::custom(format!("Unix timestamp out of range: {v}")))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            let secs = i64::try_from(v)
                .map_err(|_| E::custom(format!("Unix timestamp out of range: {v}")))?;
            self.visit_i64(secs)
        }
    }
}

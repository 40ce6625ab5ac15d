use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

/// Timestamp layout used by the upstream sheet, timezone-naive and
/// interpreted as UTC.
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row as delivered by the event source, before any validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawOutageEvent {
    pub id: i64,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A recorded outage with instants converted into the target timezone.
/// A missing `end` means the outage was still ongoing when recorded; a
/// missing `start` is kept as-is and contributes nothing downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct OutageEvent {
    pub id: i64,
    pub start: Option<DateTime<Tz>>,
    pub end: Option<DateTime<Tz>>,
}

impl OutageEvent {
    /// Recorded duration, when both endpoints are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("timestamp {0:?} does not match the expected format")]
    InvalidTimestamp(String),
}

/// Parses raw rows into timezone-aware events sorted ascending by start.
///
/// Present timestamps must parse or the whole call fails; absent ones keep
/// their `None` meaning. Conversion preserves the absolute instant, only the
/// calendar representation moves into `tz`. Events without a start sort after
/// all dated events. The input is never mutated.
pub fn normalize_events(raw: &[RawOutageEvent], tz: Tz) -> Result<Vec<OutageEvent>, ParseError> {
    let mut events = Vec::with_capacity(raw.len());

    for row in raw {
        events.push(OutageEvent {
            id: row.id,
            start: parse_optional_instant(row.start_date.as_deref(), tz)?,
            end: parse_optional_instant(row.end_date.as_deref(), tz)?,
        });
    }

    events.sort_by(|a, b| match (a.start, b.start) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    Ok(events)
}

fn parse_optional_instant(raw: Option<&str>, tz: Tz) -> Result<Option<DateTime<Tz>>, ParseError> {
    match raw {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => parse_instant(text).map(|instant| Some(instant.with_timezone(&tz))),
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = raw.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, EVENT_TIMESTAMP_FORMAT) {
        return Ok(naive.and_utc());
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidTimestamp(trimmed.to_string()))
}

use chrono::{DateTime, Datelike, Duration};
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::events::{OutageEvent, EVENT_TIMESTAMP_FORMAT};

/// One outage prepared for the recent-events table on the dashboard.
/// Timestamps are local to the target timezone with no offset suffix; the
/// duration is `HH:MM:SS` and open for ongoing outages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOutage {
    pub id: i64,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration: Option<String>,
}

/// Formats a non-negative duration as `HH:MM:SS`.
///
/// Hours count total elapsed hours and may exceed 24 (two days render as
/// `48:00:00`). Sub-second remainders are truncated, never rounded up.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Selects the `n` most recent events, optionally restricted to those that
/// started in `year`, and renders them for display. Events without a start
/// never match a year filter; the normalizer keeps input order by start, and
/// the tail of that order is what "most recent" means here.
pub fn recent_outages(events: &[OutageEvent], year: Option<i32>, n: usize) -> Vec<RecentOutage> {
    let selected: Vec<&OutageEvent> = events
        .iter()
        .filter(|event| match year {
            Some(year) => event.start.is_some_and(|start| start.year() == year),
            None => true,
        })
        .collect();

    selected[selected.len().saturating_sub(n)..]
        .iter()
        .map(|event| RecentOutage {
            id: event.id,
            start: event.start.map(format_local),
            end: event.end.map(format_local),
            duration: event.duration().map(format_duration),
        })
        .collect()
}

fn format_local(instant: DateTime<Tz>) -> String {
    instant.format(EVENT_TIMESTAMP_FORMAT).to_string()
}

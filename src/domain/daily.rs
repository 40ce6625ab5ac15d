use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

use crate::domain::events::OutageEvent;

/// Downtime attributed to one calendar day in the target timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    /// Midnight of the day, in the target timezone.
    pub date: DateTime<Tz>,
    /// Hours without power, rounded to 2 decimals.
    pub downtime_hours: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("no events with a start date and no explicit range to report over")]
    EmptyInput,
    #[error("midnight does not exist in the target timezone on {0}")]
    DayBoundary(NaiveDate),
}

/// Buckets outage intervals into one downtime value per calendar day.
///
/// The range runs from the day containing the earliest event start (or
/// `min_output_date`) through the day containing `now` (or
/// `max_output_date`), inclusive. Day windows are real timezone midnights
/// stepped by calendar day, so days around a DST transition are 23 or 25
/// hours wide.
///
/// Each event overlapping a day window contributes through one of four
/// cases, checked in order:
///   1. started before the day, not over by its end: the whole day is
///      downtime (this assigns, replacing anything accumulated so far);
///   2. started during the day, not over by its end: from start to midnight;
///   3. started before the day, over during it: from midnight to end;
///   4. contained in the day: its full length.
///
/// Case 1 assigning instead of adding reproduces the historical behavior
/// exactly: with events sorted by start, a full-day cover is seen before any
/// same-day partial, so later partials stack on top of the assigned 24 h.
/// Overlapping inputs can therefore exceed 24 h for a day; well-formed,
/// non-overlapping histories cannot.
pub fn allocate_daily_downtime(
    events: &[OutageEvent],
    tz: Tz,
    min_output_date: Option<DateTime<Tz>>,
    max_output_date: Option<DateTime<Tz>>,
    now: DateTime<Tz>,
) -> Result<Vec<DailyRecord>, AllocationError> {
    let min_instant = match min_output_date {
        Some(instant) => instant,
        None => events
            .iter()
            .filter_map(|event| event.start)
            .min()
            .ok_or(AllocationError::EmptyInput)?,
    };
    let max_instant = max_output_date.unwrap_or(now);

    let mut day = min_instant.date_naive();
    let last_day = max_instant.date_naive();

    let mut records = Vec::new();
    let mut current = day_start(day, tz)?;

    while day <= last_day {
        let next_day = day.succ_opt().ok_or(AllocationError::DayBoundary(day))?;
        let next = day_start(next_day, tz)?;

        let mut downtime = Duration::zero();

        for event in events.iter().filter(|event| overlaps_or_open(event, current, next)) {
            let Some(start) = event.start else {
                // No recorded start: selected defensively, matches no case.
                continue;
            };
            let runs_past_day_end = event.end.is_none_or(|end| end >= next);

            if start < current && runs_past_day_end {
                // Case 1: down before midnight, still down at day end.
                downtime = next - current;
            } else if start >= current && start < next && runs_past_day_end {
                // Case 2: went down during the day, not back before day end.
                downtime += next - start;
            } else if let Some(end) = event.end {
                if start < current && end >= current {
                    // Case 3: down at midnight, recovered during the day.
                    downtime += end - current;
                } else if start >= current && end < next {
                    // Case 4: full outage within the day.
                    downtime += end - start;
                }
            }
        }

        records.push(DailyRecord {
            date: current,
            downtime_hours: round_hours(downtime),
        });

        day = next_day;
        current = next;
    }

    Ok(records)
}

fn overlaps_or_open(event: &OutageEvent, current: DateTime<Tz>, next: DateTime<Tz>) -> bool {
    match (event.start, event.end) {
        (Some(start), Some(end)) => start < next && end > current,
        // Missing endpoints are included and resolved by the case logic.
        _ => true,
    }
}

fn day_start(day: NaiveDate, tz: Tz) -> Result<DateTime<Tz>, AllocationError> {
    tz.from_local_datetime(&day.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or(AllocationError::DayBoundary(day))
}

fn round_hours(downtime: Duration) -> f64 {
    let hours = downtime.num_seconds() as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}

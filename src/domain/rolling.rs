use chrono::Duration;

use crate::domain::daily::DailyRecord;

/// Replaces each day's downtime with its trailing mean over `window`.
///
/// The window is elapsed time, not row count: day `d` averages every record
/// whose date lies in `(d - window, d]`. One output row per input row, same
/// order. A day always includes itself, so the divisor is never zero.
pub fn compute_rolling_average(daily: &[DailyRecord], window: Duration) -> Vec<DailyRecord> {
    daily
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let window_start = record.date - window;
            let mut sum = 0.0;
            let mut count = 0_usize;

            for other in daily[..=index].iter().rev() {
                if other.date <= window_start {
                    break;
                }
                sum += other.downtime_hours;
                count += 1;
            }

            DailyRecord {
                date: record.date,
                downtime_hours: sum / count as f64,
            }
        })
        .collect()
}

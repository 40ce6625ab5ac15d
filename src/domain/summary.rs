use serde::Serialize;

use crate::domain::daily::DailyRecord;

/// Scalar downtime totals and averages over the daily series, all in hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    pub total_downtime: f64,
    pub last_7_days_downtime: f64,
    pub last_7_days_avg_downtime: f64,
    pub last_30_days_downtime: f64,
    pub last_30_days_avg_downtime: f64,
}

/// Reduces the daily series to its summary scalars.
///
/// "Last N days" takes the N most recent rows, or all rows when fewer exist,
/// while the average always divides by the fixed N. Short histories therefore
/// average lower than a true mean over the available days; that bias is part
/// of the published numbers and is kept as-is.
pub fn compute_summary_statistics(daily: &[DailyRecord]) -> SummaryStatistics {
    let total_downtime = sum_hours(daily);
    let last_7_days_downtime = sum_hours(tail(daily, 7));
    let last_30_days_downtime = sum_hours(tail(daily, 30));

    SummaryStatistics {
        total_downtime,
        last_7_days_downtime,
        last_7_days_avg_downtime: last_7_days_downtime / 7.0,
        last_30_days_downtime,
        last_30_days_avg_downtime: last_30_days_downtime / 30.0,
    }
}

fn tail(daily: &[DailyRecord], n: usize) -> &[DailyRecord] {
    &daily[daily.len().saturating_sub(n)..]
}

fn sum_hours(records: &[DailyRecord]) -> f64 {
    records.iter().map(|record| record.downtime_hours).sum()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};
    use chrono_tz::Tz;

    use crate::domain::daily::DailyRecord;

    use super::compute_summary_statistics;

    fn series(hours: &[f64]) -> Vec<DailyRecord> {
        let first: DateTime<Tz> = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .expect("test instant must parse")
            .with_timezone(&Tz::UTC);

        hours
            .iter()
            .enumerate()
            .map(|(index, value)| DailyRecord {
                date: first + Duration::days(index as i64),
                downtime_hours: *value,
            })
            .collect()
    }

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn computes_totals_and_windowed_averages() {
        let daily = series(&[0.0, 3.5, 2.5, 0.5, 0.0, 4.0, 20.0, 1.0, 0.0]);

        let summary = compute_summary_statistics(&daily);

        assert!(close(summary.total_downtime, 31.5));
        assert!(close(summary.last_7_days_downtime, 28.0));
        assert!(close(summary.last_7_days_avg_downtime, 4.0));
        assert!(close(summary.last_30_days_downtime, 31.5));
        assert!(close(summary.last_30_days_avg_downtime, 1.05));
    }

    #[test]
    fn total_matches_sum_of_daily_series() {
        let daily = series(&[1.25, 0.0, 6.5, 0.75]);

        let summary = compute_summary_statistics(&daily);

        let expected: f64 = daily.iter().map(|record| record.downtime_hours).sum();
        assert!(close(summary.total_downtime, expected));
    }

    #[test]
    fn short_history_keeps_fixed_divisors() {
        let daily = series(&[6.0, 3.0, 5.0]);

        let summary = compute_summary_statistics(&daily);

        // Only three days exist, yet the averages still divide by 7 and 30.
        assert!(close(summary.last_7_days_downtime, 14.0));
        assert!(close(summary.last_7_days_avg_downtime, 2.0));
        assert!(close(summary.last_30_days_avg_downtime, 14.0 / 30.0));
    }

    #[test]
    fn empty_series_yields_zero_totals() {
        let summary = compute_summary_statistics(&[]);

        assert!(close(summary.total_downtime, 0.0));
        assert!(close(summary.last_7_days_downtime, 0.0));
        assert!(close(summary.last_7_days_avg_downtime, 0.0));
    }
}

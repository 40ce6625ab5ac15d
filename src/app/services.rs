use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::adapters::cache::RowCache;
use crate::adapters::source::{EventSource, SourceError};
use crate::domain::daily::{allocate_daily_downtime, AllocationError, DailyRecord};
use crate::domain::events::{normalize_events, ParseError, RawOutageEvent};
use crate::domain::formatting::{recent_outages, RecentOutage};
use crate::domain::rolling::compute_rolling_average;
use crate::domain::summary::{compute_summary_statistics, SummaryStatistics};

/// Width of the trailing window shown on the rolling-average chart.
pub const ROLLING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("event source failed: {0}")]
    Source(#[from] SourceError),
    #[error("event rows could not be parsed: {0}")]
    Parse(#[from] ParseError),
    #[error("daily allocation failed: {0}")]
    Allocation(#[from] AllocationError),
}

/// Everything one dashboard render needs, computed in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub summary: SummaryStatistics,
    pub daily: Vec<DailyRecord>,
    pub rolling: Vec<DailyRecord>,
    pub recent: Vec<RecentOutage>,
}

/// Fetches rows (through the TTL cache), runs the downtime pipeline, and
/// hands value objects to the presentation layer. Pure given `now`: no state
/// is carried between calls beyond the row cache.
pub struct DashboardService {
    source: Box<dyn EventSource>,
    cache: RowCache,
    tz: Tz,
    cache_ttl: Duration,
    recent_limit: usize,
}

impl DashboardService {
    pub fn new(
        source: Box<dyn EventSource>,
        tz: Tz,
        cache_ttl: Duration,
        recent_limit: usize,
    ) -> Self {
        Self {
            source,
            cache: RowCache::new(),
            tz,
            cache_ttl,
            recent_limit,
        }
    }

    pub fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardData, ServiceError> {
        let rows = self.load_rows(now)?;
        let events = normalize_events(&rows, self.tz)?;

        let daily =
            allocate_daily_downtime(&events, self.tz, None, None, now.with_timezone(&self.tz))?;
        let rolling = compute_rolling_average(&daily, Duration::days(ROLLING_WINDOW_DAYS));
        let summary = compute_summary_statistics(&daily);
        let recent = recent_outages(&events, None, self.recent_limit);

        tracing::debug!(
            days = daily.len(),
            total_downtime_hours = summary.total_downtime,
            "dashboard data computed"
        );

        Ok(DashboardData {
            summary,
            daily,
            rolling,
            recent,
        })
    }

    /// The recent-outages table with caller-chosen year filter and size.
    pub fn recent(
        &self,
        now: DateTime<Utc>,
        year: Option<i32>,
        limit: usize,
    ) -> Result<Vec<RecentOutage>, ServiceError> {
        let rows = self.load_rows(now)?;
        let events = normalize_events(&rows, self.tz)?;
        Ok(recent_outages(&events, year, limit))
    }

    fn load_rows(&self, now: DateTime<Utc>) -> Result<Vec<RawOutageEvent>, ServiceError> {
        let key = self.source.identity();

        if let Some(rows) = self.cache.get(&key, now, self.cache_ttl) {
            return Ok(rows);
        }

        let rows = self.source.fetch_events()?;
        tracing::info!(source = %key, rows = rows.len(), "fetched outage rows");
        self.cache.put(&key, rows.clone(), now);

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use chrono_tz::Tz;

    use crate::adapters::source::{EventSource, SourceError};
    use crate::domain::events::RawOutageEvent;

    use super::{DashboardService, ServiceError};

    struct CountingSource {
        rows: Vec<RawOutageEvent>,
        fetches: Arc<AtomicUsize>,
    }

    impl EventSource for CountingSource {
        fn identity(&self) -> String {
            "test:counting".to_string()
        }

        fn fetch_events(&self) -> Result<Vec<RawOutageEvent>, SourceError> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            Ok(self.rows.clone())
        }
    }

    fn raw(id: i64, start: Option<&str>, end: Option<&str>) -> RawOutageEvent {
        RawOutageEvent {
            id,
            start_date: start.map(ToString::to_string),
            end_date: end.map(ToString::to_string),
        }
    }

    fn instant(text: &str) -> DateTime<Utc> {
        text.parse().expect("test instant must parse")
    }

    fn service_with(rows: Vec<RawOutageEvent>) -> (DashboardService, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            rows,
            fetches: Arc::clone(&fetches),
        };
        (
            DashboardService::new(Box::new(source), Tz::UTC, Duration::minutes(10), 5),
            fetches,
        )
    }

    #[test]
    fn dashboard_combines_all_views() {
        let (service, _) = service_with(vec![
            raw(1, Some("2024-01-01 00:00:00"), Some("2024-01-02 00:00:00")),
            raw(2, Some("2024-01-02 22:30:00"), Some("2024-01-03 01:00:00")),
        ]);

        let data = service
            .dashboard(instant("2024-01-03T12:00:00Z"))
            .expect("dashboard must compute");

        let hours: Vec<f64> = data
            .daily
            .iter()
            .map(|record| record.downtime_hours)
            .collect();
        assert_eq!(hours, vec![24.0, 1.5, 1.0]);
        assert_eq!(data.rolling.len(), data.daily.len());
        assert!((data.summary.total_downtime - 26.5).abs() < 1e-9);
        assert_eq!(data.recent.len(), 2);
        assert_eq!(data.recent[1].duration.as_deref(), Some("02:30:00"));
    }

    #[test]
    fn second_call_within_ttl_reuses_cached_rows() {
        let (service, fetches) = service_with(vec![raw(
            1,
            Some("2024-01-01 00:00:00"),
            Some("2024-01-01 04:00:00"),
        )]);

        service
            .dashboard(instant("2024-01-02T10:00:00Z"))
            .expect("first call must compute");
        service
            .dashboard(instant("2024-01-02T10:05:00Z"))
            .expect("second call must compute");

        assert_eq!(fetches.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn expired_cache_refetches_rows() {
        let (service, fetches) = service_with(vec![raw(
            1,
            Some("2024-01-01 00:00:00"),
            Some("2024-01-01 04:00:00"),
        )]);

        service
            .dashboard(instant("2024-01-02T10:00:00Z"))
            .expect("first call must compute");
        service
            .dashboard(instant("2024-01-02T10:30:00Z"))
            .expect("second call must compute");

        assert_eq!(fetches.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn no_events_surfaces_empty_input() {
        let (service, _) = service_with(Vec::new());

        let error = service
            .dashboard(instant("2024-01-02T10:00:00Z"))
            .expect_err("empty history cannot derive a range");

        assert!(matches!(
            error,
            ServiceError::Allocation(crate::domain::daily::AllocationError::EmptyInput)
        ));
    }

    #[test]
    fn malformed_rows_surface_parse_errors() {
        let (service, _) = service_with(vec![raw(1, Some("yesterday-ish"), None)]);

        let error = service
            .dashboard(instant("2024-01-02T10:00:00Z"))
            .expect_err("malformed timestamp must fail");

        assert!(matches!(error, ServiceError::Parse(_)));
    }

    #[test]
    fn recent_respects_year_and_limit() {
        let (service, _) = service_with(vec![
            raw(1, Some("2023-06-01 10:00:00"), Some("2023-06-01 11:00:00")),
            raw(2, Some("2024-01-02 10:00:00"), Some("2024-01-02 11:00:00")),
            raw(3, Some("2024-03-02 10:00:00"), Some("2024-03-02 11:00:00")),
        ]);

        let recent = service
            .recent(instant("2024-06-01T00:00:00Z"), Some(2024), 1)
            .expect("recent view must compute");

        let ids: Vec<i64> = recent.iter().map(|outage| outage.id).collect();
        assert_eq!(ids, vec![3]);
    }
}

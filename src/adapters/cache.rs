use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::domain::events::RawOutageEvent;

/// Keeps fetched rows around for a caller-supplied time-to-live, keyed by the
/// source identity. The computation pipeline itself stays cache-free; only
/// the service layer in front of it consults this.
#[derive(Debug, Default)]
pub struct RowCache {
    entries: Mutex<HashMap<String, CachedRows>>,
}

#[derive(Debug, Clone)]
struct CachedRows {
    rows: Vec<RawOutageEvent>,
    fetched_at: DateTime<Utc>,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rows for `key` when they are younger than `ttl`.
    pub fn get(&self, key: &str, now: DateTime<Utc>, ttl: Duration) -> Option<Vec<RawOutageEvent>> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;

        if now - entry.fetched_at < ttl {
            Some(entry.rows.clone())
        } else {
            None
        }
    }

    pub fn put(&self, key: &str, rows: Vec<RawOutageEvent>, fetched_at: DateTime<Utc>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), CachedRows { rows, fetched_at });
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use crate::domain::events::RawOutageEvent;

    use super::RowCache;

    fn rows() -> Vec<RawOutageEvent> {
        vec![RawOutageEvent {
            id: 1,
            start_date: Some("2024-01-01 00:00:00".to_string()),
            end_date: None,
        }]
    }

    fn instant(text: &str) -> DateTime<Utc> {
        text.parse().expect("test instant must parse")
    }

    #[test]
    fn returns_rows_within_ttl() {
        let cache = RowCache::new();
        let fetched_at = instant("2024-06-01T10:00:00Z");
        cache.put("file:events.json", rows(), fetched_at);

        let hit = cache.get(
            "file:events.json",
            instant("2024-06-01T10:05:00Z"),
            Duration::minutes(10),
        );

        assert_eq!(hit, Some(rows()));
    }

    #[test]
    fn expires_rows_after_ttl() {
        let cache = RowCache::new();
        cache.put("file:events.json", rows(), instant("2024-06-01T10:00:00Z"));

        let hit = cache.get(
            "file:events.json",
            instant("2024-06-01T10:10:00Z"),
            Duration::minutes(10),
        );

        assert_eq!(hit, None);
    }

    #[test]
    fn keys_are_isolated_per_source() {
        let cache = RowCache::new();
        cache.put("file:a.json", rows(), instant("2024-06-01T10:00:00Z"));

        let hit = cache.get(
            "file:b.json",
            instant("2024-06-01T10:01:00Z"),
            Duration::minutes(10),
        );

        assert_eq!(hit, None);
    }

    #[test]
    fn put_replaces_previous_rows() {
        let cache = RowCache::new();
        cache.put("file:a.json", rows(), instant("2024-06-01T10:00:00Z"));
        cache.put("file:a.json", Vec::new(), instant("2024-06-01T11:00:00Z"));

        let hit = cache.get(
            "file:a.json",
            instant("2024-06-01T11:01:00Z"),
            Duration::minutes(10),
        );

        assert_eq!(hit, Some(Vec::new()));
    }
}

use chrono_tz::Tz;

use crate::app::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub events_url: Option<String>,
    pub events_file: Option<String>,
    pub target_timezone: Tz,
    pub location_name: String,
    pub http_bind: String,
    pub cache_ttl_seconds: u64,
    pub recent_events_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let events_url = non_empty(&lookup, "EVENTS_URL");
        let events_file = non_empty(&lookup, "EVENTS_FILE");

        if events_url.is_none() && events_file.is_none() {
            return Err(AppError::config("EVENTS_URL or EVENTS_FILE is required"));
        }

        let timezone_name =
            non_empty(&lookup, "TARGET_TIMEZONE").unwrap_or_else(|| "UTC".to_string());
        let target_timezone = timezone_name.parse::<Tz>().map_err(|_| {
            AppError::config(format!(
                "TARGET_TIMEZONE must be a valid IANA timezone name, got {timezone_name:?}"
            ))
        })?;

        Ok(Self {
            events_url,
            events_file,
            target_timezone,
            location_name: non_empty(&lookup, "LOCATION_NAME")
                .unwrap_or_else(|| "Home".to_string()),
            http_bind: non_empty(&lookup, "HTTP_BIND")
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            cache_ttl_seconds: parse_or_default(&lookup, "CACHE_TTL_SECONDS", 600_u64)?,
            recent_events_limit: parse_or_default(&lookup, "RECENT_EVENTS_LIMIT", 5_usize)?,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{key} must be a valid number"))),
        None => Ok(default),
    }
}

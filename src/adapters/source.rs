use std::fs;
use std::time::Duration;

use thiserror::Error;

use crate::domain::events::RawOutageEvent;

const HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Where outage rows come from. Implementations own all I/O; the domain
/// pipeline only ever sees the returned rows.
pub trait EventSource: Send + Sync + 'static {
    /// Stable identity of this source, used as the row-cache key.
    fn identity(&self) -> String;

    fn fetch_events(&self) -> Result<Vec<RawOutageEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read events file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse events payload as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to fetch events over http: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reads outage rows from a local JSON file (an array of row objects).
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl EventSource for JsonFileSource {
    fn identity(&self) -> String {
        format!("file:{}", self.path)
    }

    fn fetch_events(&self) -> Result<Vec<RawOutageEvent>, SourceError> {
        let content = fs::read_to_string(&self.path)?;
        let rows = serde_json::from_str(&content)?;
        Ok(rows)
    }
}

/// Fetches outage rows from a remote endpoint publishing the sheet as a JSON
/// array, e.g. an Apps Script export of the tracking spreadsheet.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECONDS),
        }
    }
}

impl EventSource for HttpSource {
    fn identity(&self) -> String {
        format!("http:{}", self.url)
    }

    fn fetch_events(&self) -> Result<Vec<RawOutageEvent>, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let rows = client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(rows)
    }
}

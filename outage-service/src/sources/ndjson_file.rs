use std::path::PathBuf;

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use outage_core::LightEvent;
use time::OffsetDateTime;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use super::{select_latest, select_recent, validate_event, EventSource, SourceError};

/// Newline-delimited JSON event store.
///
/// Each line is one record as written by the ingestion side:
/// `{"timestamp": <unix epoch millis>, "light": true, "area": "rad0"}`.
/// Extra fields (such as a document `_id`) are ignored. Records for other areas
/// are skipped.
pub struct NdjsonFileEventSource {
    path: PathBuf,
    area: String,
}

#[derive(serde::Deserialize)]
struct StoredLightRecord {
    timestamp: i64,
    light: bool,
    area: String,
}

impl TryFrom<StoredLightRecord> for LightEvent {
    type Error = SourceError;

    fn try_from(r: StoredLightRecord) -> Result<Self, Self::Error> {
        let ts = OffsetDateTime::from_unix_timestamp_nanos(i128::from(r.timestamp) * 1_000_000)
            .map_err(|e| SourceError::InvalidRecord(format!("invalid timestamp {}: {e}", r.timestamp)))?;
        validate_event(LightEvent::new(ts, r.light))
    }
}

impl NdjsonFileEventSource {
    pub fn new<P: Into<PathBuf>>(path: P, area: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            area: area.into(),
        }
    }

    fn stream_events(&self) -> impl Stream<Item = Result<LightEvent, SourceError>> + Send + 'static {
        let path = self.path.clone();
        let area = self.area.clone();
        try_stream! {
            let file = File::open(&path).await.map_err(|e| {
                SourceError::Read(format!("failed to open event file {}: {e}", path.display()))
            })?;
            let mut lines = BufReader::new(file).lines();

            while let Some(line) = lines.next_line().await.map_err(|e| {
                SourceError::Read(format!("failed to read event line: {e}"))
            })? {
                if line.trim().is_empty() {
                    continue;
                }
                let record: StoredLightRecord = match serde_json::from_str(&line) {
                    Ok(r) => r,
                    Err(e) => {
                        metrics::counter!("light_events_parse_errors_total").increment(1);
                        Err(SourceError::InvalidRecord(format!("failed to parse event line: {e}")))?
                    }
                };
                if record.area != area {
                    continue;
                }
                let event = LightEvent::try_from(record)?;
                yield event;
            }
        }
    }

    async fn read_all(&self) -> Result<Vec<LightEvent>, SourceError> {
        self.stream_events().try_collect().await
    }
}

#[async_trait::async_trait]
impl EventSource for NdjsonFileEventSource {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<LightEvent>, SourceError> {
        let events = self.read_all().await?;
        tracing::debug!(path = %self.path.display(), count = events.len(), "loaded ndjson events");
        Ok(select_recent(events, limit))
    }

    async fn fetch_latest(&self) -> Result<Option<LightEvent>, SourceError> {
        let events = self.read_all().await?;
        Ok(select_latest(&events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use time::macros::datetime;

    fn write_lines(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[tokio::test]
    async fn reads_area_events_in_order() {
        let file = write_lines(&[
            r#"{"timestamp":1709560800000,"light":true,"area":"rad0","_id":"a"}"#,
            r#"{"timestamp":1709553600000,"light":false,"area":"rad0","_id":"b"}"#,
            "",
            r#"{"timestamp":1709557200000,"light":false,"area":"other","_id":"c"}"#,
        ]);
        let source = NdjsonFileEventSource::new(file.path(), "rad0");

        let events = source.fetch_recent(10).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ts, datetime!(2024-03-04 12:00 UTC));
        assert!(!events[0].light);
        assert_eq!(events[1].ts, datetime!(2024-03-04 14:00 UTC));

        let latest = source.fetch_latest().await.unwrap().unwrap();
        assert!(latest.light);
    }

    #[tokio::test]
    async fn malformed_line_is_an_error() {
        let file = write_lines(&[r#"{"timestamp":"yesterday","light":true,"area":"rad0"}"#]);
        let source = NdjsonFileEventSource::new(file.path(), "rad0");

        assert!(matches!(
            source.fetch_recent(10).await,
            Err(SourceError::InvalidRecord(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let source = NdjsonFileEventSource::new("/nonexistent/light.ndjson", "rad0");
        assert!(matches!(source.fetch_latest().await, Err(SourceError::Read(_))));
    }
}

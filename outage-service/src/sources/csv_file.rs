use std::{
    fs::File,
    path::{Path, PathBuf},
};

use csv::StringRecord;
use outage_core::LightEvent;
use time::OffsetDateTime;

use super::{select_latest, select_recent, validate_event, EventSource, SourceError};

/// CSV export of the event store.
///
/// Expected header columns (by name):
/// - ts (RFC3339 timestamp)
/// - light (`true`/`false` or `1`/`0`)
/// - area
pub struct CsvFileEventSource {
    path: PathBuf,
    area: String,
}

impl CsvFileEventSource {
    pub fn new<P: Into<PathBuf>>(path: P, area: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            area: area.into(),
        }
    }

    async fn read_all(&self) -> Result<Vec<LightEvent>, SourceError> {
        // The csv reader is blocking; keep it off the async workers.
        let path = self.path.clone();
        let area = self.area.clone();
        tokio::task::spawn_blocking(move || read_csv(&path, &area))
            .await
            .map_err(|e| SourceError::Read(format!("csv reader task failed: {e}")))?
    }
}

fn parse_light(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn record_to_event(
    record: &StringRecord,
    headers: &StringRecord,
) -> Result<(String, LightEvent), SourceError> {
    let get = |name: &str| -> Result<&str, SourceError> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
            .ok_or_else(|| SourceError::InvalidRecord(format!("missing column '{name}' in CSV record")))
    };

    let ts_str = get("ts")?;
    let ts = OffsetDateTime::parse(ts_str.trim(), &time::format_description::well_known::Rfc3339)
        .map_err(|e| SourceError::InvalidRecord(format!("invalid ts '{ts_str}': {e}")))?;

    let light_str = get("light")?;
    let light = parse_light(light_str)
        .ok_or_else(|| SourceError::InvalidRecord(format!("invalid light '{light_str}'")))?;

    let area = get("area")?.trim().to_string();

    Ok((area, validate_event(LightEvent::new(ts, light))?))
}

fn read_csv(path: &Path, area: &str) -> Result<Vec<LightEvent>, SourceError> {
    let file = File::open(path)
        .map_err(|e| SourceError::Read(format!("failed to open CSV file: {e}")))?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr
        .headers()
        .map_err(|e| SourceError::Read(format!("failed to read CSV headers: {e}")))?
        .clone();

    let mut events = Vec::new();
    for result in rdr.records() {
        let record =
            result.map_err(|e| SourceError::Read(format!("failed to read CSV record: {e}")))?;

        let (record_area, event) = match record_to_event(&record, &headers) {
            Ok(parsed) => parsed,
            Err(e) => {
                metrics::counter!("light_events_parse_errors_total").increment(1);
                return Err(e);
            }
        };
        if record_area == area {
            events.push(event);
        }
    }

    Ok(events)
}

#[async_trait::async_trait]
impl EventSource for CsvFileEventSource {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<LightEvent>, SourceError> {
        Ok(select_recent(self.read_all().await?, limit))
    }

    async fn fetch_latest(&self) -> Result<Option<LightEvent>, SourceError> {
        Ok(select_latest(&self.read_all().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use time::macros::datetime;

    #[tokio::test]
    async fn reads_csv_events_for_area() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ts,light,area").unwrap();
        writeln!(file, "2024-03-04T14:00:00+02:00,false,rad0").unwrap();
        writeln!(file, "2024-03-04T08:00:00+02:00,1,rad0").unwrap();
        writeln!(file, "2024-03-04T09:00:00+02:00,0,rad1").unwrap();

        let source = CsvFileEventSource::new(file.path(), "rad0");
        let events = source.fetch_recent(132).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ts, datetime!(2024-03-04 08:00 +2));
        assert!(events[0].light);
        assert!(!events[1].light);
        assert_eq!(
            source.fetch_latest().await.unwrap().map(|e| e.ts),
            Some(datetime!(2024-03-04 14:00 +2))
        );
    }

    #[test]
    fn invalid_light_value_is_rejected() {
        let headers = StringRecord::from(vec!["ts", "light", "area"]);
        let record = StringRecord::from(vec!["2024-03-04T14:00:00Z", "maybe", "rad0"]);

        assert!(matches!(
            record_to_event(&record, &headers),
            Err(SourceError::InvalidRecord(_))
        ));
    }
}

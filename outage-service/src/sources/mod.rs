pub mod csv_file;
pub mod memory;
pub mod ndjson_file;
pub mod questdb;

pub use csv_file::CsvFileEventSource;
pub use memory::InMemoryEventSource;
pub use ndjson_file::NdjsonFileEventSource;
pub use questdb::QuestDbEventSource;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use outage_core::LightEvent;
use sqlx::postgres::PgPoolOptions;
use time::macros::datetime;

use crate::config::{AppConfig, EventStoreKind};

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("read error: {0}")]
    Read(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("query error: {0}")]
    Query(String),
}

/// Read access to the append-only light event store of one area.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// The `limit` most recent events, oldest first.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<LightEvent>, SourceError>;

    /// The most recent event, if the store has any.
    async fn fetch_latest(&self) -> Result<Option<LightEvent>, SourceError>;
}

/// Open the event store selected by `events.kind`.
pub async fn open_event_source(cfg: &AppConfig) -> anyhow::Result<Arc<dyn EventSource>> {
    let events = &cfg.events;
    let file_path = || -> anyhow::Result<PathBuf> {
        events
            .path
            .clone()
            .context("events.path is required for file event stores")
    };

    let source: Arc<dyn EventSource> = match events.kind {
        EventStoreKind::Ndjson => Arc::new(NdjsonFileEventSource::new(file_path()?, &events.area)),
        EventStoreKind::Csv => Arc::new(CsvFileEventSource::new(file_path()?, &events.area)),
        EventStoreKind::Questdb => {
            let questdb = cfg
                .questdb
                .as_ref()
                .context("[questdb] section is required for the questdb event store")?;
            let pool = PgPoolOptions::new()
                .max_connections(questdb.max_connections)
                .connect(&questdb.uri)
                .await?;
            Arc::new(QuestDbEventSource::new(pool, &events.area))
        }
    };

    tracing::info!(kind = ?events.kind, area = %events.area, "event source opened");
    Ok(source)
}

/// Reject timestamps outside a broad sanity window [2000-01-01, 2100-01-01).
pub fn validate_event(event: LightEvent) -> Result<LightEvent, SourceError> {
    let min_ts = datetime!(2000-01-01 00:00:00 UTC);
    let max_ts = datetime!(2100-01-01 00:00:00 UTC);

    if event.ts < min_ts || event.ts >= max_ts {
        metrics::counter!("light_events_rejected_total").increment(1);
        return Err(SourceError::InvalidRecord(format!(
            "timestamp {} out of allowed range",
            event.ts
        )));
    }

    Ok(event)
}

/// Keep the newest `limit` events and return them in ascending order.
pub(crate) fn select_recent(mut events: Vec<LightEvent>, limit: usize) -> Vec<LightEvent> {
    events.sort_by_key(|e| e.ts);
    let skip = events.len().saturating_sub(limit);
    events.split_off(skip)
}

pub(crate) fn select_latest(events: &[LightEvent]) -> Option<LightEvent> {
    events.iter().max_by_key(|e| e.ts).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn validation_accepts_recent_timestamp() {
        let event = LightEvent::new(datetime!(2024-01-01 00:00:00 UTC), true);
        assert!(validate_event(event).is_ok());
    }

    #[test]
    fn validation_rejects_out_of_range_ts() {
        let event = LightEvent::new(datetime!(1800-01-01 00:00:00 UTC), true);
        assert!(matches!(
            validate_event(event),
            Err(SourceError::InvalidRecord(_))
        ));
    }

    #[test]
    fn select_recent_keeps_newest_in_ascending_order() {
        let events = vec![
            LightEvent::new(datetime!(2024-01-03 00:00 UTC), true),
            LightEvent::new(datetime!(2024-01-01 00:00 UTC), true),
            LightEvent::new(datetime!(2024-01-02 00:00 UTC), false),
        ];

        let recent = select_recent(events.clone(), 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].ts, datetime!(2024-01-02 00:00 UTC));
        assert_eq!(recent[1].ts, datetime!(2024-01-03 00:00 UTC));

        assert_eq!(select_recent(events.clone(), 10).len(), 3);
        assert!(select_recent(events.clone(), 0).is_empty());
        assert_eq!(
            select_latest(&events).map(|e| e.ts),
            Some(datetime!(2024-01-03 00:00 UTC))
        );
    }
}

use outage_core::{db::light_event_queries, LightEvent};
use sqlx::PgPool;

use super::{EventSource, SourceError};

/// Events stored in the `light_events` table, queried over pgwire.
pub struct QuestDbEventSource {
    pool: PgPool,
    area: String,
}

impl QuestDbEventSource {
    pub fn new(pool: PgPool, area: impl Into<String>) -> Self {
        Self {
            pool,
            area: area.into(),
        }
    }
}

#[async_trait::async_trait]
impl EventSource for QuestDbEventSource {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<LightEvent>, SourceError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        light_event_queries::recent_events(&self.pool, &self.area, limit)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, area = %self.area, "recent events query failed");
                SourceError::Query(e.to_string())
            })
    }

    async fn fetch_latest(&self) -> Result<Option<LightEvent>, SourceError> {
        light_event_queries::latest_event(&self.pool, &self.area)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, area = %self.area, "latest event query failed");
                SourceError::Query(e.to_string())
            })
    }
}

use outage_core::LightEvent;

use super::{select_latest, select_recent, EventSource, SourceError};

/// A fixed snapshot of events held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSource {
    events: Vec<LightEvent>,
}

impl InMemoryEventSource {
    pub fn new(events: Vec<LightEvent>) -> Self {
        Self { events }
    }
}

#[async_trait::async_trait]
impl EventSource for InMemoryEventSource {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<LightEvent>, SourceError> {
        Ok(select_recent(self.events.clone(), limit))
    }

    async fn fetch_latest(&self) -> Result<Option<LightEvent>, SourceError> {
        Ok(select_latest(&self.events))
    }
}

//! HTTP surface: chart data, status and the announcement note.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use outage_core::{EngineSettings, SchedulePredictor};
use time::{OffsetDateTime, UtcOffset};

use crate::{announcement::FileAnnouncementStore, sources::EventSource};

pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Shared, read-only state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventSource>,
    pub predictor: Arc<SchedulePredictor>,
    pub announcements: Arc<FileAnnouncementStore>,
    pub settings: EngineSettings,
    pub offset: UtcOffset,
    pub chart_limit: usize,
    pub clock: Clock,
}

impl AppState {
    /// Current time in the configured offset.
    pub fn now(&self) -> OffsetDateTime {
        (self.clock)().to_offset(self.offset)
    }
}

pub fn system_clock() -> Clock {
    Arc::new(OffsetDateTime::now_utc)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/light/all", get(handlers::list_events))
        .route("/light/chart", get(handlers::get_chart))
        .route("/light/status", get(handlers::get_status))
        .route(
            "/light/announcement",
            get(handlers::get_announcement)
                .put(handlers::set_announcement)
                .delete(handlers::reset_announcement),
        )
        .with_state(state)
}

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use outage_core::LightEvent;
use serde::{Deserialize, Serialize};

use super::{error::AppError, AppState};
use crate::report::{build_chart, build_status, format_status, Chart, StatusReport};

/// Upper bound on `?limit=` to keep a single request cheap.
const MAX_LIMIT: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn resolve(&self, default: usize) -> Result<usize, AppError> {
        match self.limit {
            None => Ok(default),
            Some(0) => Err(AppError::BadRequest("limit must be > 0".to_string())),
            Some(n) if n > MAX_LIMIT => Err(AppError::BadRequest(format!(
                "limit must be <= {MAX_LIMIT}"
            ))),
            Some(n) => Ok(n),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub report: StatusReport,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnnouncementBody {
    pub text: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /light/all?limit=N
///
/// The most recent events, oldest first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<LightEvent>>, AppError> {
    metrics::counter!("http_requests_total", "route" => "events").increment(1);
    let limit = query.resolve(state.chart_limit)?;

    let events = state.events.fetch_recent(limit).await?;
    Ok(Json(events.into_iter().map(|e| e.to_offset(state.offset)).collect()))
}

/// GET /light/chart?limit=N
pub async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Chart>, AppError> {
    metrics::counter!("http_requests_total", "route" => "chart").increment(1);
    let limit = query.resolve(state.chart_limit)?;

    let events = state.events.fetch_recent(limit).await?;
    let chart = build_chart(&events, &state.settings, state.now());
    tracing::debug!(events = events.len(), rows = chart.rows.len(), "chart built");

    Ok(Json(chart))
}

/// GET /light/status
pub async fn get_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    metrics::counter!("http_requests_total", "route" => "status").increment(1);

    let latest = state.events.fetch_latest().await?;
    // Announcement failures degrade to an empty note.
    let announcement = match state.announcements.get_current_announcement().await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "announcement unavailable");
            String::new()
        }
    };

    let report = build_status(latest, &state.predictor, announcement, state.now());
    let text = format_status(&report, state.settings.pre_window);

    Ok(Json(StatusResponse { report, text }))
}

/// GET /light/announcement
pub async fn get_announcement(
    State(state): State<AppState>,
) -> Result<Json<AnnouncementBody>, AppError> {
    let text = state.announcements.get_current_announcement().await?;
    Ok(Json(AnnouncementBody { text }))
}

/// PUT /light/announcement
pub async fn set_announcement(
    State(state): State<AppState>,
    Json(body): Json<AnnouncementBody>,
) -> Result<StatusCode, AppError> {
    state.announcements.set_current_announcement(&body.text).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /light/announcement
pub async fn reset_announcement(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.announcements.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

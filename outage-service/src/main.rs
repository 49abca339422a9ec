use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use outage_core::SchedulePredictor;
use outage_service::{
    announcement::FileAnnouncementStore,
    config::AppConfig,
    http::{create_router, system_clock, AppState},
    metrics_server, observability,
    schedule_source::load_schedule,
    sources::open_event_source,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing(module_path!());

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // A malformed schedule stops startup here rather than failing requests later.
    let schedule = load_schedule(&cfg.schedule.path)
        .with_context(|| format!("loading schedule {}", cfg.schedule.path.display()))?;
    let settings = cfg.engine.settings();
    let predictor = SchedulePredictor::with_extension_threshold(schedule, settings.extension_threshold);

    let events = open_event_source(&cfg).await?;

    let state = AppState {
        events,
        predictor: Arc::new(predictor),
        announcements: Arc::new(FileAnnouncementStore::new(&cfg.announcement.path)),
        settings,
        offset: cfg.engine.utc_offset()?,
        chart_limit: cfg.events.chart_limit,
        clock: system_clock(),
    };

    let addr: SocketAddr = cfg
        .server
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, area = %cfg.events.area, "outage service listening");

    axum::serve(listener, create_router(state).into_make_service()).await?;

    Ok(())
}

use anyhow::{bail, Context, Result};
use outage_core::SchedulePredictor;
use outage_service::{
    announcement::FileAnnouncementStore,
    config::AppConfig,
    observability,
    report::{build_chart, build_status, format_status, render_grid},
    schedule_source::load_schedule,
    sources::{EventSource, NdjsonFileEventSource},
};
use std::env;
use time::OffsetDateTime;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing(module_path!());

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: grid_report <ndjson_file_path>");
    }
    let file_path = &args[1];

    // Area, engine constants, schedule and announcement come from the service config.
    let cfg = AppConfig::load()?;
    let settings = cfg.engine.settings();
    let now = OffsetDateTime::now_utc().to_offset(cfg.engine.utc_offset()?);

    let source = NdjsonFileEventSource::new(file_path, &cfg.events.area);
    let events = source
        .fetch_recent(cfg.events.chart_limit)
        .await
        .with_context(|| format!("reading events from {file_path}"))?;

    let chart = build_chart(&events, &settings, now);
    print!("{}", render_grid(&chart.rows));

    let schedule = load_schedule(&cfg.schedule.path)?;
    let predictor = SchedulePredictor::with_extension_threshold(schedule, settings.extension_threshold);
    let announcement = FileAnnouncementStore::new(&cfg.announcement.path)
        .get_current_announcement()
        .await?;

    let report = build_status(events.last().copied(), &predictor, announcement, now);
    println!();
    println!("{}", format_status(&report, settings.pre_window));

    tracing::info!(
        events = events.len(),
        rows = chart.rows.len(),
        degenerate_intervals = chart.degenerate_intervals,
        "grid report rendered"
    );

    Ok(())
}

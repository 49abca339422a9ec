use outage_core::{
    engine::GRID_WIDTH_HOURS, ClosestTime, DayGridRow, EngineSettings, GridAggregator,
    IntervalBuilder, LightEvent, SchedulePredictor,
};
use serde::Serialize;
use time::{Duration, OffsetDateTime};

/// The outage grid for a window of events.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub rows: Vec<DayGridRow>,
    /// Intervals collapsed to zero width by rounding; counted, not corrected.
    pub degenerate_intervals: usize,
}

pub fn build_chart(events: &[LightEvent], settings: &EngineSettings, now: OffsetDateTime) -> Chart {
    let intervals = IntervalBuilder::new(settings.rounding).build(events, now);
    let degenerate_intervals = intervals.iter().filter(|iv| iv.is_degenerate()).count();
    if degenerate_intervals > 0 {
        tracing::debug!(degenerate_intervals, "rounding collapsed intervals");
    }

    let rows = GridAggregator::default().aggregate(&intervals, now);
    metrics::counter!("chart_rows_built_total").increment(rows.len() as u64);

    Chart {
        rows,
        degenerate_intervals,
    }
}

/// Everything a renderer needs to describe the current light situation.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub latest: Option<LightEvent>,
    pub next_transition: ClosestTime,
    pub outage_window: ClosestTime,
    pub announcement: String,
}

/// Combine the latest event with the schedule predictions at `now`.
///
/// All timestamps in the report are expressed in `now`'s offset.
pub fn build_status(
    latest: Option<LightEvent>,
    predictor: &SchedulePredictor,
    announcement: String,
    now: OffsetDateTime,
) -> StatusReport {
    let latest = latest.map(|e| e.to_offset(now.offset()));
    let next_transition = match latest {
        Some(event) => predictor.next_transition(event.light, now),
        None => ClosestTime::absent(),
    };
    if latest.is_some() && next_transition.is_absent() {
        metrics::counter!("schedule_prediction_absent_total").increment(1);
    }

    StatusReport {
        latest,
        next_transition,
        outage_window: predictor.closest_off(now),
        announcement,
    }
}

fn hhmm(ts: OffsetDateTime) -> String {
    format!("{:02}:{:02}", ts.hour(), ts.minute())
}

/// Plain-text status message.
///
/// While the light is off the next transition is shown as a window opening
/// `pre_window` before the predicted time.
pub fn format_status(report: &StatusReport, pre_window: Duration) -> String {
    let mut lines = Vec::new();

    match report.latest {
        None => lines.push("Light status is unavailable: no events recorded.".to_string()),
        Some(event) => {
            if event.light {
                lines.push(format!("Light is on since {}.", hhmm(event.ts)));
            } else {
                lines.push(format!("No light since {}.", hhmm(event.ts)));
            }

            if let Some(at) = report.next_transition.at {
                if event.light {
                    lines.push(format!("Next outage possibly at {}.", hhmm(at)));
                } else {
                    lines.push(format!(
                        "Light possibly returns between {} and {}.",
                        hhmm(at - pre_window),
                        hhmm(at)
                    ));
                }
            }

            if let (false, true, Some(until)) = (
                event.light,
                report.outage_window.is_boundary_extended,
                report.outage_window.at,
            ) {
                lines.push(format!("Scheduled outage window extends until {}.", hhmm(until)));
            }
        }
    }

    let announcement = report.announcement.trim();
    if !announcement.is_empty() {
        lines.push(String::new());
        lines.push(announcement.to_string());
    }

    lines.join("\n")
}

/// Fixed-width text table of the outage grid: `#` marks an hour without light.
pub fn render_grid(rows: &[DayGridRow]) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<11}", ""));
    for hour in 0..GRID_WIDTH_HOURS {
        out.push_str(&format!("{hour:>3}"));
    }
    out.push_str("   total\n");

    for row in rows {
        out.push_str(&format!("{:<11}", row.label));
        for filled in row.cells {
            out.push_str(if filled { "  #" } else { "  ." });
        }
        out.push_str(&format!("{:>8}\n", row.total));
    }

    out
}

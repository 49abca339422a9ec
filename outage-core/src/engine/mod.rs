pub mod grid_aggregator;
pub mod interval_builder;
pub mod predictor;

use time::Duration;

pub use grid_aggregator::{group_by_day, GridAggregator};
pub use interval_builder::{end_of_hour, round_to_granularity, IntervalBuilder};
pub use predictor::{predict_next, ClosestTime, SchedulePredictor};

/// Columns in a chart row: one per hour of the day.
pub const GRID_WIDTH_HOURS: usize = 24;

/// Event timestamps are snapped to this granularity before building intervals.
pub const DEFAULT_ROUNDING: Duration = Duration::minutes(20);

/// Rounded interval boundaries are pulled apart by this much so adjacent
/// intervals never share an instant.
pub const BOUNDARY_NUDGE: Duration = Duration::minutes(1);

/// Off events closer than this are reported as one continuous outage window.
pub const DEFAULT_EXTENSION_THRESHOLD: Duration = Duration::hours(3);

/// Lead time of the "restoration window" shown while the light is off.
pub const DEFAULT_PRE_WINDOW: Duration = Duration::hours(3);

/// Where inside an hour the grid samples interval membership.
pub const HOUR_SAMPLE_OFFSET: Duration = Duration::minutes(30);

/// Tunable engine constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub rounding: Duration,
    pub extension_threshold: Duration,
    pub pre_window: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rounding: DEFAULT_ROUNDING,
            extension_threshold: DEFAULT_EXTENSION_THRESHOLD,
            pre_window: DEFAULT_PRE_WINDOW,
        }
    }
}

use time::{Duration, OffsetDateTime, Time};

use crate::domain::{LightEvent, LightInterval};
use crate::engine::{BOUNDARY_NUDGE, DEFAULT_ROUNDING};

/// Converts discrete state-change events into contiguous intervals.
#[derive(Debug, Clone, Copy)]
pub struct IntervalBuilder {
    rounding: Duration,
}

impl Default for IntervalBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDING)
    }
}

impl IntervalBuilder {
    pub fn new(rounding: Duration) -> Self {
        Self { rounding }
    }

    /// One interval per event, in ascending order.
    ///
    /// Event `i` spans from its own rounded timestamp (+1 minute) to the rounded
    /// timestamp of event `i + 1` (-1 minute). The last event runs until the end of
    /// the clock hour containing `now`. All arithmetic happens in `now`'s offset.
    ///
    /// Intervals collapsed by rounding (`start >= end`) are kept; see
    /// [`LightInterval::is_degenerate`].
    pub fn build(&self, events: &[LightEvent], now: OffsetDateTime) -> Vec<LightInterval> {
        let offset = now.offset();
        let mut sorted: Vec<LightEvent> = events.iter().map(|e| e.to_offset(offset)).collect();
        sorted.sort_by_key(|e| e.ts);

        sorted
            .iter()
            .enumerate()
            .map(|(i, event)| {
                let start = round_to_granularity(event.ts, self.rounding) + BOUNDARY_NUDGE;
                let end = match sorted.get(i + 1) {
                    Some(next) => round_to_granularity(next.ts, self.rounding) - BOUNDARY_NUDGE,
                    None => end_of_hour(now),
                };
                LightInterval {
                    start,
                    end,
                    light: event.light,
                }
            })
            .collect()
    }
}

/// Round to the nearest multiple of `granularity` counted from local midnight.
/// Halfway points round up.
pub fn round_to_granularity(ts: OffsetDateTime, granularity: Duration) -> OffsetDateTime {
    let step = granularity.whole_seconds();
    if step <= 0 {
        return ts;
    }

    let midnight = ts.replace_time(Time::MIDNIGHT);
    let since_midnight = (ts - midnight).whole_seconds();
    let rounded = (since_midnight + step / 2).div_euclid(step) * step;
    midnight + Duration::seconds(rounded)
}

/// The first instant of the hour after the one containing `ts`.
pub fn end_of_hour(ts: OffsetDateTime) -> OffsetDateTime {
    ts.replace_time(Time::MIDNIGHT) + Duration::hours(i64::from(ts.hour()) + 1)
}

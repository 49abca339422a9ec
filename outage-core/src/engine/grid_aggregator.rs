use std::collections::BTreeMap;

use time::{Date, Duration, OffsetDateTime, Time, UtcOffset};

use crate::domain::{DayGridRow, LightInterval};
use crate::engine::{GRID_WIDTH_HOURS, HOUR_SAMPLE_OFFSET};

/// Buckets intervals into calendar days and hours.
#[derive(Debug, Clone, Copy)]
pub struct GridAggregator {
    sample_offset: Duration,
}

impl Default for GridAggregator {
    fn default() -> Self {
        Self {
            sample_offset: HOUR_SAMPLE_OFFSET,
        }
    }
}

impl GridAggregator {
    /// Rows from the most recent day to the earliest, with no gaps.
    ///
    /// A cell is filled when an outage interval belonging to that day contains the
    /// sample instant of the hour. Hours starting after `now` stay empty.
    pub fn aggregate(&self, intervals: &[LightInterval], now: OffsetDateTime) -> Vec<DayGridRow> {
        let offset = now.offset();
        let groups = group_by_day(intervals, offset);

        let (first, last) = match (groups.keys().next(), groups.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Vec::new(),
        };

        let mut rows = Vec::new();
        let mut day = last;
        loop {
            let members = groups.get(&day).map(Vec::as_slice).unwrap_or(&[]);
            rows.push(self.build_row(day, members, offset, now));

            if day <= first {
                break;
            }
            match day.previous_day() {
                Some(prev) => day = prev,
                None => break,
            }
        }

        rows
    }

    fn build_row(
        &self,
        day: Date,
        members: &[LightInterval],
        offset: UtcOffset,
        now: OffsetDateTime,
    ) -> DayGridRow {
        let midnight = day.with_time(Time::MIDNIGHT).assume_offset(offset);
        let mut cells = [false; GRID_WIDTH_HOURS];

        for (hour, cell) in cells.iter_mut().enumerate() {
            let cell_start = midnight + Duration::hours(hour as i64);
            if cell_start > now {
                break;
            }
            let sample = cell_start + self.sample_offset;
            *cell = members
                .iter()
                .any(|iv| iv.is_outage() && iv.contains(sample));
        }

        DayGridRow::new(day, cells)
    }
}

/// Group intervals by the calendar day (in `offset`) they touch.
///
/// An interval always belongs to the day of its start, and additionally to every
/// later day it reaches into, so outages spanning midnight show up on both sides.
/// An end exactly at midnight does not reach into the next day.
pub fn group_by_day(
    intervals: &[LightInterval],
    offset: UtcOffset,
) -> BTreeMap<Date, Vec<LightInterval>> {
    let mut groups: BTreeMap<Date, Vec<LightInterval>> = BTreeMap::new();

    for iv in intervals {
        let iv = LightInterval {
            start: iv.start.to_offset(offset),
            end: iv.end.to_offset(offset),
            light: iv.light,
        };

        let start_day = iv.start.date();
        let last_day = if iv.end.time() == Time::MIDNIGHT {
            iv.end.date().previous_day().unwrap_or(start_day)
        } else {
            iv.end.date()
        };

        groups.entry(start_day).or_default().push(iv);

        let mut day = start_day;
        while day < last_day {
            match day.next_day() {
                Some(next) => day = next,
                None => break,
            }
            groups.entry(day).or_default().push(iv);
        }
    }

    groups
}

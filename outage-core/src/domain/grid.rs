use time::Date;

use crate::domain::schedule::weekday_abbrev;
use crate::engine::GRID_WIDTH_HOURS;

/// One calendar day of the outage chart.
///
/// `cells[h]` is true when the light was off during hour `h`. `total` always equals
/// the number of filled cells.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DayGridRow {
    pub date: Date,
    pub label: String,
    pub cells: [bool; GRID_WIDTH_HOURS],
    pub total: u32,
}

impl DayGridRow {
    pub fn new(date: Date, cells: [bool; GRID_WIDTH_HOURS]) -> Self {
        let total = cells.iter().filter(|filled| **filled).count() as u32;
        Self {
            date,
            label: day_label(date),
            cells,
            total,
        }
    }

    pub fn is_filled(&self, hour: usize) -> bool {
        self.cells.get(hour).copied().unwrap_or(false)
    }
}

/// Row header in the `Mon, 04/03` form.
pub fn day_label(date: Date) -> String {
    format!(
        "{}, {:02}/{:02}",
        weekday_abbrev(date.weekday()),
        date.day(),
        u8::from(date.month())
    )
}

pub mod grid;
pub mod interval;
pub mod light_event;
pub mod schedule;

pub use grid::DayGridRow;
pub use interval::LightInterval;
pub use light_event::LightEvent;
pub use schedule::{ScheduleToken, WeeklySchedule};

//! Outage interval and schedule-prediction engine.
//!
//! Turns a stream of light on/off events into intervals and a day-by-hour grid,
//! and resolves a recurring weekly outage schedule into the next transition time.

pub mod db;
pub mod domain;
pub mod engine;
pub mod error;

pub use domain::{DayGridRow, LightEvent, LightInterval, ScheduleToken, WeeklySchedule};
pub use engine::{ClosestTime, EngineSettings, GridAggregator, IntervalBuilder, SchedulePredictor};
pub use error::ScheduleError;

use std::{fmt, str::FromStr};

use time::Weekday;

use crate::error::ScheduleError;

/// A recurring weekly marker such as `"Mon 14"`: every Monday at 14:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleToken {
    pub day: Weekday,
    pub hour: u8,
}

const WEEKDAY_ABBREVIATIONS: [(&str, Weekday); 7] = [
    ("Mon", Weekday::Monday),
    ("Tue", Weekday::Tuesday),
    ("Wed", Weekday::Wednesday),
    ("Thu", Weekday::Thursday),
    ("Fri", Weekday::Friday),
    ("Sat", Weekday::Saturday),
    ("Sun", Weekday::Sunday),
];

/// Three-letter English abbreviation of a weekday (`Mon`, `Tue`, ...).
pub fn weekday_abbrev(day: Weekday) -> &'static str {
    WEEKDAY_ABBREVIATIONS[day.number_days_from_monday() as usize].0
}

impl FromStr for ScheduleToken {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (day, hour) = match (parts.next(), parts.next(), parts.next()) {
            (Some(day), Some(hour), None) => (day, hour),
            _ => {
                return Err(ScheduleError::MalformedToken {
                    token: s.to_string(),
                })
            }
        };

        let weekday = WEEKDAY_ABBREVIATIONS
            .iter()
            .find(|(abbrev, _)| abbrev.eq_ignore_ascii_case(day))
            .map(|(_, weekday)| *weekday)
            .ok_or_else(|| ScheduleError::UnknownWeekday {
                token: s.to_string(),
                day: day.to_string(),
            })?;

        let hour_value: u8 = hour
            .parse()
            .ok()
            .filter(|h| *h <= 23)
            .ok_or_else(|| ScheduleError::HourOutOfRange {
                token: s.to_string(),
                hour: hour.to_string(),
            })?;

        Ok(Self {
            day: weekday,
            hour: hour_value,
        })
    }
}

impl fmt::Display for ScheduleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", weekday_abbrev(self.day), self.hour)
    }
}

/// The static weekly outage schedule: planned "light on" and "light off" markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    on: Vec<ScheduleToken>,
    off: Vec<ScheduleToken>,
}

impl WeeklySchedule {
    /// Parse both token lists, failing on the first malformed token.
    pub fn parse<S: AsRef<str>>(on: &[S], off: &[S]) -> Result<Self, ScheduleError> {
        let parse_all = |tokens: &[S]| -> Result<Vec<ScheduleToken>, ScheduleError> {
            tokens.iter().map(|t| t.as_ref().parse()).collect()
        };

        Ok(Self {
            on: parse_all(on)?,
            off: parse_all(off)?,
        })
    }

    pub fn on(&self) -> &[ScheduleToken] {
        &self.on
    }

    pub fn off(&self) -> &[ScheduleToken] {
        &self.off
    }

    /// Tokens at which the light is expected to become `light`.
    pub fn tokens_for(&self, light: bool) -> &[ScheduleToken] {
        if light {
            &self.on
        } else {
            &self.off
        }
    }
}

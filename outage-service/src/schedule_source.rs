use std::{fs, path::Path};

use outage_core::{ScheduleError, WeeklySchedule};
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum ScheduleLoadError {
    #[error("failed to read schedule file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse schedule file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Token(#[from] ScheduleError),
}

/// On-disk shape of the weekly schedule: `{"on": ["Mon 14", ...], "off": [...]}`.
#[derive(Debug, Deserialize)]
struct RawSchedule {
    #[serde(default)]
    on: Vec<String>,
    #[serde(default)]
    off: Vec<String>,
}

/// Load and validate the weekly schedule. Called once at startup.
pub fn load_schedule(path: &Path) -> Result<WeeklySchedule, ScheduleLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| ScheduleLoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_schedule(&contents)
}

pub fn parse_schedule(contents: &str) -> Result<WeeklySchedule, ScheduleLoadError> {
    let raw: RawSchedule = serde_json::from_str(contents)?;
    let schedule = WeeklySchedule::parse(&raw.on, &raw.off)?;

    tracing::info!(
        on_tokens = schedule.on().len(),
        off_tokens = schedule.off().len(),
        "weekly schedule loaded"
    );
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Weekday;

    #[test]
    fn parses_on_and_off_lists() {
        let schedule = parse_schedule(r#"{"on": ["Mon 13", "Tue 1"], "off": ["Mon 10"]}"#).unwrap();

        assert_eq!(schedule.on().len(), 2);
        assert_eq!(schedule.off()[0].day, Weekday::Monday);
        assert_eq!(schedule.off()[0].hour, 10);
    }

    #[test]
    fn malformed_token_is_a_typed_error() {
        let err = parse_schedule(r#"{"on": ["Someday 13"], "off": []}"#).unwrap_err();
        assert!(matches!(
            err,
            ScheduleLoadError::Token(ScheduleError::UnknownWeekday { .. })
        ));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let schedule = parse_schedule("{}").unwrap();
        assert!(schedule.on().is_empty() && schedule.off().is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_schedule(Path::new("/nonexistent/shutdown.json")).unwrap_err();
        assert!(matches!(err, ScheduleLoadError::Read { .. }));
    }
}

use std::{fs, path::PathBuf};

use outage_core::engine::{
    EngineSettings, DEFAULT_EXTENSION_THRESHOLD, DEFAULT_PRE_WINDOW, DEFAULT_ROUNDING,
};
use serde::Deserialize;
use time::{Duration, UtcOffset};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStoreKind {
    Ndjson,
    Csv,
    Questdb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    pub kind: EventStoreKind,
    /// File path for the `ndjson` and `csv` stores.
    #[serde(default)]
    pub path: Option<PathBuf>,
    pub area: String,
    #[serde(default = "default_chart_limit")]
    pub chart_limit: usize,
}

fn default_chart_limit() -> usize {
    132
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestDbConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,
    #[serde(default = "default_rounding_minutes")]
    pub rounding_minutes: i64,
    #[serde(default = "default_extension_threshold_hours")]
    pub extension_threshold_hours: i64,
    #[serde(default = "default_pre_window_hours")]
    pub pre_window_hours: i64,
}

fn default_utc_offset_hours() -> i8 {
    2
}

fn default_rounding_minutes() -> i64 {
    DEFAULT_ROUNDING.whole_minutes()
}

fn default_extension_threshold_hours() -> i64 {
    DEFAULT_EXTENSION_THRESHOLD.whole_hours()
}

fn default_pre_window_hours() -> i64 {
    DEFAULT_PRE_WINDOW.whole_hours()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            rounding_minutes: default_rounding_minutes(),
            extension_threshold_hours: default_extension_threshold_hours(),
            pre_window_hours: default_pre_window_hours(),
        }
    }
}

impl EngineConfig {
    pub fn utc_offset(&self) -> Result<UtcOffset, ConfigError> {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0).map_err(|e| {
            ConfigError::Invalid(format!(
                "engine.utc_offset_hours {} out of range: {e}",
                self.utc_offset_hours
            ))
        })
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            rounding: Duration::minutes(self.rounding_minutes),
            extension_threshold: Duration::hours(self.extension_threshold_hours),
            pre_window: Duration::hours(self.pre_window_hours),
        }
    }
}

/// Upper bound for the hour-valued engine settings: one week, the schedule period.
const MAX_WINDOW_HOURS: i64 = 7 * 24;

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub events: EventsConfig,
    pub questdb: Option<QuestDbConfig>,
    pub schedule: ScheduleConfig,
    pub announcement: AnnouncementConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        use std::env;

        let path = env::var("OUTAGE_CONFIG").unwrap_or_else(|_| "outage-config.toml".to_string());
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.engine.utc_offset()?;

        let minutes = self.engine.rounding_minutes;
        if minutes <= 0 || (24 * 60) % minutes != 0 {
            return Err(ConfigError::Invalid(format!(
                "engine.rounding_minutes must be a positive divisor of a day, got {minutes}"
            )));
        }
        let threshold = self.engine.extension_threshold_hours;
        if !(1..=MAX_WINDOW_HOURS).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "engine.extension_threshold_hours must be within 1..={MAX_WINDOW_HOURS}, got {threshold}"
            )));
        }
        let pre_window = self.engine.pre_window_hours;
        if !(0..=MAX_WINDOW_HOURS).contains(&pre_window) {
            return Err(ConfigError::Invalid(format!(
                "engine.pre_window_hours must be within 0..={MAX_WINDOW_HOURS}, got {pre_window}"
            )));
        }
        if self.events.chart_limit == 0 {
            return Err(ConfigError::Invalid("events.chart_limit must be > 0".to_string()));
        }

        match self.events.kind {
            EventStoreKind::Ndjson | EventStoreKind::Csv if self.events.path.is_none() => Err(
                ConfigError::Invalid("events.path is required for file event stores".to_string()),
            ),
            EventStoreKind::Questdb if self.questdb.is_none() => Err(ConfigError::Invalid(
                "[questdb] section is required when events.kind = \"questdb\"".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        bind_addr = "127.0.0.1:8080"

        [events]
        kind = "ndjson"
        path = "db/light.ndjson"
        area = "rad0"

        [schedule]
        path = "db/shutdown.json"

        [announcement]
        path = "db/announcement.txt"
    "#;

    #[test]
    fn minimal_config_uses_engine_defaults() {
        let cfg = AppConfig::from_toml(MINIMAL).unwrap();

        assert_eq!(cfg.events.kind, EventStoreKind::Ndjson);
        assert_eq!(cfg.events.chart_limit, 132);
        assert_eq!(cfg.engine.settings(), EngineSettings::default());
        assert_eq!(cfg.engine.utc_offset().unwrap(), UtcOffset::from_hms(2, 0, 0).unwrap());
        assert!(cfg.metrics.is_none());
    }

    #[test]
    fn engine_overrides_are_applied() {
        let toml = format!(
            "{MINIMAL}\n[engine]\nutc_offset_hours = 3\nrounding_minutes = 15\nextension_threshold_hours = 4\n"
        );
        let cfg = AppConfig::from_toml(&toml).unwrap();
        let settings = cfg.engine.settings();

        assert_eq!(settings.rounding, Duration::minutes(15));
        assert_eq!(settings.extension_threshold, Duration::hours(4));
        assert_eq!(settings.pre_window, Duration::hours(3));
    }

    #[test]
    fn rejects_rounding_that_does_not_divide_a_day() {
        let toml = format!("{MINIMAL}\n[engine]\nrounding_minutes = 7\n");
        assert!(matches!(AppConfig::from_toml(&toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_hour_settings_beyond_a_week() {
        let huge_threshold =
            format!("{MINIMAL}\n[engine]\nextension_threshold_hours = {}\n", i64::MAX);
        assert!(matches!(AppConfig::from_toml(&huge_threshold), Err(ConfigError::Invalid(_))));

        let huge_pre_window = format!("{MINIMAL}\n[engine]\npre_window_hours = 9999999999999\n");
        assert!(matches!(AppConfig::from_toml(&huge_pre_window), Err(ConfigError::Invalid(_))));

        let zero_threshold = format!("{MINIMAL}\n[engine]\nextension_threshold_hours = 0\n");
        assert!(matches!(AppConfig::from_toml(&zero_threshold), Err(ConfigError::Invalid(_))));

        let full_week = format!(
            "{MINIMAL}\n[engine]\nextension_threshold_hours = 168\npre_window_hours = 168\n"
        );
        let cfg = AppConfig::from_toml(&full_week).unwrap();
        assert_eq!(cfg.engine.settings().extension_threshold, Duration::hours(168));
    }

    #[test]
    fn questdb_store_requires_questdb_section() {
        let toml = MINIMAL.replace("kind = \"ndjson\"", "kind = \"questdb\"");
        assert!(matches!(AppConfig::from_toml(&toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_store_kind_is_a_parse_error() {
        let toml = MINIMAL.replace("kind = \"ndjson\"", "kind = \"nedb\"");
        assert!(matches!(AppConfig::from_toml(&toml), Err(ConfigError::Parse(_))));
    }
}

use time::{Duration, OffsetDateTime, Time};

use crate::domain::{ScheduleToken, WeeklySchedule};
use crate::engine::DEFAULT_EXTENSION_THRESHOLD;

/// The predicted next transition.
///
/// `at == None` means no future occurrence could be resolved (for example an
/// empty token list); callers should omit the prediction rather than fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClosestTime {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    pub at: Option<OffsetDateTime>,
    pub is_boundary_extended: bool,
}

impl ClosestTime {
    pub fn absent() -> Self {
        Self {
            at: None,
            is_boundary_extended: false,
        }
    }

    fn exact(at: OffsetDateTime) -> Self {
        Self {
            at: Some(at),
            is_boundary_extended: false,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.at.is_none()
    }
}

const WEEK: Duration = Duration::weeks(1);

/// Monday 00:00 of the week containing `now`, in `now`'s offset.
pub fn week_start(now: OffsetDateTime) -> OffsetDateTime {
    let days_from_monday = i64::from(now.weekday().number_days_from_monday());
    now.replace_time(Time::MIDNIGHT) - Duration::days(days_from_monday)
}

/// The first occurrence of `token` strictly after `now`.
pub fn next_occurrence(token: &ScheduleToken, now: OffsetDateTime) -> OffsetDateTime {
    let in_this_week = week_start(now)
        + Duration::days(i64::from(token.day.number_days_from_monday()))
        + Duration::hours(i64::from(token.hour));

    if in_this_week > now {
        in_this_week
    } else {
        in_this_week + WEEK
    }
}

/// Earliest strictly-future occurrence among `tokens`.
pub fn predict_next(tokens: &[ScheduleToken], now: OffsetDateTime) -> ClosestTime {
    tokens
        .iter()
        .map(|token| next_occurrence(token, now))
        .filter(|at| *at > now)
        .min()
        .map(ClosestTime::exact)
        .unwrap_or_else(ClosestTime::absent)
}

/// Resolves the weekly schedule against the clock.
///
/// Holds only read-only configuration; safe to share across requests.
#[derive(Debug, Clone)]
pub struct SchedulePredictor {
    schedule: WeeklySchedule,
    extension_threshold: Duration,
}

impl SchedulePredictor {
    pub fn new(schedule: WeeklySchedule) -> Self {
        Self::with_extension_threshold(schedule, DEFAULT_EXTENSION_THRESHOLD)
    }

    pub fn with_extension_threshold(schedule: WeeklySchedule, extension_threshold: Duration) -> Self {
        Self {
            schedule,
            extension_threshold,
        }
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    /// Next planned moment the light becomes `target_light`.
    pub fn predict_next(&self, target_light: bool, now: OffsetDateTime) -> ClosestTime {
        predict_next(self.schedule.tokens_for(target_light), now)
    }

    /// Next planned change away from `current_light`.
    pub fn next_transition(&self, current_light: bool, now: OffsetDateTime) -> ClosestTime {
        self.predict_next(!current_light, now)
    }

    /// Next planned outage, merging outages that follow each other closely.
    ///
    /// With `prev` the latest off occurrence at or before `now` and `next` the first
    /// one after it: when `next - prev` is shorter than the extension threshold the
    /// two belong to one window, reported as ending at `prev + threshold`.
    pub fn closest_off(&self, now: OffsetDateTime) -> ClosestTime {
        let tokens = self.schedule.off();
        let next = tokens.iter().map(|t| next_occurrence(t, now)).min();
        let prev = tokens.iter().map(|t| next_occurrence(t, now) - WEEK).max();

        match (prev, next) {
            (Some(prev), Some(next)) if next - prev < self.extension_threshold => ClosestTime {
                at: Some(prev + self.extension_threshold),
                is_boundary_extended: true,
            },
            (_, Some(next)) => ClosestTime::exact(next),
            _ => ClosestTime::absent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn tokens(raw: &[&str]) -> Vec<ScheduleToken> {
        raw.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn predictor(on: &[&str], off: &[&str]) -> SchedulePredictor {
        SchedulePredictor::new(WeeklySchedule::parse(on, off).unwrap())
    }

    #[test]
    fn week_start_is_monday_midnight() {
        // 2024-03-07 is a Thursday.
        assert_eq!(
            week_start(datetime!(2024-03-07 13:45 +2)),
            datetime!(2024-03-04 00:00 +2)
        );
        assert_eq!(
            week_start(datetime!(2024-03-10 23:59 +2)),
            datetime!(2024-03-04 00:00 +2)
        );
        assert_eq!(
            week_start(datetime!(2024-03-04 00:00 +2)),
            datetime!(2024-03-04 00:00 +2)
        );
    }

    #[test]
    fn same_day_past_hour_wraps_to_next_week() {
        let now = datetime!(2024-03-04 23:00 +2);
        let result = predict_next(&tokens(&["Mon 10"]), now);
        assert_eq!(result.at, Some(datetime!(2024-03-11 10:00 +2)));
        assert!(!result.is_boundary_extended);
    }

    #[test]
    fn token_at_exactly_now_is_not_future() {
        let now = datetime!(2024-03-04 10:00 +2);
        let result = predict_next(&tokens(&["Mon 10"]), now);
        assert_eq!(result.at, Some(datetime!(2024-03-11 10:00 +2)));
    }

    #[test]
    fn earlier_weekday_resolves_to_next_week() {
        let now = datetime!(2024-03-07 12:00 +2);
        let result = predict_next(&tokens(&["Tue 8"]), now);
        assert_eq!(result.at, Some(datetime!(2024-03-12 08:00 +2)));
    }

    #[test]
    fn picks_the_earliest_future_token() {
        let now = datetime!(2024-03-07 12:00 +2);
        let result = predict_next(&tokens(&["Mon 6", "Thu 18", "Thu 14", "Sun 2"]), now);
        assert_eq!(result.at, Some(datetime!(2024-03-07 14:00 +2)));
    }

    #[test]
    fn sunday_night_wraps_into_monday() {
        let now = datetime!(2024-03-10 22:30 +2);
        let result = predict_next(&tokens(&["Mon 1", "Sun 20"]), now);
        assert_eq!(result.at, Some(datetime!(2024-03-11 01:00 +2)));
    }

    #[test]
    fn empty_list_is_absent() {
        let result = predict_next(&[], datetime!(2024-03-04 10:00 +2));
        assert!(result.is_absent());
    }

    #[test]
    fn result_is_strictly_after_now_for_every_hour_of_the_week() {
        let all = tokens(&["Mon 0", "Wed 12", "Sun 23"]);
        let start = datetime!(2024-03-04 00:00 +2);
        for step in 0..(7 * 24 * 3) {
            let now = start + Duration::minutes(20 * step);
            let at = predict_next(&all, now).at.unwrap();
            assert!(at > now);
            assert!(at - now <= WEEK);
        }
    }

    #[test]
    fn next_transition_uses_opposite_list() {
        let p = predictor(&["Mon 13"], &["Mon 10"]);
        let now = datetime!(2024-03-04 09:00 +2);

        assert_eq!(
            p.next_transition(true, now).at,
            Some(datetime!(2024-03-04 10:00 +2))
        );
        assert_eq!(
            p.next_transition(false, now).at,
            Some(datetime!(2024-03-04 13:00 +2))
        );
    }

    #[test]
    fn close_off_tokens_extend_the_window() {
        let p = predictor(&[], &["Mon 10", "Mon 12"]);
        let now = datetime!(2024-03-04 11:00 +2);

        let result = p.closest_off(now);

        assert!(result.is_boundary_extended);
        assert_eq!(result.at, Some(datetime!(2024-03-04 13:00 +2)));
    }

    #[test]
    fn distant_off_tokens_are_not_merged() {
        let p = predictor(&[], &["Mon 10", "Mon 14"]);
        let now = datetime!(2024-03-04 11:00 +2);

        let result = p.closest_off(now);

        assert!(!result.is_boundary_extended);
        assert_eq!(result.at, Some(datetime!(2024-03-04 14:00 +2)));
    }

    #[test]
    fn extension_looks_back_across_the_week_boundary() {
        let p = predictor(&[], &["Sun 23", "Mon 1"]);
        let now = datetime!(2024-03-04 00:30 +2);

        let result = p.closest_off(now);

        assert!(result.is_boundary_extended);
        assert_eq!(result.at, Some(datetime!(2024-03-04 02:00 +2)));
    }

    #[test]
    fn threshold_is_exclusive() {
        let p = predictor(&[], &["Mon 10", "Mon 13"]);
        let result = p.closest_off(datetime!(2024-03-04 11:00 +2));
        assert!(!result.is_boundary_extended);
        assert_eq!(result.at, Some(datetime!(2024-03-04 13:00 +2)));
    }

    #[test]
    fn closest_off_without_tokens_is_absent() {
        let p = predictor(&["Mon 10"], &[]);
        assert_eq!(p.closest_off(datetime!(2024-03-04 11:00 +2)), ClosestTime::absent());
    }
}

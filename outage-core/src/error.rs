/// Errors raised while parsing the static weekly schedule.
///
/// These only occur at load time; a running predictor never fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("malformed schedule token '{token}': expected '<Weekday> <hour>'")]
    MalformedToken { token: String },
    #[error("unknown weekday '{day}' in schedule token '{token}'")]
    UnknownWeekday { token: String, day: String },
    #[error("hour '{hour}' out of range 0..=23 in schedule token '{token}'")]
    HourOutOfRange { token: String, hour: String },
}

use time::{OffsetDateTime, UtcOffset};

/// An observed power state transition for an area.
///
/// `light == true` means power is present from `ts` until the next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightEvent {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub ts: OffsetDateTime,
    pub light: bool,
}

impl LightEvent {
    pub fn new(ts: OffsetDateTime, light: bool) -> Self {
        Self { ts, light }
    }

    /// Same instant, expressed in `offset`.
    pub fn to_offset(self, offset: UtcOffset) -> Self {
        Self {
            ts: self.ts.to_offset(offset),
            light: self.light,
        }
    }
}

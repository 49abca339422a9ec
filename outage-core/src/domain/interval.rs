use time::OffsetDateTime;

/// A span during which a single light state was active.
///
/// Built fresh from events on every request; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LightInterval {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub start: OffsetDateTime,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub end: OffsetDateTime,
    pub light: bool,
}

impl LightInterval {
    /// Rounding collapsed the interval to zero or negative width.
    ///
    /// Such intervals are still emitted by the builder; they contain no instant.
    pub fn is_degenerate(&self) -> bool {
        self.start >= self.end
    }

    pub fn is_outage(&self) -> bool {
        !self.light
    }

    /// Half-open membership test over `[start, end)`.
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

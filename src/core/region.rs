use serde::{Deserialize, Serialize};

use crate::core::time::{TimeCoord, TimeDelta};
use crate::error::{SoflanError, SoflanResult};

/// Which viewing mode a position list is built for.
///
/// Design is the authoring view: reverse regions still scroll forward, so
/// integration uses the absolute value of the author speed. Preview applies
/// the true signed effective speed and can move position backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollMode {
    Design,
    Preview,
}

/// An authored interval ("soflan") over which the scroll speed multiplier
/// differs from the baseline 1.0.
///
/// Speeds may be negative (reverse) or zero (frozen); the duration may not
/// be negative. Overlapping regions are legal and resolve through the
/// transition fold rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRegion {
    begin: TimeCoord,
    duration: TimeDelta,
    author_speed: f64,
    effective_speed: f64,
}

impl SpeedRegion {
    pub fn new(
        begin: TimeCoord,
        duration: TimeDelta,
        author_speed: f64,
        effective_speed: f64,
    ) -> SoflanResult<Self> {
        if duration.is_negative() {
            return Err(SoflanError::InvalidRegion(
                "duration must not be negative".to_owned(),
            ));
        }
        if !author_speed.is_finite() || !effective_speed.is_finite() {
            return Err(SoflanError::InvalidRegion(
                "speeds must be finite".to_owned(),
            ));
        }
        Ok(Self {
            begin,
            duration,
            author_speed,
            effective_speed,
        })
    }

    #[must_use]
    pub fn begin(&self) -> TimeCoord {
        self.begin
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    #[must_use]
    pub fn author_speed(&self) -> f64 {
        self.author_speed
    }

    #[must_use]
    pub fn effective_speed(&self) -> f64 {
        self.effective_speed
    }

    #[must_use]
    pub fn end(&self) -> TimeCoord {
        self.begin.saturating_add(self.duration)
    }

    /// Speed field selected by the viewing mode.
    #[must_use]
    pub fn speed(&self, mode: ScrollMode) -> f64 {
        match mode {
            ScrollMode::Design => self.author_speed,
            ScrollMode::Preview => self.effective_speed,
        }
    }

    /// Whether `t` falls inside `[begin, end)`.
    #[must_use]
    pub fn spans(&self, t: TimeCoord) -> bool {
        self.begin <= t && t < self.end()
    }
}

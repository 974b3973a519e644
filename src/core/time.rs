use std::fmt;
use std::ops::Sub;

use serde::{Deserialize, Serialize};

/// Sub-unit grid resolution: grid positions per whole time unit.
pub const GRID_RESOLUTION: u32 = 1920;

/// A point on the musical timeline: whole units plus a sub-unit grid
/// fraction in `0..GRID_RESOLUTION`.
///
/// Ordering is total: unit first, grid second. The coordinate space starts
/// at the timeline origin and never goes negative; arithmetic that would
/// cross the origin is exposed through the checked/saturating variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TimeCoord {
    unit: u32,
    grid: u32,
}

impl TimeCoord {
    pub const ZERO: Self = Self { unit: 0, grid: 0 };

    /// Builds a coordinate, carrying grid overflow into whole units.
    #[must_use]
    pub const fn new(unit: u32, grid: u32) -> Self {
        Self {
            unit: unit + grid / GRID_RESOLUTION,
            grid: grid % GRID_RESOLUTION,
        }
    }

    #[must_use]
    pub const fn unit(self) -> u32 {
        self.unit
    }

    #[must_use]
    pub const fn grid(self) -> u32 {
        self.grid
    }

    /// Total sub-unit grids from the timeline origin.
    #[must_use]
    pub const fn total_grid(self) -> i64 {
        self.unit as i64 * GRID_RESOLUTION as i64 + self.grid as i64
    }

    fn from_total_grid(total: i64) -> Option<Self> {
        if total < 0 {
            return None;
        }
        Some(Self {
            unit: (total / i64::from(GRID_RESOLUTION)) as u32,
            grid: (total % i64::from(GRID_RESOLUTION)) as u32,
        })
    }

    /// `self + delta`, or `None` when the result would precede the origin.
    #[must_use]
    pub fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        Self::from_total_grid(self.total_grid() + delta.total_grid())
    }

    /// `self + delta`, clamped at the timeline origin.
    #[must_use]
    pub fn saturating_add(self, delta: TimeDelta) -> Self {
        self.checked_add(delta).unwrap_or(Self::ZERO)
    }

    /// `self - delta`, clamped at the timeline origin.
    #[must_use]
    pub fn saturating_sub(self, delta: TimeDelta) -> Self {
        Self::from_total_grid(self.total_grid() - delta.total_grid()).unwrap_or(Self::ZERO)
    }
}

impl Sub for TimeCoord {
    type Output = TimeDelta;

    fn sub(self, rhs: Self) -> TimeDelta {
        TimeDelta::from_grids(self.total_grid() - rhs.total_grid())
    }
}

impl fmt::Display for TimeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.grid)
    }
}

/// A signed duration between two time coordinates, in grid sub-units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TimeDelta {
    total_grid: i64,
}

impl TimeDelta {
    pub const ZERO: Self = Self { total_grid: 0 };

    #[must_use]
    pub const fn from_grids(total_grid: i64) -> Self {
        Self { total_grid }
    }

    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self {
            total_grid: units * GRID_RESOLUTION as i64,
        }
    }

    #[must_use]
    pub const fn total_grid(self) -> i64 {
        self.total_grid
    }

    /// Duration expressed in fractional whole units.
    #[must_use]
    pub fn in_units(self) -> f64 {
        self.total_grid as f64 / f64::from(GRID_RESOLUTION)
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.total_grid < 0
    }
}

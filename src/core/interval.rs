use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::position::PositionList;
use crate::core::time::TimeCoord;

/// Position-space extent of one breakpoint segment, order-normalized so
/// `y_lo <= y_hi` and `t_lo <= t_hi` (segments can run in either position
/// direction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionInterval {
    pub y_lo: f64,
    pub y_hi: f64,
    pub t_lo: TimeCoord,
    pub t_hi: TimeCoord,
}

impl PositionInterval {
    /// Whether this interval intersects the inclusive range `[y_lo, y_hi]`.
    #[must_use]
    pub fn overlaps(&self, y_lo: f64, y_hi: f64) -> bool {
        self.y_lo <= y_hi && self.y_hi >= y_lo
    }
}

/// Interval index over consecutive breakpoint pairs, answering
/// position-range → time-range overlap queries for the preview mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalIndex {
    // sorted by y_lo
    intervals: Vec<PositionInterval>,
    max_end_y: f64,
}

impl Default for IntervalIndex {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
            max_end_y: f64::NEG_INFINITY,
        }
    }
}

impl IntervalIndex {
    /// Indexes every consecutive breakpoint pair; a singleton list yields
    /// no intervals.
    pub(crate) fn build(list: &PositionList) -> Self {
        let mut intervals = Vec::with_capacity(list.len().saturating_sub(1));
        let mut max_end_y = f64::NEG_INFINITY;

        for pair in list.points().windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let y_lo = prev.y.min(next.y);
            let y_hi = prev.y.max(next.y);
            max_end_y = max_end_y.max(y_hi);

            intervals.push(PositionInterval {
                y_lo,
                y_hi,
                t_lo: prev.t.min(next.t),
                t_hi: prev.t.max(next.t),
            });
        }

        intervals.sort_by_key(|interval| OrderedFloat(interval.y_lo));
        Self {
            intervals,
            max_end_y,
        }
    }

    #[must_use]
    pub fn intervals(&self) -> &[PositionInterval] {
        &self.intervals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Largest `y_hi` across all intervals; negative infinity when empty.
    #[must_use]
    pub fn max_end_y(&self) -> f64 {
        self.max_end_y
    }

    /// Intervals intersecting the inclusive position range `[y_lo, y_hi]`.
    pub fn overlapping(&self, y_lo: f64, y_hi: f64) -> impl Iterator<Item = &PositionInterval> {
        let prefix = self
            .intervals
            .partition_point(|interval| interval.y_lo <= y_hi);
        self.intervals[..prefix]
            .iter()
            .filter(move |interval| interval.y_hi >= y_lo)
    }
}

use serde::{Deserialize, Serialize};

use crate::core::event::flatten_transitions;
use crate::core::region::{ScrollMode, SpeedRegion};
use crate::core::tempo::{TempoChange, TempoIndex};
use crate::core::time::TimeCoord;

/// A control point of the piecewise-linear time↔position mapping.
///
/// `speed` is the speed in effect starting at this breakpoint, applied to
/// the segment running until the next breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub y: f64,
    pub t: TimeCoord,
    pub speed: f64,
    pub tempo: TempoChange,
}

/// Ordered breakpoint sequence defining the mapping for one viewing mode.
///
/// Always holds at least one breakpoint: a timeline with no usable
/// transitions collapses to a synthetic origin breakpoint at position 0,
/// speed 1.0. Position is monotonically non-decreasing in design mode but
/// may decrease across reverse segments in preview mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionList {
    points: Vec<Breakpoint>,
}

impl PositionList {
    /// Integrates the flattened transition sequence into breakpoints.
    ///
    /// Each segment's length uses the tempo effective at its entering
    /// transition (tempo changes are themselves transitions, so nothing is
    /// resampled mid-segment) and is scaled by the entering speed:
    /// absolute in design mode, signed in preview mode.
    pub(crate) fn build(
        mode: ScrollMode,
        unit_scale: f64,
        tempo_index: &TempoIndex,
        regions: &[SpeedRegion],
    ) -> Self {
        let transitions = flatten_transitions(regions, tempo_index, mode);
        let mut points = Vec::with_capacity(transitions.len());
        let mut current_y = 0.0f64;

        for pair in transitions.windows(2) {
            let (prev, cur) = (pair[0], pair[1]);
            let length = prev.tempo.delta_to_length(cur.t - prev.t, unit_scale);
            let scaled = match mode {
                ScrollMode::Design => length * prev.speed.abs(),
                ScrollMode::Preview => length * prev.speed,
            };

            points.push(Breakpoint {
                y: current_y,
                t: prev.t,
                speed: prev.speed,
                tempo: prev.tempo,
            });
            current_y += scaled;
        }

        if points.is_empty() {
            points.push(Breakpoint {
                y: 0.0,
                t: TimeCoord::ZERO,
                speed: 1.0,
                tempo: tempo_index.first_tempo(),
            });
        } else if let Some(last) = transitions.last() {
            if last.t != points[0].t {
                points.push(Breakpoint {
                    y: current_y,
                    t: last.t,
                    speed: last.speed,
                    tempo: last.tempo,
                });
            }
        }

        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[Breakpoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Breakpoint {
        self.points[0]
    }

    #[must_use]
    pub fn last(&self) -> Breakpoint {
        self.points[self.points.len() - 1]
    }
}

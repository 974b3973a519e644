use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::time::{GRID_RESOLUTION, TimeCoord, TimeDelta};
use crate::error::{SoflanError, SoflanResult};

/// Tempo anchoring the length↔time conversion: one whole unit at 240 BPM
/// spans exactly `unit_scale` length units. Position tracks audio time, so
/// the same unit at other tempos scales by `240 / bpm`.
pub const REFERENCE_BPM: f64 = 240.0;

const DEFAULT_BPM: f64 = 240.0;

/// A tempo in effect from `at` until superseded by a later change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    pub at: TimeCoord,
    pub bpm: f64,
}

impl TempoChange {
    pub fn new(at: TimeCoord, bpm: f64) -> SoflanResult<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SoflanError::InvalidTempo { bpm });
        }
        Ok(Self { at, bpm })
    }

    /// Length covered by `delta` at this tempo.
    #[must_use]
    pub fn delta_to_length(self, delta: TimeDelta, unit_scale: f64) -> f64 {
        delta.in_units() * unit_scale * REFERENCE_BPM / self.bpm
    }

    /// Time delta covered by `length` at this tempo, rounded to the
    /// nearest grid sub-unit.
    #[must_use]
    pub fn length_to_delta(self, length: f64, unit_scale: f64) -> TimeDelta {
        let units = length * self.bpm / (REFERENCE_BPM * unit_scale);
        TimeDelta::from_grids((units * f64::from(GRID_RESOLUTION)).round() as i64)
    }

    fn fallback() -> Self {
        Self {
            at: TimeCoord::ZERO,
            bpm: DEFAULT_BPM,
        }
    }
}

/// Ordered tempo timeline. The first entry defines the tempo from the start
/// of the timeline; an empty index falls back to 240 BPM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TempoIndex {
    changes: Vec<TempoChange>,
}

impl TempoIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_changes(mut changes: Vec<TempoChange>) -> Self {
        changes.sort_by_key(|change| change.at);
        Self { changes }
    }

    /// Inserts a change, keeping the timeline sorted. A change at an already
    /// occupied coordinate lands after the existing one and wins the
    /// effective-tempo lookup.
    pub fn push(&mut self, change: TempoChange) {
        let index = self.changes.partition_point(|c| c.at <= change.at);
        self.changes.insert(index, change);
    }

    pub fn remove(&mut self, index: usize) -> Option<TempoChange> {
        (index < self.changes.len()).then(|| self.changes.remove(index))
    }

    #[must_use]
    pub fn changes(&self) -> &[TempoChange] {
        &self.changes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn first_tempo(&self) -> TempoChange {
        self.changes
            .first()
            .copied()
            .unwrap_or_else(TempoChange::fallback)
    }

    /// Tempo in effect at `t`: the last change at or before `t`, or the
    /// first change when `t` precedes all of them.
    #[must_use]
    pub fn effective_tempo(&self, t: TimeCoord) -> TempoChange {
        let index = self.changes.partition_point(|change| change.at <= t);
        if index == 0 {
            self.first_tempo()
        } else {
            self.changes[index - 1]
        }
    }

    /// Length covered by `delta` starting at `t`, using the tempo
    /// effective there.
    #[must_use]
    pub fn delta_to_length(&self, delta: TimeDelta, t: TimeCoord, unit_scale: f64) -> f64 {
        self.effective_tempo(t).delta_to_length(delta, unit_scale)
    }

    /// Time delta covered by `length` starting at `t`, using the tempo
    /// effective there.
    #[must_use]
    pub fn length_to_delta(&self, length: f64, t: TimeCoord, unit_scale: f64) -> TimeDelta {
        self.effective_tempo(t).length_to_delta(length, unit_scale)
    }

    /// Content hash used for cache invalidation; stable across edits that
    /// leave the sequence unchanged.
    #[must_use]
    pub fn content_fingerprint(&self) -> u64 {
        let mut hasher = std::hash::DefaultHasher::new();
        for change in &self.changes {
            change.at.hash(&mut hasher);
            change.bpm.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

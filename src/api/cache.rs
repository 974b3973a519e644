use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::core::interval::IntervalIndex;
use crate::core::position::PositionList;
use crate::core::region::{ScrollMode, SpeedRegion};
use crate::core::tempo::TempoIndex;

/// Memoized design/preview position lists and the preview interval index,
/// gated by a composite fingerprint of the unit scale and the tempo
/// timeline content.
///
/// All three outputs are replaced together on invalidation so design and
/// preview breakpoints stay time-aligned for downstream consumers; a query
/// never observes a partial rebuild.
#[derive(Debug, Clone)]
pub(super) struct PositionCache {
    fingerprint: Option<u64>,
    design: PositionList,
    preview: PositionList,
    preview_index: IntervalIndex,
    rebuilds: u64,
}

impl PositionCache {
    pub(super) fn new() -> Self {
        let empty = TempoIndex::new();
        Self {
            fingerprint: None,
            design: PositionList::build(ScrollMode::Design, 1.0, &empty, &[]),
            preview: PositionList::build(ScrollMode::Preview, 1.0, &empty, &[]),
            preview_index: IntervalIndex::default(),
            rebuilds: 0,
        }
    }

    /// Forces the next query to rebuild: region edits are not covered by
    /// the fingerprint, so the owner clears it on mutation.
    pub(super) fn mark_dirty(&mut self) {
        self.fingerprint = None;
    }

    pub(super) fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub(super) fn design(&self) -> &PositionList {
        &self.design
    }

    pub(super) fn preview(&self) -> &PositionList {
        &self.preview
    }

    pub(super) fn preview_index(&self) -> &IntervalIndex {
        &self.preview_index
    }

    /// Invalidation gate shared by every query entry point.
    pub(super) fn ensure_fresh(
        &mut self,
        unit_scale: f64,
        tempo_index: &TempoIndex,
        regions: &[SpeedRegion],
    ) {
        let fingerprint = composite_fingerprint(unit_scale, tempo_index);
        if self.fingerprint == Some(fingerprint) {
            return;
        }

        debug!(fingerprint, "rebuilding cached position lists");

        #[cfg(feature = "parallel-rebuild")]
        let (design, preview) = rayon::join(
            || PositionList::build(ScrollMode::Design, unit_scale, tempo_index, regions),
            || PositionList::build(ScrollMode::Preview, unit_scale, tempo_index, regions),
        );

        #[cfg(not(feature = "parallel-rebuild"))]
        let (design, preview) = (
            PositionList::build(ScrollMode::Design, unit_scale, tempo_index, regions),
            PositionList::build(ScrollMode::Preview, unit_scale, tempo_index, regions),
        );

        self.preview_index = IntervalIndex::build(&preview);
        self.design = design;
        self.preview = preview;
        self.fingerprint = Some(fingerprint);
        self.rebuilds += 1;
    }
}

fn composite_fingerprint(unit_scale: f64, tempo_index: &TempoIndex) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    unit_scale.to_bits().hash(&mut hasher);
    tempo_index.content_fingerprint().hash(&mut hasher);
    hasher.finish()
}

mod cache;
mod json_contract;

pub use json_contract::{
    TIMELINE_SNAPSHOT_JSON_SCHEMA_V1, TimelineSnapshot, TimelineSnapshotJsonContractV1,
};

use serde::{Deserialize, Serialize};

use crate::core::interval::IntervalIndex;
use crate::core::position::PositionList;
use crate::core::region::{ScrollMode, SpeedRegion};
use crate::core::tempo::TempoIndex;
use crate::core::visible::{VisibleRange, query_visible_ranges};
use crate::error::{SoflanError, SoflanResult};
use cache::PositionCache;

/// Viewport parameters for one visible-range query, supplied once per
/// rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewQuery {
    /// Current scroll position in position space.
    pub current_y: f64,
    /// Viewport extent in position space.
    pub view_height: f64,
    /// Look-behind distance before the scroll position (typically the
    /// judgment-line offset).
    pub pre_offset: f64,
    /// Zoom factor dividing all position-space quantities.
    pub scale: f64,
    /// Length of one whole time unit at the reference tempo.
    pub unit_scale: f64,
}

impl ViewQuery {
    /// Rejects non-finite fields; negative extents clamp to zero.
    fn validated(self) -> SoflanResult<Self> {
        if !self.current_y.is_finite() || !self.view_height.is_finite() || !self.pre_offset.is_finite()
        {
            return Err(SoflanError::InvalidQuery(
                "viewport values must be finite".to_owned(),
            ));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(SoflanError::InvalidQuery(
                "scale must be finite and > 0".to_owned(),
            ));
        }
        validate_unit_scale(self.unit_scale)?;

        Ok(Self {
            view_height: self.view_height.max(0.0),
            pre_offset: self.pre_offset.max(0.0),
            ..self
        })
    }
}

/// Owns the authored speed regions and the memoized time↔position mapping.
///
/// Construct one per scrolling timeline and thread it through the render
/// loop; every query runs the same invalidation check first, so design and
/// preview consumers always observe one consistent rebuild.
#[derive(Debug, Clone)]
pub struct SoflanTimeline {
    // sorted by begin
    regions: Vec<SpeedRegion>,
    cache: PositionCache,
}

impl Default for SoflanTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SoflanTimeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            cache: PositionCache::new(),
        }
    }

    #[must_use]
    pub fn with_regions(mut regions: Vec<SpeedRegion>) -> Self {
        regions.sort_by_key(|region| region.begin());
        Self {
            regions,
            cache: PositionCache::new(),
        }
    }

    #[must_use]
    pub fn regions(&self) -> &[SpeedRegion] {
        &self.regions
    }

    /// Inserts a region, keeping the list ordered by begin time.
    pub fn push_region(&mut self, region: SpeedRegion) {
        let index = self
            .regions
            .partition_point(|existing| existing.begin() <= region.begin());
        self.regions.insert(index, region);
        self.cache.mark_dirty();
    }

    pub fn remove_region(&mut self, index: usize) -> Option<SpeedRegion> {
        if index >= self.regions.len() {
            return None;
        }
        let removed = self.regions.remove(index);
        self.cache.mark_dirty();
        Some(removed)
    }

    pub fn clear_regions(&mut self) {
        self.regions.clear();
        self.cache.mark_dirty();
    }

    /// The cached breakpoint list for a viewing mode, rebuilt first when
    /// the fingerprint changed.
    pub fn position_list(
        &mut self,
        mode: ScrollMode,
        unit_scale: f64,
        tempo_index: &TempoIndex,
    ) -> SoflanResult<&PositionList> {
        validate_unit_scale(unit_scale)?;
        self.cache.ensure_fresh(unit_scale, tempo_index, &self.regions);
        Ok(match mode {
            ScrollMode::Design => self.cache.design(),
            ScrollMode::Preview => self.cache.preview(),
        })
    }

    /// Overlap-queryable index over the preview mapping's segments.
    pub fn preview_interval_index(
        &mut self,
        unit_scale: f64,
        tempo_index: &TempoIndex,
    ) -> SoflanResult<&IntervalIndex> {
        validate_unit_scale(unit_scale)?;
        self.cache.ensure_fresh(unit_scale, tempo_index, &self.regions);
        Ok(self.cache.preview_index())
    }

    /// Answers which time ranges are visible for the given viewport.
    ///
    /// Runs against the preview mapping; the result is disjoint, ascending
    /// by `min_t`, fully materialized, and safe to re-enumerate. A timeline
    /// whose sole breakpoint has zero or negative speed yields no ranges.
    pub fn visible_ranges(
        &mut self,
        query: ViewQuery,
        tempo_index: &TempoIndex,
    ) -> SoflanResult<Vec<VisibleRange>> {
        let query = query.validated()?;
        self.cache
            .ensure_fresh(query.unit_scale, tempo_index, &self.regions);
        Ok(query_visible_ranges(
            self.cache.preview(),
            query.current_y,
            query.view_height,
            query.pre_offset,
            query.scale,
            query.unit_scale,
        ))
    }

    /// How many times the cache has been rebuilt over this timeline's
    /// lifetime.
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.cache.rebuilds()
    }

    /// Diagnostic snapshot of the cached breakpoints for one viewing mode.
    pub fn snapshot(
        &mut self,
        mode: ScrollMode,
        unit_scale: f64,
        tempo_index: &TempoIndex,
    ) -> SoflanResult<TimelineSnapshot> {
        let breakpoints = self
            .position_list(mode, unit_scale, tempo_index)?
            .points()
            .to_vec();
        Ok(TimelineSnapshot {
            mode,
            rebuilds: self.cache.rebuilds(),
            breakpoints,
        })
    }
}

fn validate_unit_scale(unit_scale: f64) -> SoflanResult<()> {
    if !unit_scale.is_finite() || unit_scale <= 0.0 {
        return Err(SoflanError::InvalidQuery(
            "unit scale must be finite and > 0".to_owned(),
        ));
    }
    Ok(())
}

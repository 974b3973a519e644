use soflan_rs::core::{SpeedRegion, TempoChange, TempoIndex, TimeCoord, TimeDelta, VisibleRange};
use soflan_rs::{SoflanError, SoflanTimeline, ViewQuery};

fn tempo(unit: u32, bpm: f64) -> TempoChange {
    TempoChange::new(TimeCoord::new(unit, 0), bpm).expect("valid tempo")
}

fn region(begin_unit: u32, duration_units: i64, speed: f64) -> SpeedRegion {
    SpeedRegion::new(
        TimeCoord::new(begin_unit, 0),
        TimeDelta::from_units(duration_units),
        speed,
        speed,
    )
    .expect("valid region")
}

fn query(current_y: f64, view_height: f64, pre_offset: f64) -> ViewQuery {
    ViewQuery {
        current_y,
        view_height,
        pre_offset,
        scale: 1.0,
        unit_scale: 1.0,
    }
}

fn range(min: TimeCoord, max: TimeCoord) -> VisibleRange {
    VisibleRange::new(min, max)
}

#[test]
fn uniform_timeline_maps_viewport_directly() {
    // 100 length units at 120 BPM cover 50 whole units
    let mut timeline = SoflanTimeline::new();
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 120.0)]);

    let ranges = timeline
        .visible_ranges(query(0.0, 100.0, 0.0), &tempo_index)
        .expect("visible ranges");

    assert_eq!(
        ranges,
        vec![range(TimeCoord::ZERO, TimeCoord::new(50, 0))]
    );
}

#[test]
fn zoom_scale_divides_viewport_extent() {
    let mut timeline = SoflanTimeline::new();
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 120.0)]);

    let ranges = timeline
        .visible_ranges(
            ViewQuery {
                scale: 2.0,
                ..query(0.0, 100.0, 0.0)
            },
            &tempo_index,
        )
        .expect("visible ranges");

    assert_eq!(
        ranges,
        vec![range(TimeCoord::ZERO, TimeCoord::new(25, 0))]
    );
}

#[test]
fn viewport_spanning_speed_change_carries_remainder_across_segments() {
    // speed doubles at unit 2; a viewport overlapping the boundary must
    // keep probing into the faster segment and merge into one range
    let mut timeline = SoflanTimeline::with_regions(vec![region(2, 2, 2.0)]);
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 240.0)]);

    let ranges = timeline
        .visible_ranges(query(1.0, 4.0, 0.0), &tempo_index)
        .expect("visible ranges");

    assert_eq!(
        ranges,
        vec![range(TimeCoord::new(1, 0), TimeCoord::new(3, 960))]
    );
}

#[test]
fn query_beyond_last_breakpoint_extrapolates_exactly_once() {
    let mut timeline = SoflanTimeline::new();
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 240.0), tempo(4, 240.0)]);

    let ranges = timeline
        .visible_ranges(query(54.0, 10.0, 0.0), &tempo_index)
        .expect("visible ranges");

    assert_eq!(
        ranges,
        vec![range(TimeCoord::new(54, 0), TimeCoord::new(64, 0))]
    );
}

#[test]
fn frozen_segment_contributes_no_time_movement() {
    // speed 0 between units 1 and 3: the viewport pinned at the freeze
    // resolves to the freeze instant plus the post-freeze tail
    let mut timeline = SoflanTimeline::with_regions(vec![region(1, 2, 0.0)]);
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 240.0)]);

    let ranges = timeline
        .visible_ranges(query(1.0, 2.0, 0.0), &tempo_index)
        .expect("visible ranges");

    assert_eq!(
        ranges,
        vec![
            range(TimeCoord::new(1, 0), TimeCoord::new(1, 0)),
            range(TimeCoord::new(3, 0), TimeCoord::new(5, 0)),
        ]
    );
}

#[test]
fn pre_offset_extends_the_viewport_backwards() {
    let mut timeline = SoflanTimeline::new();
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 240.0), tempo(2, 240.0)]);

    // scroll sits at y=4 with a 1-unit look-behind
    let ranges = timeline
        .visible_ranges(query(4.0, 3.0, 1.0), &tempo_index)
        .expect("visible ranges");

    assert_eq!(
        ranges,
        vec![range(TimeCoord::new(3, 0), TimeCoord::new(6, 0))]
    );
}

#[test]
fn negative_view_extents_clamp_to_zero() {
    let mut timeline = SoflanTimeline::new();
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 120.0)]);

    let ranges = timeline
        .visible_ranges(query(0.0, -5.0, -1.0), &tempo_index)
        .expect("visible ranges");

    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].min_t, ranges[0].max_t);
}

#[test]
fn non_finite_query_fields_are_rejected() {
    let mut timeline = SoflanTimeline::new();
    let tempo_index = TempoIndex::new();

    let result = timeline.visible_ranges(query(f64::NAN, 100.0, 0.0), &tempo_index);
    assert!(matches!(result, Err(SoflanError::InvalidQuery(_))));

    let result = timeline.visible_ranges(
        ViewQuery {
            scale: 0.0,
            ..query(0.0, 100.0, 0.0)
        },
        &tempo_index,
    );
    assert!(matches!(result, Err(SoflanError::InvalidQuery(_))));
}

#[test]
fn results_are_disjoint_and_ascending() {
    let mut timeline = SoflanTimeline::with_regions(vec![
        region(1, 1, 0.0),
        region(3, 2, 2.0),
        region(6, 1, 0.5),
    ]);
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 240.0), tempo(4, 120.0)]);

    for current_y in [0.0, 1.0, 2.5, 4.0, 8.0, 20.0] {
        let ranges = timeline
            .visible_ranges(query(current_y, 6.0, 1.0), &tempo_index)
            .expect("visible ranges");
        for pair in ranges.windows(2) {
            assert!(pair[0].max_t < pair[1].min_t);
        }
        for visible in &ranges {
            assert!(visible.min_t <= visible.max_t);
        }
    }
}

#[test]
fn re_enumeration_is_stable() {
    let mut timeline = SoflanTimeline::with_regions(vec![region(2, 2, 2.0)]);
    let tempo_index = TempoIndex::from_changes(vec![tempo(0, 240.0)]);

    let first = timeline
        .visible_ranges(query(1.0, 4.0, 0.0), &tempo_index)
        .expect("visible ranges");
    let second = timeline
        .visible_ranges(query(1.0, 4.0, 0.0), &tempo_index)
        .expect("visible ranges");
    assert_eq!(first, second);
    assert_eq!(timeline.rebuild_count(), 1);
}

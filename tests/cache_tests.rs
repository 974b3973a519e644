use soflan_rs::SoflanTimeline;
use soflan_rs::core::{ScrollMode, SpeedRegion, TempoChange, TempoIndex, TimeCoord, TimeDelta};

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

fn base_tempo_index() -> TempoIndex {
    TempoIndex::from_changes(vec![tempo(0, 120.0)])
}

#[test]
fn repeated_queries_reuse_one_rebuild() {
    let mut timeline = SoflanTimeline::with_regions(vec![region(1, 1, 2.0)]);
    let tempo_index = base_tempo_index();

    let first = timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list")
        .clone();
    assert_eq!(timeline.rebuild_count(), 1);

    let second = timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list")
        .clone();
    assert_eq!(timeline.rebuild_count(), 1);
    assert_eq!(first, second);
}

#[test]
fn design_and_preview_queries_share_one_rebuild() {
    let mut timeline = SoflanTimeline::with_regions(vec![region(1, 1, -2.0)]);
    let tempo_index = base_tempo_index();

    timeline
        .position_list(ScrollMode::Design, 1.0, &tempo_index)
        .expect("design list");
    timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("preview list");
    timeline
        .preview_interval_index(1.0, &tempo_index)
        .expect("interval index");

    assert_eq!(timeline.rebuild_count(), 1);
}

#[test]
fn tempo_edit_changes_fingerprint_and_rebuilds() {
    let mut timeline = SoflanTimeline::with_regions(vec![region(1, 1, 2.0)]);
    let mut tempo_index = base_tempo_index();

    let before = timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list")
        .clone();
    assert_eq!(timeline.rebuild_count(), 1);

    tempo_index.push(tempo(2, 60.0));
    let after = timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list")
        .clone();

    assert_eq!(timeline.rebuild_count(), 2);
    assert_ne!(before, after);
}

#[test]
fn identical_tempo_content_does_not_rebuild() {
    let mut timeline = SoflanTimeline::with_regions(vec![region(1, 1, 2.0)]);
    let tempo_index = base_tempo_index();

    timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list");
    assert_eq!(timeline.rebuild_count(), 1);

    // a freshly built index with identical content has the same fingerprint
    let rebuilt_elsewhere = TempoIndex::from_changes(vec![tempo(0, 120.0)]);
    timeline
        .position_list(ScrollMode::Preview, 1.0, &rebuilt_elsewhere)
        .expect("list");
    assert_eq!(timeline.rebuild_count(), 1);
}

#[test]
fn unit_scale_change_rebuilds() {
    let mut timeline = SoflanTimeline::with_regions(vec![region(1, 1, 2.0)]);
    let tempo_index = base_tempo_index();

    timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list");
    timeline
        .position_list(ScrollMode::Preview, 2.0, &tempo_index)
        .expect("list");

    assert_eq!(timeline.rebuild_count(), 2);
}

#[test]
fn region_edits_mark_the_cache_dirty() {
    let mut timeline = SoflanTimeline::new();
    let tempo_index = base_tempo_index();

    let plain = timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list")
        .clone();
    assert_eq!(timeline.rebuild_count(), 1);

    timeline.push_region(region(1, 2, 3.0));
    let with_region = timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list")
        .clone();
    assert_eq!(timeline.rebuild_count(), 2);
    assert_ne!(plain, with_region);

    timeline.remove_region(0).expect("region exists");
    let removed = timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list")
        .clone();
    assert_eq!(timeline.rebuild_count(), 3);
    assert_eq!(removed, plain);

    timeline.push_region(region(2, 1, 0.5));
    timeline.clear_regions();
    assert!(timeline.regions().is_empty());
    let cleared = timeline
        .position_list(ScrollMode::Preview, 1.0, &tempo_index)
        .expect("list")
        .clone();
    assert_eq!(cleared, plain);
}

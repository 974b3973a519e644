use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use tracing::warn;

use crate::core::position::{Breakpoint, PositionList};
use crate::core::tempo::TempoChange;
use crate::core::time::{TimeCoord, TimeDelta};

/// A time-coordinate interval currently within the render viewport.
/// Never empty: `min_t <= max_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub min_t: TimeCoord,
    pub max_t: TimeCoord,
}

impl VisibleRange {
    /// Builds a range from two endpoints in either order.
    #[must_use]
    pub fn new(a: TimeCoord, b: TimeCoord) -> Self {
        Self {
            min_t: a.min(b),
            max_t: a.max(b),
        }
    }
}

/// Coalesces overlapping or touching ranges into the minimal disjoint
/// covering set, ascending by `min_t`.
#[must_use]
pub fn merge_ranges(mut ranges: Vec<VisibleRange>) -> Vec<VisibleRange> {
    ranges.sort_by_key(|range| range.min_t);

    let mut merged: Vec<VisibleRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(current) if range.min_t <= current.max_t => {
                current.min_t = current.min_t.min(range.min_t);
                current.max_t = current.max_t.max(range.max_t);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Inverts the preview position mapping: which time ranges fall inside the
/// viewport `[current_y - pre_offset, .. + view_height]` (all divided by
/// `scale`)?
///
/// Walks every segment intersecting the scroll point or the viewport span,
/// carrying unmet viewing distance into neighboring segments, then merges
/// the produced ranges. A sole breakpoint with zero or negative speed has
/// no defined inverse and yields no ranges.
pub(crate) fn query_visible_ranges(
    list: &PositionList,
    current_y: f64,
    view_height: f64,
    pre_offset: f64,
    scale: f64,
    unit_scale: f64,
) -> Vec<VisibleRange> {
    let current_y = current_y / scale;
    let view_height = view_height / scale;
    let pre_offset = pre_offset / scale;
    let view_min_y = current_y - pre_offset;
    let view_max_y = view_min_y + view_height;

    let points = list.points();
    let mut ranges: Vec<VisibleRange> = Vec::new();

    if points.len() > 1 {
        let mut min_y = 0.0f64;
        for index in 0..points.len() - 1 {
            let cur = points[index];
            let next = points[index + 1];
            min_y = cur.y.min(next.y);
            let max_y = cur.y.max(next.y);

            let intersects = (min_y <= current_y && current_y <= max_y)
                || (view_max_y >= min_y && max_y >= view_min_y);
            if intersects {
                let seed = SegmentFrame {
                    index,
                    y: current_y,
                    left_remain: pre_offset,
                    right_remain: view_height - pre_offset,
                };
                solve_segment(points, seed, view_height, unit_scale, &mut ranges);
            }
        }

        let last = points[points.len() - 1];
        if last.y <= min_y {
            // non-ascending tail: convert the raw viewport bounds through
            // the last breakpoint
            let a = last
                .t
                .saturating_add(last.tempo.length_to_delta(view_min_y - last.y, unit_scale));
            let b = last
                .t
                .saturating_add(last.tempo.length_to_delta(view_max_y - last.y, unit_scale));
            ranges.push(VisibleRange::new(a, b));
        } else if current_y >= last.y {
            ranges.push(extrapolate_tail(
                last,
                current_y,
                view_height,
                pre_offset,
                unit_scale,
            ));
        }
    } else {
        let only = points[0];
        let abs_speed = only.speed.abs();
        if only.speed > 0.0 {
            let left = view_min_y.max(0.0);
            let left_t = only
                .t
                .saturating_add(scaled_delta(only.tempo, left, abs_speed, unit_scale));
            let right = left + view_height;
            let right_t = only
                .t
                .saturating_add(scaled_delta(only.tempo, right, abs_speed, unit_scale));
            ranges.push(VisibleRange::new(left_t, right_t));
        }
        // zero or reverse speed at the sole breakpoint: no defined inverse
    }

    merge_ranges(ranges)
}

/// Length-to-time conversion through a speed divisor; frozen segments
/// contribute no time movement instead of dividing by zero.
fn scaled_delta(tempo: TempoChange, length: f64, abs_speed: f64, unit_scale: f64) -> TimeDelta {
    if abs_speed == 0.0 {
        TimeDelta::ZERO
    } else {
        tempo.length_to_delta(length / abs_speed, unit_scale)
    }
}

/// Scroll position at or beyond the last breakpoint: one extrapolated range
/// from the last segment's speed and tempo, with no neighbor to carry
/// remainder into. Assumes the boundary speed direction it finds.
fn extrapolate_tail(
    last: Breakpoint,
    y: f64,
    view_height: f64,
    pre_offset: f64,
    unit_scale: f64,
) -> VisibleRange {
    let abs_speed = last.speed.abs();
    let left_remain = pre_offset;
    let right_remain = view_height - pre_offset;

    if last.speed > 0.0 {
        let left = (y - left_remain).max(last.y);
        let left_t = last
            .t
            .saturating_add(scaled_delta(last.tempo, left - last.y, abs_speed, unit_scale));
        let right = y + right_remain;
        let right_t = last.t.saturating_add(scaled_delta(
            last.tempo,
            right - last.y,
            abs_speed,
            unit_scale,
        ));
        VisibleRange::new(left_t, right_t)
    } else {
        let left = (y + left_remain).min(last.y);
        let left_t = last.t.saturating_sub(scaled_delta(
            last.tempo,
            view_height.max(last.y - left),
            abs_speed,
            unit_scale,
        ));
        let right = y - right_remain;
        let right_t = last.t.saturating_add(scaled_delta(
            last.tempo,
            last.y - right,
            abs_speed,
            unit_scale,
        ));
        VisibleRange::new(left_t, right_t)
    }
}

/// One pending unit of inversion work: resolve the viewing distances
/// `left_remain`/`right_remain` around position `y` inside segment
/// `[index, index + 1]`.
#[derive(Debug, Clone, Copy)]
struct SegmentFrame {
    index: usize,
    y: f64,
    left_remain: f64,
    right_remain: f64,
}

/// Explicit-worklist form of the recursive segment walk. Remainders are
/// consumed monotonically and the frame index only ever steps to a
/// neighbor, so the frame count is bounded by the list length; the fuse
/// guards against float drift keeping a remainder alive.
fn solve_segment(
    points: &[Breakpoint],
    seed: SegmentFrame,
    view_height: f64,
    unit_scale: f64,
    out: &mut Vec<VisibleRange>,
) {
    let mut stack: SmallVec<[SegmentFrame; 8]> = smallvec![seed];
    let fuse = points.len() * 2 + 4;
    let mut steps = 0usize;

    while let Some(frame) = stack.pop() {
        steps += 1;
        if steps > fuse {
            warn!(steps, fuse, "segment worklist tripped its iteration fuse");
            break;
        }

        let cur = points[frame.index];
        let next = points[frame.index + 1];
        let abs_speed = cur.speed.abs();

        let (left, left_t, new_left_remain, right, right_t, new_right_remain) = if cur.speed > 0.0 {
            let calc_left = frame.y - frame.left_remain;
            let left = calc_left.max(cur.y);
            let new_left_remain = (cur.y - calc_left).max(0.0);
            let left_t = cur
                .t
                .saturating_add(scaled_delta(cur.tempo, left - cur.y, abs_speed, unit_scale));

            let calc_right = frame.y + frame.right_remain;
            let right = next.y.min(calc_right);
            let new_right_remain = (calc_right - next.y).max(0.0);
            let right_t = cur
                .t
                .saturating_add(scaled_delta(cur.tempo, right - cur.y, abs_speed, unit_scale));

            (left, left_t, new_left_remain, right, right_t, new_right_remain)
        } else {
            // reverse (or frozen): the position-to-time direction flips
            let calc_left = frame.y + frame.left_remain;
            let left = calc_left.min(cur.y);
            let new_left_remain = (left - cur.y).max(0.0);
            // a reverse segment shows more than left_remain asked for, so
            // the left bound over-extends by up to a full view height
            let left_t = cur.t.saturating_sub(scaled_delta(
                cur.tempo,
                view_height.max(cur.y - left),
                abs_speed,
                unit_scale,
            ));

            let calc_right = frame.y - frame.right_remain;
            let right = next.y.max(calc_right);
            let new_right_remain = (next.y - calc_right).max(0.0);
            let right_t = cur
                .t
                .saturating_add(scaled_delta(cur.tempo, cur.y - right, abs_speed, unit_scale));

            (left, left_t, new_left_remain, right, right_t, new_right_remain)
        };

        out.push(VisibleRange::new(left_t, right_t));

        if new_left_remain > 0.0 {
            if frame.index > 0 {
                stack.push(SegmentFrame {
                    index: frame.index - 1,
                    y: left,
                    left_remain: new_left_remain,
                    right_remain: 0.0,
                });
            } else {
                // first segment: extrapolate the unmet distance, assuming
                // forward speed at the boundary
                let over_left_t = left_t.saturating_sub(scaled_delta(
                    cur.tempo,
                    new_left_remain,
                    abs_speed,
                    unit_scale,
                ));
                out.push(VisibleRange::new(over_left_t, left_t));
            }
        }

        if new_right_remain > 0.0 {
            if frame.index < points.len() - 2 {
                stack.push(SegmentFrame {
                    index: frame.index + 1,
                    y: right,
                    left_remain: 0.0,
                    right_remain: new_right_remain,
                });
            } else {
                let over_right_t = right_t.saturating_add(scaled_delta(
                    cur.tempo,
                    new_right_remain,
                    abs_speed,
                    unit_scale,
                ));
                out.push(VisibleRange::new(right_t, over_right_t));
            }
        }
    }
}

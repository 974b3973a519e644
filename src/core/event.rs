use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::core::region::{ScrollMode, SpeedRegion};
use crate::core::tempo::{TempoChange, TempoIndex};
use crate::core::time::TimeCoord;

/// A single state-transition source on the flattened timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    TempoChanged,
    RegionBegan,
    RegionEnded,
}

impl TransitionKind {
    const fn bit(self) -> u8 {
        match self {
            Self::TempoChanged => 1 << 0,
            Self::RegionBegan => 1 << 1,
            Self::RegionEnded => 1 << 2,
        }
    }
}

/// Bitmask of the transition kinds folded into one combined transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionKinds {
    bits: u8,
}

impl TransitionKinds {
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn from_kind(kind: TransitionKind) -> Self {
        Self { bits: kind.bit() }
    }

    #[must_use]
    pub const fn with_kind(self, kind: TransitionKind) -> Self {
        Self {
            bits: self.bits | kind.bit(),
        }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn contains(self, kind: TransitionKind) -> bool {
        (self.bits & kind.bit()) != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

/// One combined transition: the speed and tempo in effect starting at `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub t: TimeCoord,
    pub speed: f64,
    pub tempo: TempoChange,
    pub kinds: TransitionKinds,
}

#[derive(Debug, Clone, Copy)]
struct RawEvent {
    t: TimeCoord,
    speed: f64,
    tempo: TempoChange,
    kind: TransitionKind,
}

/// Flattens tempo changes and region boundaries into one ordered sequence
/// of combined transitions, strictly increasing in time.
///
/// Tempo events carry the speed of whichever region spans the instant (else
/// the baseline 1.0). Each region contributes a begin event with the
/// mode-selected speed and an end event restoring baseline at the tempo
/// effective there. Simultaneous events fold left-to-right in arrival
/// order; at equal time, tempo events arrive before region events.
#[must_use]
pub fn flatten_transitions(
    regions: &[SpeedRegion],
    tempo_index: &TempoIndex,
    mode: ScrollMode,
) -> Vec<Transition> {
    let tempos = tempo_index.changes();
    let mut raw: Vec<RawEvent> = Vec::with_capacity(tempos.len() + regions.len() * 2);
    let mut cur_tempo = tempo_index.first_tempo();
    let mut cur_region: Option<&SpeedRegion> = None;

    let mut ti = 0usize;
    let mut ri = 0usize;
    while ti < tempos.len() || ri < regions.len() {
        let take_tempo = match (tempos.get(ti), regions.get(ri)) {
            (Some(change), Some(region)) => change.at <= region.begin(),
            (Some(_), None) => true,
            (None, _) => false,
        };

        if take_tempo {
            let change = tempos[ti];
            ti += 1;
            cur_tempo = change;
            let speed = cur_region
                .filter(|region| region.end() > change.at)
                .map_or(1.0, |region| region.speed(mode));
            raw.push(RawEvent {
                t: change.at,
                speed,
                tempo: cur_tempo,
                kind: TransitionKind::TempoChanged,
            });
        } else {
            let region = &regions[ri];
            ri += 1;
            cur_region = Some(region);
            raw.push(RawEvent {
                t: region.begin(),
                speed: region.speed(mode),
                tempo: cur_tempo,
                kind: TransitionKind::RegionBegan,
            });
            let end = region.end();
            raw.push(RawEvent {
                t: end,
                speed: 1.0,
                tempo: tempo_index.effective_tempo(end),
                kind: TransitionKind::RegionEnded,
            });
        }
    }

    // group by exact coordinate, preserving arrival order within each group
    let mut groups: IndexMap<TimeCoord, SmallVec<[RawEvent; 2]>> = IndexMap::new();
    for event in raw {
        groups.entry(event.t).or_default().push(event);
    }
    let mut entries: Vec<(TimeCoord, SmallVec<[RawEvent; 2]>)> = groups.into_iter().collect();
    entries.sort_by_key(|(t, _)| *t);

    entries
        .into_iter()
        .filter_map(|(t, events)| fold_group(t, &events))
        .collect()
}

fn fold_group(t: TimeCoord, events: &[RawEvent]) -> Option<Transition> {
    let (first, rest) = events.split_first()?;
    let mut combined = Transition {
        t,
        speed: first.speed,
        tempo: first.tempo,
        kinds: TransitionKinds::from_kind(first.kind),
    };

    for event in rest {
        combined.kinds = combined.kinds.with_kind(event.kind);
        match event.kind {
            TransitionKind::RegionEnded => {
                // "end here, begin another here" nets to the new region's speed
                if !combined.kinds.contains(TransitionKind::RegionBegan) {
                    combined.speed = event.speed;
                }
            }
            TransitionKind::RegionBegan => combined.speed = event.speed,
            TransitionKind::TempoChanged => combined.tempo = event.tempo,
        }
    }

    (!combined.kinds.is_none()).then_some(combined)
}

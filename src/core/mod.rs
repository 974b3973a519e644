pub mod event;
pub mod interval;
pub mod position;
pub mod region;
pub mod tempo;
pub mod time;
pub mod visible;

pub use event::{Transition, TransitionKind, TransitionKinds, flatten_transitions};
pub use interval::{IntervalIndex, PositionInterval};
pub use position::{Breakpoint, PositionList};
pub use region::{ScrollMode, SpeedRegion};
pub use tempo::{REFERENCE_BPM, TempoChange, TempoIndex};
pub use time::{GRID_RESOLUTION, TimeCoord, TimeDelta};
pub use visible::{VisibleRange, merge_ranges};

//! soflan-rs: scroll-speed timeline cache for rhythm-chart editors.
//!
//! Maintains a piecewise-linear mapping between musical time and a
//! one-dimensional scroll position under tempo changes and authored speed
//! regions (including reverse and frozen segments), and answers per-frame
//! "which time ranges are visible" queries for an arbitrary viewport,
//! walking backward through the mapping when one viewport spans several
//! speed segments.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{SoflanTimeline, ViewQuery};
pub use error::{SoflanError, SoflanResult};

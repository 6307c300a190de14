//! Recomputation of composition graphs.
//!
//! This module holds the recomputation pass, its options and reports, and
//! the progress events a pass emits.

pub mod engine;
pub mod progress;
pub mod timing;

pub use engine::{RecomputeOptions, RecomputeReport, TickReport};
pub use progress::{RecomputeEvent, RecomputeObserver, RecomputeStats, SkipReason};

//! Core data models for match statistics.

mod event;
mod ids;
mod report;
mod stats;

pub use event::*;
pub use ids::*;
pub use report::*;
pub use stats::*;

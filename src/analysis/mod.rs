pub mod analyzer;
pub mod report;

pub use analyzer::{analyze, BoundingBox, TrajectoryAnalysis, DIRECTION_CHANGE_THRESHOLD_DEGREES};

pub mod controller;

pub use controller::{load_and_analyze, RecordingController, RecordingSummary};

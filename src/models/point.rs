use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded cursor sample.
///
/// `timestamp` is fractional seconds since the Unix epoch. Samples of one
/// session are expected in non-decreasing timestamp order, but nothing
/// downstream relies on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    pub timestamp: f64,
}

impl TrajectoryPoint {
    pub fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self { x, y, timestamp }
    }

    pub fn at(position: CursorPosition, time: DateTime<Utc>) -> Self {
        Self {
            x: position.x,
            y: position.y,
            timestamp: epoch_seconds(time),
        }
    }
}

/// Raw on-screen cursor location as reported by a capture source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

fn epoch_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1_000_000.0
}

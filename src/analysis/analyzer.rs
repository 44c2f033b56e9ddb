//! Distance, speed and shape statistics over one recorded session.
//!
//! `analyze` is a pure function of the point slice it is handed. It walks the
//! points in slice order (it never sorts by timestamp) and absorbs odd input
//! instead of rejecting it: non-positive time steps are left out of the speed
//! statistics and zero-length steps never count as a turn.

use serde::{Deserialize, Serialize};

use crate::models::TrajectoryPoint;

/// A step whose heading differs from the previous step's by more than this
/// many degrees counts as a direction change.
pub const DIRECTION_CHANGE_THRESHOLD_DEGREES: f64 = 45.0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryAnalysis {
    /// Sum of the Euclidean lengths of every step.
    pub total_distance: f64,
    /// Mean per-step speed over steps with a positive time delta.
    pub average_speed: f64,
    pub max_speed: f64,
    /// Last timestamp minus first timestamp. Negative if the input runs
    /// backwards in time.
    pub duration: f64,
    pub point_count: usize,
    pub bounding_box: BoundingBox,
    pub direction_changes: usize,
}

/// Heading of a single step.
#[derive(Debug, Clone, Copy)]
struct Heading {
    dx: f64,
    dy: f64,
}

impl Heading {
    fn between(prev: &TrajectoryPoint, curr: &TrajectoryPoint) -> Self {
        Self {
            dx: curr.x - prev.x,
            dy: curr.y - prev.y,
        }
    }

    fn magnitude(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    /// Angle to `other` in degrees, in `[0, 180]`. Zero when either heading
    /// has no length.
    fn angle_to(&self, other: &Heading) -> f64 {
        let mag1 = self.magnitude();
        let mag2 = other.magnitude();
        if !(mag1 > 0.0 && mag2 > 0.0) {
            return 0.0;
        }

        let dot = self.dx * other.dx + self.dy * other.dy;
        let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
        cos_angle.acos() * 180.0 / std::f64::consts::PI
    }
}

pub fn analyze(points: &[TrajectoryPoint]) -> TrajectoryAnalysis {
    // Fewer than two points: no steps. The bounding box is left at zero
    // rather than taken from the lone point.
    if points.len() < 2 {
        return TrajectoryAnalysis {
            point_count: points.len(),
            ..TrajectoryAnalysis::default()
        };
    }

    let mut total_distance = 0.0;
    let mut speeds: Vec<f64> = Vec::with_capacity(points.len() - 1);
    let mut direction_changes = 0;
    let mut last_heading: Option<Heading> = None;

    for pair in points.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        let heading = Heading::between(prev, curr);
        let step_distance = heading.magnitude();
        total_distance += step_distance;

        let time_diff = curr.timestamp - prev.timestamp;
        if time_diff > 0.0 {
            speeds.push(step_distance / time_diff);
        }

        if let Some(last) = last_heading {
            if last.angle_to(&heading) > DIRECTION_CHANGE_THRESHOLD_DEGREES {
                direction_changes += 1;
            }
        }
        last_heading = Some(heading);
    }

    let first = &points[0];
    let last = &points[points.len() - 1];

    TrajectoryAnalysis {
        total_distance,
        average_speed: mean(&speeds),
        max_speed: speeds.iter().copied().reduce(f64::max).unwrap_or(0.0),
        duration: last.timestamp - first.timestamp,
        point_count: points.len(),
        bounding_box: bounding_box(points),
        direction_changes,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn bounding_box(points: &[TrajectoryPoint]) -> BoundingBox {
    let first = &points[0];
    points.iter().skip(1).fold(
        BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        },
        |bounds, p| BoundingBox {
            min_x: bounds.min_x.min(p.x),
            min_y: bounds.min_y.min(p.y),
            max_x: bounds.max_x.max(p.x),
            max_y: bounds.max_y.max(p.y),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, timestamp: f64) -> TrajectoryPoint {
        TrajectoryPoint::new(x, y, timestamp)
    }

    #[test]
    fn empty_input_is_zeroed() {
        let analysis = analyze(&[]);
        assert_eq!(analysis, TrajectoryAnalysis::default());
        assert_eq!(analysis.point_count, 0);
    }

    #[test]
    fn single_point_keeps_zero_bounding_box() {
        let analysis = analyze(&[p(120.0, 80.0, 10.0)]);
        assert_eq!(analysis.point_count, 1);
        assert_eq!(analysis.bounding_box, BoundingBox::default());
        assert_eq!(analysis.total_distance, 0.0);
        assert_eq!(analysis.duration, 0.0);
        assert_eq!(analysis.direction_changes, 0);
    }

    #[test]
    fn three_four_five_step() {
        let analysis = analyze(&[p(0.0, 0.0, 0.0), p(3.0, 4.0, 1.0)]);
        assert_eq!(analysis.total_distance, 5.0);
        assert_eq!(analysis.average_speed, 5.0);
        assert_eq!(analysis.max_speed, 5.0);
        assert_eq!(analysis.duration, 1.0);
        assert_eq!(analysis.point_count, 2);
        assert_eq!(
            analysis.bounding_box,
            BoundingBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 3.0,
                max_y: 4.0
            }
        );
        assert_eq!(analysis.direction_changes, 0);
    }

    #[test]
    fn straight_line_has_no_direction_changes() {
        let analysis = analyze(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0)]);
        assert_eq!(analysis.direction_changes, 0);
    }

    #[test]
    fn right_angle_turn_counts_once() {
        let analysis = analyze(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 2.0)]);
        assert_eq!(analysis.direction_changes, 1);
        assert_eq!(analysis.total_distance, 2.0);
    }

    #[test]
    fn shallow_turn_is_not_counted() {
        // (1,0) then (2,1): roughly 26.6 degrees.
        let analysis = analyze(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(3.0, 1.0, 2.0)]);
        assert_eq!(analysis.direction_changes, 0);
    }

    #[test]
    fn reversal_counts_as_a_change() {
        let analysis = analyze(&[p(0.0, 0.0, 0.0), p(5.0, 0.0, 1.0), p(0.0, 0.0, 2.0)]);
        assert_eq!(analysis.direction_changes, 1);
    }

    #[test]
    fn zero_time_step_counts_for_distance_only() {
        let analysis = analyze(&[
            p(0.0, 0.0, 0.0),
            p(3.0, 4.0, 1.0),
            p(103.0, 4.0, 1.0),
        ]);
        assert_eq!(analysis.total_distance, 105.0);
        assert_eq!(analysis.average_speed, 5.0);
        assert_eq!(analysis.max_speed, 5.0);
    }

    #[test]
    fn no_valid_time_steps_gives_zero_speeds() {
        let analysis = analyze(&[p(0.0, 0.0, 5.0), p(3.0, 4.0, 5.0), p(6.0, 8.0, 4.0)]);
        assert_eq!(analysis.total_distance, 10.0);
        assert_eq!(analysis.average_speed, 0.0);
        assert_eq!(analysis.max_speed, 0.0);
        assert_eq!(analysis.duration, -1.0);
    }

    #[test]
    fn average_is_mean_of_step_speeds() {
        // 10 px in 1 s, then 10 px in 0.5 s.
        let analysis = analyze(&[p(0.0, 0.0, 0.0), p(10.0, 0.0, 1.0), p(20.0, 0.0, 1.5)]);
        assert_eq!(analysis.average_speed, 15.0);
        assert_eq!(analysis.max_speed, 20.0);
    }

    #[test]
    fn stationary_step_does_not_register_a_turn() {
        // The zero-length step yields angle 0 both against the previous and
        // the following heading, because the previous heading is replaced
        // even when no angle could be computed.
        let analysis = analyze(&[
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 0.0, 2.0),
            p(1.0, 1.0, 3.0),
        ]);
        assert_eq!(analysis.direction_changes, 0);
    }

    #[test]
    fn bounding_box_covers_all_points() {
        let analysis = analyze(&[
            p(5.0, -2.0, 0.0),
            p(-3.0, 7.0, 0.0),
            p(9.0, 1.0, 0.0),
            p(0.0, -4.0, 0.0),
        ]);
        assert_eq!(
            analysis.bounding_box,
            BoundingBox {
                min_x: -3.0,
                min_y: -4.0,
                max_x: 9.0,
                max_y: 7.0
            }
        );
    }

    #[test]
    fn duration_uses_index_order() {
        let analysis = analyze(&[p(0.0, 0.0, 10.0), p(1.0, 0.0, 12.0), p(2.0, 0.0, 4.0)]);
        assert_eq!(analysis.duration, -6.0);
    }

    #[test]
    fn nan_coordinates_propagate() {
        let analysis = analyze(&[p(0.0, 0.0, 0.0), p(f64::NAN, 0.0, 1.0)]);
        assert!(analysis.total_distance.is_nan());
        assert_eq!(analysis.point_count, 2);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let points: Vec<TrajectoryPoint> = (0..50)
            .map(|i| {
                let t = i as f64 * 0.016;
                p((t * 7.0).sin() * 100.0, (t * 3.0).cos() * 80.0, t)
            })
            .collect();
        assert_eq!(analyze(&points), analyze(&points));
    }
}

//! Property tests for the trajectory analyzer.

use mousetrail_lib::{analyze, TrajectoryPoint};
use proptest::prelude::*;

fn point() -> impl Strategy<Value = TrajectoryPoint> {
    (-5_000.0..5_000.0f64, -5_000.0..5_000.0f64, 0.0..1_000.0f64)
        .prop_map(|(x, y, timestamp)| TrajectoryPoint::new(x, y, timestamp))
}

fn sorted_path() -> impl Strategy<Value = Vec<TrajectoryPoint>> {
    prop::collection::vec(point(), 2..64).prop_map(|mut points| {
        points.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        points
    })
}

proptest! {
    #[test]
    fn analysis_is_deterministic(points in prop::collection::vec(point(), 0..64)) {
        prop_assert_eq!(analyze(&points), analyze(&points));
    }

    #[test]
    fn point_count_matches_input(points in prop::collection::vec(point(), 0..64)) {
        prop_assert_eq!(analyze(&points).point_count, points.len());
    }

    #[test]
    fn bounding_box_is_exact(points in prop::collection::vec(point(), 2..64)) {
        let bounds = analyze(&points).bounding_box;
        let all_inside = points.iter().all(|p| {
            p.x >= bounds.min_x && p.x <= bounds.max_x && p.y >= bounds.min_y && p.y <= bounds.max_y
        });
        let touches_min_x = points.iter().any(|p| p.x == bounds.min_x);
        let touches_max_x = points.iter().any(|p| p.x == bounds.max_x);
        let touches_min_y = points.iter().any(|p| p.y == bounds.min_y);
        let touches_max_y = points.iter().any(|p| p.y == bounds.max_y);
        prop_assert!(all_inside);
        prop_assert!(touches_min_x && touches_max_x);
        prop_assert!(touches_min_y && touches_max_y);
    }

    #[test]
    fn path_is_at_least_as_long_as_displacement(points in sorted_path()) {
        let analysis = analyze(&points);
        let first = points[0];
        let last = points[points.len() - 1];
        let displacement = ((last.x - first.x).powi(2) + (last.y - first.y).powi(2)).sqrt();
        prop_assert!(analysis.total_distance + 1e-6 >= displacement);
    }

    #[test]
    fn speed_statistics_are_consistent(points in sorted_path()) {
        let analysis = analyze(&points);
        prop_assert!(analysis.max_speed >= 0.0);
        prop_assert!(analysis.average_speed <= analysis.max_speed * (1.0 + 1e-12));
        prop_assert!(analysis.duration >= 0.0);
    }

    #[test]
    fn direction_changes_are_bounded_by_turns(points in prop::collection::vec(point(), 2..64)) {
        prop_assert!(analyze(&points).direction_changes <= points.len() - 2);
    }
}

use std::fmt;

use super::analyzer::TrajectoryAnalysis;

impl fmt::Display for TrajectoryAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bounds = &self.bounding_box;
        writeln!(f, "Trajectory analysis")?;
        writeln!(f, "  Total distance:     {:.2} px", self.total_distance)?;
        writeln!(f, "  Average speed:      {:.2} px/s", self.average_speed)?;
        writeln!(f, "  Max speed:          {:.2} px/s", self.max_speed)?;
        writeln!(f, "  Duration:           {:.2} s", self.duration)?;
        writeln!(f, "  Points:             {}", self.point_count)?;
        writeln!(f, "  Direction changes:  {}", self.direction_changes)?;
        write!(
            f,
            "  Bounding box:       ({:.0}, {:.0}) - ({:.0}, {:.0})",
            bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::analyze;
    use crate::models::TrajectoryPoint;

    #[test]
    fn renders_every_field() {
        let analysis = analyze(&[
            TrajectoryPoint::new(0.0, 0.0, 0.0),
            TrajectoryPoint::new(3.0, 4.0, 1.0),
        ]);
        let text = analysis.to_string();

        assert!(text.contains("Total distance:     5.00 px"));
        assert!(text.contains("Average speed:      5.00 px/s"));
        assert!(text.contains("Max speed:          5.00 px/s"));
        assert!(text.contains("Duration:           1.00 s"));
        assert!(text.contains("Points:             2"));
        assert!(text.contains("Direction changes:  0"));
        assert!(text.ends_with("Bounding box:       (0, 0) - (3, 4)"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let analysis = analyze(&[]);
        let json = serde_json::to_value(analysis).unwrap();
        assert_eq!(json["pointCount"], 0);
        assert_eq!(json["boundingBox"]["maxY"], 0.0);
        assert_eq!(json["directionChanges"], 0);
    }
}

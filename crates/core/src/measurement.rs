//! Recorded measurements
//!
//! A measurement is a drawn segment plus the real distance it had when it
//! was created. The distance is stored in the calibration unit and is never
//! re-derived from the points, so rescaling the canvas cannot change it.

use crate::geometry::{midpoint, Point};
use crate::settings::StyleOverride;
use crate::units::{convert, LinearUnit};
use crate::zoom::Rescale;
use serde::{Deserialize, Serialize};

/// A measured segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Start and end in canvas pixels at the current zoom
    pub points: [Point; 2],
    /// Real distance in the calibration unit
    pub distance: f64,
    /// Style pinned at creation plus later customisation; unset fields
    /// follow the global settings
    #[serde(default, skip_serializing_if = "StyleOverride::is_empty")]
    pub style: StyleOverride,
}

impl Measurement {
    pub fn new(start: Point, end: Point, distance: f64) -> Self {
        Self {
            points: [start, end],
            distance,
            style: StyleOverride::default(),
        }
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[1]
    }

    /// Where the distance label is anchored
    pub fn label_anchor(&self) -> Point {
        midpoint(self.start(), self.end())
    }

    pub fn distance_in(&self, calibration_unit: LinearUnit, display_unit: LinearUnit) -> f64 {
        convert(self.distance, calibration_unit, display_unit)
    }

    /// Label text shown next to the segment
    pub fn label(&self, calibration_unit: LinearUnit, display_unit: LinearUnit) -> String {
        format!("{:.2} {}", self.distance_in(calibration_unit, display_unit), display_unit)
    }
}

impl Rescale for Measurement {
    fn rescale(&mut self, factor: f64) {
        self.points.rescale(factor);
    }
}

/// Sum of stored distances, converted to `display_unit` once
pub fn total_distance(
    measurements: &[Measurement],
    calibration_unit: LinearUnit,
    display_unit: LinearUnit,
) -> f64 {
    let total: f64 = measurements.iter().map(|m| m.distance).sum();
    convert(total, calibration_unit, display_unit)
}

/// Plain-text listing of every measurement and the total
pub fn summary_text(
    measurements: &[Measurement],
    calibration_unit: LinearUnit,
    display_unit: LinearUnit,
) -> String {
    if measurements.is_empty() {
        return "No measurements yet.\n".to_owned();
    }

    let rule = "-".repeat(40);
    let mut text = format!("All measurements in {display_unit}:\n{rule}\n");
    for (i, measurement) in measurements.iter().enumerate() {
        let distance = measurement.distance_in(calibration_unit, display_unit);
        text.push_str(&format!("{}. {distance:.3} {display_unit}\n", i + 1));
    }
    let total = total_distance(measurements, calibration_unit, display_unit);
    text.push_str(&format!("{rule}\nTotal: {total:.3} {display_unit}\n"));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Vec<Measurement> {
        vec![
            Measurement::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 1.0),
            Measurement::new(Point::new(0.0, 10.0), Point::new(0.0, 260.0), 2.5),
        ]
    }

    #[test]
    fn test_label_uses_display_unit() {
        let measurement = Measurement::new(Point::new(0.0, 0.0), Point::new(40.0, 30.0), 3.0);
        assert_eq!(measurement.label(LinearUnit::Meters, LinearUnit::Meters), "3.00 meters");
        assert_eq!(measurement.label(LinearUnit::Meters, LinearUnit::Centimeters), "300.00 centimeters");
        assert_eq!(measurement.label_anchor(), Point::new(20.0, 15.0));
    }

    #[test]
    fn test_rescale_moves_points_not_distance() {
        let mut measurement = Measurement::new(Point::new(100.0, 200.0), Point::new(400.0, 200.0), 3.0);
        measurement.rescale(2.0);
        assert_eq!(measurement.points, [Point::new(200.0, 400.0), Point::new(800.0, 400.0)]);
        assert_eq!(measurement.distance, 3.0);
    }

    #[test]
    fn test_total_distance_converts_once() {
        let total = total_distance(&sample(), LinearUnit::Meters, LinearUnit::Feet);
        assert_relative_eq!(total, 3.5 / 0.3048, max_relative = 1e-12);
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(summary_text(&[], LinearUnit::Meters, LinearUnit::Meters), "No measurements yet.\n");

        let text = summary_text(&sample(), LinearUnit::Meters, LinearUnit::Centimeters);
        assert!(text.starts_with("All measurements in centimeters:\n"));
        assert!(text.contains("1. 100.000 centimeters\n"));
        assert!(text.contains("2. 250.000 centimeters\n"));
        assert!(text.ends_with("Total: 350.000 centimeters\n"));
    }

    #[test]
    fn test_default_style_is_not_serialized() {
        let json = serde_json::to_value(&sample()[0]).expect("measurement serializes");
        assert!(json.get("style").is_none());
    }
}

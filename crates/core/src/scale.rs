//! Calibration and the pixel/real-world scale model
//!
//! A calibration ties a drawn pixel segment to a known real distance. The
//! scale is stored normalized to zoom 1.0 (`base_scale_factor`) so it never
//! changes when the canvas is rescaled; the effective scale at any zoom is
//! derived on demand.

use crate::geometry::{euclidean, Point};
use crate::units::LinearUnit;
use crate::zoom::Rescale;
use serde::{Deserialize, Serialize};

/// Error types for calibration confirmation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("reference distance is not a number: {0:?}")]
    NotANumber(String),

    #[error("reference distance must be positive, got {0}")]
    NotPositive(f64),
}

pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Parse user-entered reference distance text
pub fn parse_reference_distance(text: &str) -> CalibrationResult<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| CalibrationError::NotANumber(text.to_owned()))?;
    validate_reference_distance(value)
}

fn validate_reference_distance(value: f64) -> CalibrationResult<f64> {
    // NaN fails the comparison too
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(CalibrationError::NotPositive(value))
    }
}

/// A confirmed pixels-per-unit scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedScale {
    /// Known real distance of the calibration segment
    pub reference_distance: f64,
    /// Unit the reference distance (and every measurement) is expressed in
    pub unit: LinearUnit,
    /// Pixels per unit at the zoom level active during confirmation
    pub scale_factor: f64,
    /// Pixels per unit at zoom 1.0
    pub base_scale_factor: f64,
    /// Zoom level active during confirmation
    pub zoom_level: f64,
}

impl ConfirmedScale {
    /// Pixels per unit at `zoom_level`
    pub fn current_scale_factor(&self, zoom_level: f64) -> f64 {
        self.base_scale_factor * zoom_level
    }

    /// Effective scale, or `None` when it cannot be divided by
    pub fn usable_scale_factor(&self, zoom_level: f64) -> Option<f64> {
        let scale = self.current_scale_factor(zoom_level);
        (scale > 0.0 && scale.is_finite()).then_some(scale)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.base_scale_factor > 0.0 && self.base_scale_factor.is_finite())
    }
}

/// Compute a scale from two canvas points and the distance between them
///
/// Coincident points are accepted and produce a zero scale; every later
/// conversion through it yields 0.
pub fn confirm_calibration(
    p1: Point,
    p2: Point,
    reference_distance: f64,
    unit: LinearUnit,
    zoom_level: f64,
) -> CalibrationResult<ConfirmedScale> {
    let reference_distance = validate_reference_distance(reference_distance)?;
    let pixel_distance = euclidean(p1, p2);
    let scale_factor = pixel_distance / reference_distance;
    let base_scale_factor = if zoom_level > 0.0 {
        scale_factor / zoom_level
    } else {
        0.0
    };

    if pixel_distance == 0.0 {
        log::warn!("calibration points coincide, all distances will read as 0");
    }

    Ok(ConfirmedScale {
        reference_distance,
        unit,
        scale_factor,
        base_scale_factor,
        zoom_level,
    })
}

/// Calibration state: zero or two drawn points plus an optional confirmed scale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    points: Option<[Point; 2]>,
    scale: Option<ConfirmedScale>,
}

impl Calibration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the two drawn points and confirm them in one step
    ///
    /// On failure the calibration is left empty.
    pub fn confirm(
        &mut self,
        p1: Point,
        p2: Point,
        reference_distance: f64,
        unit: LinearUnit,
        zoom_level: f64,
    ) -> CalibrationResult<&ConfirmedScale> {
        match confirm_calibration(p1, p2, reference_distance, unit, zoom_level) {
            Ok(scale) => {
                log::info!(
                    "calibrated {reference_distance} {unit} at zoom {zoom_level}: {:.4} px/{}",
                    scale.base_scale_factor,
                    unit.abbreviation()
                );
                self.points = Some([p1, p2]);
                Ok(&*self.scale.insert(scale))
            }
            Err(err) => {
                self.clear();
                Err(err)
            }
        }
    }

    pub fn clear(&mut self) {
        self.points = None;
        self.scale = None;
    }

    pub fn is_confirmed(&self) -> bool {
        self.scale.is_some()
    }

    pub fn points(&self) -> Option<[Point; 2]> {
        self.points
    }

    pub fn scale(&self) -> Option<&ConfirmedScale> {
        self.scale.as_ref()
    }

    pub fn unit(&self) -> Option<LinearUnit> {
        self.scale.map(|s| s.unit)
    }

    pub fn base_scale_factor(&self) -> Option<f64> {
        self.scale.map(|s| s.base_scale_factor)
    }

    pub fn current_scale_factor(&self, zoom_level: f64) -> Option<f64> {
        self.scale.map(|s| s.current_scale_factor(zoom_level))
    }

    /// Convert a canvas pixel length to a real distance in the calibration unit
    pub fn pixel_to_real(&self, pixel_distance: f64, zoom_level: f64) -> f64 {
        self.scale
            .and_then(|s| s.usable_scale_factor(zoom_level))
            .map_or(0.0, |scale| pixel_distance / scale)
    }

    /// Convert a real distance in the calibration unit to canvas pixels
    pub fn real_to_pixel(&self, real_distance: f64, zoom_level: f64) -> f64 {
        self.scale
            .map_or(0.0, |s| real_distance * s.current_scale_factor(zoom_level))
    }

    /// Real-world offset of a canvas point from the canvas origin on each axis
    pub fn pixel_point_to_real(&self, point: Point, zoom_level: f64) -> Option<(f64, f64)> {
        let scale = self.scale?.usable_scale_factor(zoom_level)?;
        Some((point.x / scale, point.y / scale))
    }

    pub fn status_text(&self) -> String {
        match &self.scale {
            Some(scale) => format!("Calibrated: {} {}", scale.reference_distance, scale.unit),
            None => "Not calibrated".to_owned(),
        }
    }
}

/// Moves the drawn calibration line; the confirmed scale is zoom-independent
impl Rescale for Calibration {
    fn rescale(&mut self, factor: f64) {
        if let Some(points) = self.points.as_mut() {
            points.rescale(factor);
        }
    }
}

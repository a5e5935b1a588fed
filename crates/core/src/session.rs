//! Calibration and measurement session
//!
//! [`MeasurementSession`] owns everything a user builds on top of one loaded
//! image: the calibration, the ordered list of measurements, the pending
//! click, the zoom level and the current selection. Clicks are sequenced by
//! an explicit state enum, so at most one point can ever be pending.

use crate::geometry::{euclidean, first_hit, snap_to_axis, Point};
use crate::measurement::Measurement;
use crate::scale::{parse_reference_distance, Calibration, CalibrationError, ConfirmedScale};
use crate::settings::StyleOverride;
use crate::units::LinearUnit;
use crate::zoom::{anchored_scroll, ImageFrame, Rescale, ZoomConfig, ZoomDirection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no image loaded")]
    NoImage,

    #[error("invalid calibration input: {0}")]
    InvalidCalibrationInput(#[from] CalibrationError),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Calibrating,
    Measuring,
}

/// Click sequencing state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickState {
    Calibrating { pending: Option<Point> },
    Measuring { pending: Option<Point> },
}

impl ClickState {
    pub fn mode(&self) -> Mode {
        match self {
            ClickState::Calibrating { .. } => Mode::Calibrating,
            ClickState::Measuring { .. } => Mode::Measuring,
        }
    }

    pub fn pending(&self) -> Option<Point> {
        match *self {
            ClickState::Calibrating { pending } | ClickState::Measuring { pending } => pending,
        }
    }

    fn pending_mut(&mut self) -> &mut Option<Point> {
        match self {
            ClickState::Calibrating { pending } | ClickState::Measuring { pending } => pending,
        }
    }
}

impl Default for ClickState {
    fn default() -> Self {
        ClickState::Calibrating { pending: None }
    }
}

/// Reference distance as typed by the user, parsed when calibration confirms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInput {
    pub reference_text: String,
    pub unit: LinearUnit,
}

impl Default for CalibrationInput {
    fn default() -> Self {
        Self {
            reference_text: "1.0".to_owned(),
            unit: LinearUnit::Meters,
        }
    }
}

/// What a click did
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// First point of a segment is now pending
    PointRecorded(Point),
    Calibrated(ConfirmedScale),
    MeasurementAdded { index: usize, distance: f64 },
}

/// Rubber-band segment from the pending point to the cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub start: Point,
    pub end: Point,
    pub snapped: bool,
}

/// Owned copy of the session state handed to exporters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub frame: Option<ImageFrame>,
    pub zoom_level: f64,
    pub mode: Mode,
    pub calibration: Calibration,
    pub measurements: Vec<Measurement>,
}

impl SessionSnapshot {
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom_level * 100.0).round() as u32
    }

    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.frame.map(|frame| frame.display_size(self.zoom_level))
    }

    /// Unit the stored distances are in; meters before calibration
    pub fn calibration_unit(&self) -> LinearUnit {
        self.calibration.unit().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct MeasurementSession {
    frame: Option<ImageFrame>,
    zoom_config: ZoomConfig,
    zoom_level: f64,
    state: ClickState,
    input: CalibrationInput,
    calibration: Calibration,
    measurements: Vec<Measurement>,
    selected: Option<usize>,
    new_measurement_style: StyleOverride,
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementSession {
    pub fn new() -> Self {
        Self::with_zoom_config(ZoomConfig::default())
    }

    pub fn with_zoom_config(zoom_config: ZoomConfig) -> Self {
        Self {
            frame: None,
            zoom_config,
            zoom_level: 1.0,
            state: ClickState::default(),
            input: CalibrationInput::default(),
            calibration: Calibration::new(),
            measurements: Vec::new(),
            selected: None,
            new_measurement_style: StyleOverride::default(),
        }
    }

    /// Install a freshly decoded image, discarding all work on the previous one
    pub fn load_image(&mut self, frame: ImageFrame) {
        log::debug!(
            "loaded {}x{} image, base scale {:.4}",
            frame.width,
            frame.height,
            frame.base_scale
        );
        self.frame = Some(frame);
        self.zoom_level = 1.0;
        self.reset_calibration();
    }

    pub fn frame(&self) -> Option<&ImageFrame> {
        self.frame.as_ref()
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn zoom_config(&self) -> &ZoomConfig {
        &self.zoom_config
    }

    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.frame.map(|frame| frame.display_size(self.zoom_level))
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    pub fn pending(&self) -> Option<Point> {
        self.state.pending()
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn calibration_input(&self) -> &CalibrationInput {
        &self.input
    }

    pub fn set_calibration_input(&mut self, reference_text: impl Into<String>, unit: LinearUnit) {
        self.input = CalibrationInput {
            reference_text: reference_text.into(),
            unit,
        };
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Style copied onto every measurement added from now on
    pub fn set_new_measurement_style(&mut self, style: StyleOverride) {
        self.new_measurement_style = style;
    }

    pub fn new_measurement_style(&self) -> StyleOverride {
        self.new_measurement_style
    }

    /// Feed one click at canvas position `point`
    ///
    /// With `snap` set and a point pending, the click is constrained to the
    /// horizontal or vertical axis through the pending point.
    pub fn click(&mut self, point: Point, snap: bool) -> SessionResult<ClickOutcome> {
        if self.frame.is_none() {
            return Err(SessionError::NoImage);
        }

        let point = match (snap, self.state.pending()) {
            (true, Some(start)) => snap_to_axis(start, point),
            _ => point,
        };

        match self.state {
            ClickState::Calibrating { pending: None } | ClickState::Measuring { pending: None } => {
                *self.state.pending_mut() = Some(point);
                log::debug!("{:?}: first point at ({:.1}, {:.1})", self.mode(), point.x, point.y);
                Ok(ClickOutcome::PointRecorded(point))
            }
            ClickState::Calibrating { pending: Some(start) } => self.finish_calibration(start, point),
            ClickState::Measuring { pending: Some(start) } => Ok(self.finish_measurement(start, point)),
        }
    }

    fn finish_calibration(&mut self, start: Point, end: Point) -> SessionResult<ClickOutcome> {
        self.state = ClickState::Calibrating { pending: None };

        let confirmed = parse_reference_distance(&self.input.reference_text).and_then(|reference| {
            self.calibration
                .confirm(start, end, reference, self.input.unit, self.zoom_level)
                .copied()
        });

        match confirmed {
            Ok(scale) => {
                self.state = ClickState::Measuring { pending: None };
                Ok(ClickOutcome::Calibrated(scale))
            }
            Err(err) => {
                log::warn!("calibration rejected: {err}");
                self.calibration.clear();
                Err(err.into())
            }
        }
    }

    fn finish_measurement(&mut self, start: Point, end: Point) -> ClickOutcome {
        let distance = self.calibration.pixel_to_real(euclidean(start, end), self.zoom_level);
        let mut measurement = Measurement::new(start, end, distance);
        measurement.style = self.new_measurement_style;
        self.measurements.push(measurement);
        self.state = ClickState::Measuring { pending: None };
        self.selected = None;

        let index = self.measurements.len() - 1;
        log::debug!("measurement {} added: {distance:.3}", index + 1);
        ClickOutcome::MeasurementAdded { index, distance }
    }

    /// Segment to draw while a point is pending
    pub fn preview(&self, cursor: Point, snap: bool) -> Option<Preview> {
        let start = self.state.pending()?;
        let end = if snap { snap_to_axis(start, cursor) } else { cursor };
        Some(Preview { start, end, snapped: snap })
    }

    /// Drop the pending point, if any
    pub fn cancel(&mut self) -> bool {
        self.state.pending_mut().take().is_some()
    }

    /// Remove the most recent measurement
    pub fn undo(&mut self) -> Option<Measurement> {
        let removed = self.measurements.pop()?;
        self.selected = None;
        log::debug!("undo removed measurement {}", self.measurements.len() + 1);
        Some(removed)
    }

    pub fn reset_calibration(&mut self) {
        self.calibration.clear();
        self.measurements.clear();
        self.state = ClickState::Calibrating { pending: None };
        self.selected = None;
    }

    /// Remove every measurement but keep the calibration
    pub fn clear_measurements(&mut self) {
        self.measurements.clear();
        *self.state.pending_mut() = None;
        self.selected = None;
    }

    pub fn delete_measurement(&mut self, index: usize) -> bool {
        if index >= self.measurements.len() {
            return false;
        }
        self.measurements.remove(index);
        self.selected = None;
        true
    }

    /// Hit-test `point` against the measurements and remember the result
    pub fn select_at(&mut self, point: Point) -> Option<usize> {
        self.selected = first_hit(point, self.measurements.iter().map(|m| (m.start(), m.end())));
        self.selected
    }

    pub fn customize_measurement(&mut self, index: usize, style: StyleOverride) -> bool {
        match self.measurements.get_mut(index) {
            Some(measurement) => {
                measurement.style = measurement.style.merged(style);
                true
            }
            None => false,
        }
    }

    /// Change the zoom level, rescaling every stored point
    ///
    /// Returns the factor applied, or `None` when nothing changed.
    pub fn set_zoom(&mut self, zoom_level: f64) -> Option<f64> {
        self.frame?;
        let new_level = self.zoom_config.clamp(zoom_level);
        if new_level == self.zoom_level || !new_level.is_finite() {
            return None;
        }

        let factor = new_level / self.zoom_level;
        self.calibration.rescale(factor);
        self.state.pending_mut().rescale(factor);
        self.measurements.rescale(factor);
        log::debug!("zoom {:.2} -> {:.2}", self.zoom_level, new_level);
        self.zoom_level = new_level;
        Some(factor)
    }

    pub fn zoom_in(&mut self) -> Option<f64> {
        self.set_zoom(self.zoom_config.stepped(self.zoom_level, ZoomDirection::In))
    }

    pub fn zoom_out(&mut self) -> Option<f64> {
        self.set_zoom(self.zoom_config.stepped(self.zoom_level, ZoomDirection::Out))
    }

    pub fn reset_zoom(&mut self) -> Option<f64> {
        self.set_zoom(1.0)
    }

    /// Step the zoom towards the pointer
    ///
    /// `pointer` is the pointer position inside the window and `scroll` the
    /// current scroll offset. Returns the scroll offset that keeps the canvas
    /// pixel under the pointer in place, or `None` when the zoom did not change.
    pub fn wheel_zoom(&mut self, direction: ZoomDirection, pointer: Point, scroll: Point) -> Option<Point> {
        let target = self.zoom_config.stepped(self.zoom_level, direction);
        let factor = self.set_zoom(target)?;
        Some(Point::new(
            anchored_scroll(scroll.x, pointer.x, factor),
            anchored_scroll(scroll.y, pointer.y, factor),
        ))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            frame: self.frame,
            zoom_level: self.zoom_level,
            mode: self.mode(),
            calibration: self.calibration.clone(),
            measurements: self.measurements.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Color, DisplaySettings};
    use approx::assert_relative_eq;

    fn loaded_session() -> MeasurementSession {
        let mut session = MeasurementSession::new();
        session.load_image(ImageFrame::fit(1000, 800, Some((1200, 900))));
        session
    }

    fn calibrated_session() -> MeasurementSession {
        let mut session = loaded_session();
        session.set_calibration_input("2.0", LinearUnit::Meters);
        session.click(Point::new(100.0, 100.0), false).expect("first calibration click");
        session.click(Point::new(300.0, 100.0), false).expect("calibration should confirm");
        session
    }

    #[test]
    fn test_end_to_end_calibrate_measure_zoom_undo() {
        let mut session = calibrated_session();
        assert_eq!(session.mode(), Mode::Measuring);
        assert_eq!(session.calibration().base_scale_factor(), Some(100.0));

        session.click(Point::new(100.0, 200.0), false).expect("first click");
        let outcome = session.click(Point::new(400.0, 200.0), false).expect("second click");
        assert_eq!(outcome, ClickOutcome::MeasurementAdded { index: 0, distance: 3.0 });

        session.set_zoom(2.0);
        let measurement = &session.measurements()[0];
        assert_eq!(measurement.points, [Point::new(200.0, 400.0), Point::new(800.0, 400.0)]);
        assert_eq!(measurement.distance, 3.0);

        let calibration_before = session.calibration().clone();
        assert!(session.undo().is_some());
        assert!(session.measurements().is_empty());
        assert_eq!(session.calibration(), &calibration_before);
        assert_eq!(session.mode(), Mode::Measuring);
    }

    #[test]
    fn test_click_without_image_is_rejected() {
        let mut session = MeasurementSession::new();
        assert_eq!(session.click(Point::new(1.0, 1.0), false), Err(SessionError::NoImage));
        assert_eq!(session.pending(), None);
        assert_eq!(session.set_zoom(2.0), None);
        assert_eq!(session.zoom_level(), 1.0);
    }

    #[test]
    fn test_invalid_reference_resets_calibration() {
        let mut session = loaded_session();
        session.set_calibration_input("abc", LinearUnit::Feet);
        session.click(Point::new(0.0, 0.0), false).expect("first click");

        let result = session.click(Point::new(50.0, 0.0), false);
        assert!(matches!(
            result,
            Err(SessionError::InvalidCalibrationInput(CalibrationError::NotANumber(_)))
        ));
        assert_eq!(session.mode(), Mode::Calibrating);
        assert_eq!(session.pending(), None);
        assert_eq!(session.calibration().points(), None);
        assert!(!session.calibration().is_confirmed());

        session.set_calibration_input("-2", LinearUnit::Feet);
        session.click(Point::new(0.0, 0.0), false).expect("first click");
        assert!(session.click(Point::new(50.0, 0.0), false).is_err());
        assert_eq!(session.mode(), Mode::Calibrating);
    }

    #[test]
    fn test_single_click_never_adds_measurement() {
        let mut session = calibrated_session();
        let outcome = session.click(Point::new(10.0, 10.0), false).expect("click");
        assert_eq!(outcome, ClickOutcome::PointRecorded(Point::new(10.0, 10.0)));
        assert!(session.measurements().is_empty());

        session.click(Point::new(10.0, 60.0), false).expect("click");
        assert_eq!(session.measurements().len(), 1);
        assert_eq!(session.pending(), None);
    }

    #[test]
    fn test_snap_applies_to_second_point_only() {
        let mut session = calibrated_session();
        session.click(Point::new(100.0, 100.0), true).expect("click");
        assert_eq!(session.pending(), Some(Point::new(100.0, 100.0)));

        session.click(Point::new(400.0, 130.0), true).expect("click");
        let measurement = &session.measurements()[0];
        assert_eq!(measurement.end(), Point::new(400.0, 100.0));
        assert_relative_eq!(measurement.distance, 3.0);
    }

    #[test]
    fn test_preview_follows_cursor() {
        let mut session = calibrated_session();
        assert_eq!(session.preview(Point::new(5.0, 5.0), false), None);

        session.click(Point::new(0.0, 0.0), false).expect("click");
        let preview = session.preview(Point::new(30.0, 10.0), true).expect("pending preview");
        assert_eq!(preview.end, Point::new(30.0, 0.0));
        assert!(preview.snapped);
    }

    #[test]
    fn test_cancel_discards_pending_only() {
        let mut session = calibrated_session();
        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(0.0, 100.0), false).expect("click");
        session.click(Point::new(5.0, 5.0), false).expect("click");

        assert!(session.cancel());
        assert!(!session.cancel());
        assert_eq!(session.mode(), Mode::Measuring);
        assert_eq!(session.measurements().len(), 1);
        assert!(session.calibration().is_confirmed());
    }

    #[test]
    fn test_cancel_during_calibration() {
        let mut session = loaded_session();
        session.click(Point::new(3.0, 3.0), false).expect("click");
        assert!(session.cancel());
        assert_eq!(session.mode(), Mode::Calibrating);
        assert!(!session.calibration().is_confirmed());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut session = calibrated_session();
        assert_eq!(session.undo(), None);
        assert!(session.calibration().is_confirmed());
    }

    #[test]
    fn test_reset_calibration_clears_everything() {
        let mut session = calibrated_session();
        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(0.0, 100.0), false).expect("click");
        session.click(Point::new(9.0, 9.0), false).expect("click");

        session.reset_calibration();
        assert_eq!(session.mode(), Mode::Calibrating);
        assert_eq!(session.pending(), None);
        assert!(session.measurements().is_empty());
        assert_eq!(session.calibration().status_text(), "Not calibrated");
    }

    #[test]
    fn test_clear_measurements_keeps_calibration() {
        let mut session = calibrated_session();
        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(0.0, 100.0), false).expect("click");
        session.click(Point::new(9.0, 9.0), false).expect("click");

        session.clear_measurements();
        assert!(session.measurements().is_empty());
        assert_eq!(session.pending(), None);
        assert_eq!(session.mode(), Mode::Measuring);
        assert!(session.calibration().is_confirmed());
    }

    #[test]
    fn test_zoom_round_trip_keeps_calibration_distance() {
        let mut session = calibrated_session();
        for level in [2.0, 0.3, 7.5, 0.1, 4.2] {
            session.set_zoom(level);
        }

        let [p0, p1] = session.calibration().points().expect("calibration points");
        let measured = session.calibration().pixel_to_real(euclidean(p0, p1), session.zoom_level());
        assert_relative_eq!(measured, 2.0, max_relative = 1e-9);
    }

    #[test]
    fn test_calibration_at_non_unit_zoom() {
        let mut session = loaded_session();
        session.set_zoom(2.0);
        session.set_calibration_input("4", LinearUnit::Feet);
        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(0.0, 800.0), false).expect("calibration should confirm");
        assert_eq!(session.calibration().base_scale_factor(), Some(100.0));

        session.reset_zoom();
        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(100.0, 0.0), false).expect("click");
        assert_relative_eq!(session.measurements()[0].distance, 1.0);
    }

    #[test]
    fn test_measurement_distance_survives_zoom_round_trip() {
        let mut session = calibrated_session();
        session.click(Point::new(10.0, 10.0), false).expect("click");
        session.click(Point::new(130.0, 170.0), false).expect("click");
        let original = session.measurements()[0].clone();

        session.set_zoom(3.7);
        session.set_zoom(0.4);
        session.set_zoom(1.0);
        let after = &session.measurements()[0];
        assert_eq!(after.distance, original.distance);
        assert_relative_eq!(after.start().x, original.start().x, epsilon = 1e-9);
        assert_relative_eq!(after.end().y, original.end().y, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_rescales_pending_point_and_clamps() {
        let mut session = calibrated_session();
        session.click(Point::new(50.0, 20.0), false).expect("click");

        assert_eq!(session.set_zoom(50.0), Some(10.0));
        assert_eq!(session.zoom_level(), 10.0);
        assert_eq!(session.pending(), Some(Point::new(500.0, 200.0)));
        assert_eq!(session.set_zoom(12.0), None);
    }

    #[test]
    fn test_zoom_steps() {
        let mut session = loaded_session();
        session.zoom_in();
        session.zoom_in();
        assert_eq!(session.zoom_level(), 1.2);
        session.zoom_out();
        assert_eq!(session.zoom_level(), 1.1);
        session.reset_zoom();
        assert_eq!(session.zoom_level(), 1.0);
        assert_eq!(session.reset_zoom(), None);
    }

    #[test]
    fn test_wheel_zoom_keeps_anchor_real_coordinate() {
        let mut session = calibrated_session();
        let pointer = Point::new(240.0, 180.0);
        let scroll = Point::new(60.0, 20.0);
        let anchor = Point::new(scroll.x + pointer.x, scroll.y + pointer.y);
        let before = session
            .calibration()
            .pixel_point_to_real(anchor, session.zoom_level())
            .expect("calibrated readout");

        let new_scroll = session
            .wheel_zoom(ZoomDirection::In, pointer, scroll)
            .expect("zoom changed");
        let new_anchor = Point::new(new_scroll.x + pointer.x, new_scroll.y + pointer.y);
        let after = session
            .calibration()
            .pixel_point_to_real(new_anchor, session.zoom_level())
            .expect("calibrated readout");

        assert_relative_eq!(before.0, after.0, epsilon = 1e-9);
        assert_relative_eq!(before.1, after.1, epsilon = 1e-9);
    }

    #[test]
    fn test_wheel_zoom_at_limit_does_nothing() {
        let mut session = loaded_session();
        session.set_zoom(0.1);
        assert_eq!(session.wheel_zoom(ZoomDirection::Out, Point::ORIGIN, Point::ORIGIN), None);
    }

    #[test]
    fn test_select_delete_and_customize() {
        let mut session = calibrated_session();
        session.click(Point::new(0.0, 50.0), false).expect("click");
        session.click(Point::new(200.0, 50.0), false).expect("click");
        session.click(Point::new(0.0, 56.0), false).expect("click");
        session.click(Point::new(200.0, 56.0), false).expect("click");

        assert_eq!(session.select_at(Point::new(100.0, 55.0)), Some(0));
        assert_eq!(session.selected(), Some(0));
        assert_eq!(session.select_at(Point::new(100.0, 64.0)), Some(1));
        assert_eq!(session.select_at(Point::new(100.0, 300.0)), None);

        let style = StyleOverride { line_color: Some(Color::GREEN), ..Default::default() };
        assert!(session.customize_measurement(1, style));
        assert!(!session.customize_measurement(9, style));
        assert_eq!(session.measurements()[1].style.line_color, Some(Color::GREEN));

        assert!(!session.delete_measurement(5));
        assert!(session.delete_measurement(0));
        assert_eq!(session.measurements().len(), 1);
        assert_eq!(session.measurements()[0].style.line_color, Some(Color::GREEN));
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_load_image_resets_session() {
        let mut session = calibrated_session();
        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(0.0, 100.0), false).expect("click");
        session.set_zoom(3.0);

        session.load_image(ImageFrame::fit(640, 480, None));
        assert_eq!(session.zoom_level(), 1.0);
        assert_eq!(session.mode(), Mode::Calibrating);
        assert!(session.measurements().is_empty());
        assert!(!session.calibration().is_confirmed());
        assert_eq!(session.display_size(), Some((640, 480)));
    }

    #[test]
    fn test_degenerate_calibration_measures_zero() {
        let mut session = loaded_session();
        session.set_calibration_input("1", LinearUnit::Meters);
        session.click(Point::new(5.0, 5.0), false).expect("click");
        session.click(Point::new(5.0, 5.0), false).expect("coincident points are accepted");
        assert_eq!(session.mode(), Mode::Measuring);

        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(0.0, 100.0), false).expect("click");
        assert_eq!(session.measurements()[0].distance, 0.0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut session = calibrated_session();
        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(0.0, 100.0), false).expect("click");
        session.set_zoom(1.5);

        let snapshot = session.snapshot();
        session.undo();
        assert_eq!(snapshot.measurements.len(), 1);
        assert_eq!(snapshot.zoom_percent(), 150);
        assert_eq!(snapshot.calibration_unit(), LinearUnit::Meters);
        assert_eq!(snapshot.display_size(), Some((1500, 1200)));
    }

    #[test]
    fn test_new_measurements_keep_style_configured_at_creation() {
        let mut session = calibrated_session();
        let mut settings = DisplaySettings::default();
        session.set_new_measurement_style(settings.measurement_defaults());
        session.click(Point::new(0.0, 0.0), false).expect("click");
        session.click(Point::new(0.0, 100.0), false).expect("measure");

        settings.measurement_line_color = Color::GREEN;
        settings.measurement_line_width = 7;
        session.set_new_measurement_style(settings.measurement_defaults());
        session.click(Point::new(10.0, 0.0), false).expect("click");
        session.click(Point::new(10.0, 100.0), false).expect("measure");

        let first = settings.measurement_style(&session.measurements()[0].style);
        assert_eq!(first.line_color, Color::BLUE);
        assert_eq!(first.line_width, 2);

        let second = settings.measurement_style(&session.measurements()[1].style);
        assert_eq!(second.line_color, Color::GREEN);
        assert_eq!(second.line_width, 7);

        session.customize_measurement(0, StyleOverride { line_width: Some(5), ..Default::default() });
        let customized = settings.measurement_style(&session.measurements()[0].style);
        assert_eq!(customized.line_color, Color::BLUE);
        assert_eq!(customized.line_width, 5);
    }

    #[test]
    fn test_zoom_rescales_calibration_line() {
        let mut session = calibrated_session();
        let before = session.calibration().points().expect("calibrated points");
        session.set_zoom(2.0);
        let after = session.calibration().points().expect("calibrated points");

        assert_relative_eq!(after[0].x, before[0].x * 2.0);
        assert_relative_eq!(after[1].y, before[1].y * 2.0);
        assert_eq!(session.calibration().base_scale_factor(), Some(100.0));
    }
}

//! Planscale Core Library
//!
//! Scale model and measurement state for calibrated measuring on raster
//! plans and blueprints.

pub mod csv_export;
pub mod geometry;
pub mod measurement;
pub mod ruler;
pub mod scale;
pub mod session;
pub mod settings;
pub mod units;
pub mod zoom;

pub use csv_export::{export_measurements_csv, CsvExportConfig, CsvExportError, CsvExportResult};
pub use geometry::{
    euclidean, first_hit, midpoint, point_to_segment_distance, snap_to_axis, Point,
    HIT_TEST_THRESHOLD_PX,
};
pub use measurement::{summary_text, total_distance, Measurement};
pub use ruler::{RulerPlan, Tick, TickKind};
pub use scale::{confirm_calibration, Calibration, CalibrationError, ConfirmedScale};
pub use session::{
    CalibrationInput, ClickOutcome, ClickState, MeasurementSession, Mode, Preview, SessionError,
    SessionResult, SessionSnapshot,
};
pub use settings::{Color, DisplaySettings, ResolvedStyle, StyleOverride};
pub use units::{convert, convert_by_name, LinearUnit, UnitParseError};
pub use zoom::{ImageFrame, Rescale, ZoomConfig, ZoomDirection};

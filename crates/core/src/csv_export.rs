//! CSV export for measurements
//!
//! Writes one row per measurement followed by a blank line and a summary
//! block. Distances are written in the display unit; the stored values are
//! in the calibration unit and are converted on the way out.

use crate::measurement::total_distance;
use crate::session::SessionSnapshot;
use crate::settings::DisplaySettings;
use crate::units::LinearUnit;
use chrono::NaiveDateTime;
use std::io::Write;

/// Error types for CSV export
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no measurements to export")]
    NothingToExport,
}

pub type CsvExportResult<T> = Result<T, CsvExportError>;

/// Timestamp format used in the summary block
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
        }
    }
}

/// Export measurements to CSV format
///
/// CSV columns:
/// - Measurement #: 1-based position in the list
/// - Distance (unit): distance in `display_unit`, three decimals
/// - Start X/Y, End X/Y (px): canvas coordinates at the snapshot's zoom, one decimal
/// - Line Color: hex color the line is drawn with
/// - Line Width: line width in pixels
///
/// The summary block after the blank line holds the count, the total
/// distance, the calibration unit and `exported_at`.
pub fn export_measurements_csv<W: Write>(
    writer: W,
    snapshot: &SessionSnapshot,
    display_unit: LinearUnit,
    settings: &DisplaySettings,
    exported_at: NaiveDateTime,
    config: &CsvExportConfig,
) -> CsvExportResult<()> {
    if snapshot.measurements.is_empty() {
        return Err(CsvExportError::NothingToExport);
    }

    let calibration_unit = snapshot.calibration_unit();
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.include_headers)
        .from_writer(writer);

    if config.include_headers {
        csv_writer.write_record([
            "Measurement #".to_owned(),
            format!("Distance ({display_unit})"),
            "Start X (px)".to_owned(),
            "Start Y (px)".to_owned(),
            "End X (px)".to_owned(),
            "End Y (px)".to_owned(),
            "Line Color".to_owned(),
            "Line Width".to_owned(),
        ])?;
    }

    for (i, measurement) in snapshot.measurements.iter().enumerate() {
        let style = settings.measurement_style(&measurement.style);
        let distance = measurement.distance_in(calibration_unit, display_unit);
        let [start, end] = measurement.points;

        csv_writer.write_record([
            (i + 1).to_string(),
            format!("{distance:.3}"),
            format!("{:.1}", start.x),
            format!("{:.1}", start.y),
            format!("{:.1}", end.x),
            format!("{:.1}", end.y),
            style.line_color.to_hex(),
            style.line_width.to_string(),
        ])?;
    }

    // csv writes an empty record as `""`, so the separator line goes to the
    // underlying writer directly
    let mut writer = csv_writer.into_inner().map_err(|err| err.into_error())?;
    writer.write_all(b"\n")?;

    let mut summary = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    let total = total_distance(&snapshot.measurements, calibration_unit, display_unit);
    summary.write_record(["Summary"])?;
    summary.write_record(["Total Measurements".to_owned(), snapshot.measurements.len().to_string()])?;
    summary.write_record(["Total Distance".to_owned(), format!("{total:.3} {display_unit}")])?;
    summary.write_record(["Calibration Unit".to_owned(), calibration_unit.to_string()])?;
    summary.write_record([
        "Export Date".to_owned(),
        exported_at.format(EXPORT_DATE_FORMAT).to_string(),
    ])?;
    summary.flush()?;

    log::info!("exported {} measurements as CSV", snapshot.measurements.len());
    Ok(())
}

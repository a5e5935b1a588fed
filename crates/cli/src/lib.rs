use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use planscale_core::ruler::RulerPlan;
use planscale_core::{
    convert, export_measurements_csv, summary_text, total_distance, ConfirmedScale, CsvExportConfig,
    LinearUnit, MeasurementSession, Mode, Point, TickKind,
};
use planscale_raster::{default_source, save_labelled, ImageSource, LabelledExport, OpenSource};
use planscale_storage::Storage;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub mod script;

#[derive(Debug, Parser)]
#[command(name = "planscale")]
#[command(about = "Calibrated measuring on raster plans and blueprints")]
pub struct Cli {
    /// Directory holding settings.json instead of the per-user data directory.
    #[arg(long, global = true, value_name = "DIR")]
    settings_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print machine-readable image metadata.
    Info {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
        viewport: Option<(u32, u32)>,
    },
    /// Convert a length between units.
    Convert {
        value: f64,
        #[arg(long)]
        from: LinearUnit,
        #[arg(long)]
        to: LinearUnit,
    },
    /// Print the ruler ticks for a scale in pixels per unit.
    Ticks {
        #[arg(long)]
        scale: f64,
        #[arg(long)]
        extent: f64,
    },
    /// Replay a scripted session against an image and export the result.
    Measure {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
        /// Unit for reported distances; defaults to the calibration unit.
        #[arg(long)]
        display_unit: Option<LinearUnit>,
        #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
        viewport: Option<(u32, u32)>,
    },
    /// Inspect or reset stored display settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    Show,
    Reset,
    Path,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    width: u32,
    height: u32,
    base_scale: f64,
    display_width: u32,
    display_height: u32,
}

#[derive(Debug, Serialize)]
struct TicksOutput {
    spacing_real: f64,
    spacing_px: f64,
    ticks: Vec<TickOutput>,
}

#[derive(Debug, Serialize)]
struct TickOutput {
    position: f64,
    major: bool,
    length: u32,
    label: Option<String>,
}

#[derive(Debug, Serialize)]
struct MeasureOutput {
    path: String,
    mode: Mode,
    zoom_percent: u32,
    calibration: String,
    scale: Option<ConfirmedScale>,
    display_unit: LinearUnit,
    measurements: Vec<MeasurementOutput>,
    total: f64,
    selected: Option<usize>,
    scroll: Point,
    rejected: Vec<String>,
    summary: String,
}

#[derive(Debug, Serialize)]
struct MeasurementOutput {
    number: usize,
    distance: f64,
    label: String,
    start: Point,
    end: Point,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Info { image, viewport } => run_info(&image, viewport),
        Commands::Convert { value, from, to } => {
            println!("{:.6}", convert(value, from, to));
            Ok(())
        }
        Commands::Ticks { scale, extent } => run_ticks(scale, extent),
        Commands::Measure { image, script, csv, png, display_unit, viewport } => {
            let storage = open_storage(cli.settings_dir)?;
            let request = MeasureRequest {
                image: &image,
                script: &script,
                csv: csv.as_deref(),
                png: png.as_deref(),
                display_unit,
                viewport,
            };
            run_measure(&storage, &request)
        }
        Commands::Settings { action } => run_settings(&open_storage(cli.settings_dir)?, action),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_storage(settings_dir: Option<PathBuf>) -> Result<Storage> {
    match settings_dir {
        Some(dir) => Ok(Storage::with_root(dir)),
        None => Storage::from_default_project().context("failed to locate settings directory"),
    }
}

fn run_info(file: &Path, viewport: Option<(u32, u32)>) -> Result<()> {
    ensure_file_exists(file)?;

    let image = default_source().open(OpenSource::from(file)).context("failed to open image")?;
    let frame = image.frame(viewport);
    let (display_width, display_height) = frame.display_size(1.0);

    let payload = InfoOutput {
        path: file.display().to_string(),
        width: image.width(),
        height: image.height(),
        base_scale: frame.base_scale,
        display_width,
        display_height,
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_ticks(scale: f64, extent: f64) -> Result<()> {
    let Some(plan) = RulerPlan::new(scale) else {
        anyhow::bail!("no ruler can be drawn for a scale of {scale} pixels per unit");
    };

    let ticks = plan
        .ticks(extent)
        .into_iter()
        .map(|tick| TickOutput {
            position: tick.position,
            major: tick.kind == TickKind::Major,
            length: tick.kind.length(),
            label: tick.label,
        })
        .collect();

    let payload = TicksOutput { spacing_real: plan.spacing_real, spacing_px: plan.spacing_px, ticks };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

struct MeasureRequest<'a> {
    image: &'a Path,
    script: &'a Path,
    csv: Option<&'a Path>,
    png: Option<&'a Path>,
    display_unit: Option<LinearUnit>,
    viewport: Option<(u32, u32)>,
}

fn run_measure(storage: &Storage, request: &MeasureRequest<'_>) -> Result<()> {
    ensure_file_exists(request.image)?;
    ensure_file_exists(request.script)?;

    let settings = storage.load_settings().context("failed to load settings")?;
    let source = default_source();
    let image = source.open(OpenSource::from(request.image)).context("failed to open image")?;

    let script_json = fs::read_to_string(request.script)
        .with_context(|| format!("failed to read script {}", request.script.display()))?;
    let events = script::parse_script(&script_json).context("failed to parse script")?;

    let mut session = MeasurementSession::new();
    session.load_image(image.frame(request.viewport));
    session.set_new_measurement_style(settings.measurement_defaults());
    let replay = script::replay(&mut session, events);

    let snapshot = session.snapshot();
    let calibration_unit = snapshot.calibration_unit();
    let display_unit = request.display_unit.unwrap_or(calibration_unit);
    let exported_at = chrono::Local::now().naive_local();

    if let Some(path) = request.csv {
        // rendered in memory so a failed export leaves any existing file alone
        let mut csv = Vec::new();
        export_measurements_csv(
            &mut csv,
            &snapshot,
            display_unit,
            &settings,
            exported_at,
            &CsvExportConfig::default(),
        )
        .with_context(|| format!("failed to export CSV to {}", path.display()))?;
        write_output(path, &csv)?;
    }

    if let Some(path) = request.png {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let export = LabelledExport { snapshot: &snapshot, display_unit, settings: &settings, exported_at };
        save_labelled(path, &source, &image, &export)
            .with_context(|| format!("failed to write image to {}", path.display()))?;
    }

    let measurements = snapshot
        .measurements
        .iter()
        .enumerate()
        .map(|(i, measurement)| MeasurementOutput {
            number: i + 1,
            distance: measurement.distance_in(calibration_unit, display_unit),
            label: measurement.label(calibration_unit, display_unit),
            start: measurement.start(),
            end: measurement.end(),
        })
        .collect();

    let payload = MeasureOutput {
        path: request.image.display().to_string(),
        mode: snapshot.mode,
        zoom_percent: snapshot.zoom_percent(),
        calibration: snapshot.calibration.status_text(),
        scale: snapshot.calibration.scale().copied(),
        display_unit,
        measurements,
        total: total_distance(&snapshot.measurements, calibration_unit, display_unit),
        selected: session.selected(),
        scroll: replay.scroll,
        rejected: replay.rejected,
        summary: summary_text(&snapshot.measurements, calibration_unit, display_unit),
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_settings(storage: &Storage, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let settings = storage.load_settings().context("failed to load settings")?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Reset => {
            storage.reset_settings().context("failed to reset settings")?;
            println!("reset:{}", storage.settings_path().display());
        }
        SettingsAction::Path => println!("{}", storage.settings_path().display()),
    }
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn parse_viewport(value: &str) -> Result<(u32, u32), String> {
    let (width, height) =
        value.split_once(['x', 'X']).ok_or_else(|| format!("expected WxH, got {value:?}"))?;
    let width = width.trim().parse().map_err(|_| format!("invalid viewport width in {value:?}"))?;
    let height = height.trim().parse().map_err(|_| format!("invalid viewport height in {value:?}"))?;
    Ok((width, height))
}

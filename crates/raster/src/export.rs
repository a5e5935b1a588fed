//! Labelled image export
//!
//! Renders the image at the snapshot's zoom with the calibration line,
//! every measurement, the ruler overlay and a footer stamp burned in.

use crate::font::{centered_origin, draw_text, fill_rect, scale_for_size, text_height, text_width};
use crate::{save_image, ImageSource, LoadedImage, RasterError, RgbaImage};
use chrono::NaiveDateTime;
use image::Rgba;
use planscale_core::ruler::RulerPlan;
use planscale_core::{Color, DisplaySettings, LinearUnit, Point, ResolvedStyle, SessionSnapshot};
use std::path::Path;
use tiny_skia::{FillRule, IntSize, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

pub const TOOL_NAME: &str = "Planscale";
pub const FOOTER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const LABEL_OFFSET_Y: f64 = 10.0;
const LABEL_PADDING: i32 = 2;
/// Vertical ruler labels closer than this to the top would collide with the
/// horizontal ruler
const VERTICAL_LABEL_MIN_Y: f64 = 20.0;
const FOOTER_X: i32 = 10;
const FOOTER_OFFSET_FROM_BOTTOM: i32 = 20;

/// Everything an export needs besides the pixels
#[derive(Debug, Clone, Copy)]
pub struct LabelledExport<'a> {
    pub snapshot: &'a SessionSnapshot,
    pub display_unit: LinearUnit,
    pub settings: &'a DisplaySettings,
    pub exported_at: NaiveDateTime,
}

/// Render the labelled export in memory
pub fn render_labelled(
    source: &impl ImageSource,
    image: &LoadedImage,
    export: &LabelledExport<'_>,
) -> Result<RgbaImage, RasterError> {
    let (width, height) = export.snapshot.display_size().ok_or(RasterError::NoImage)?;
    let mut canvas = source.resize(image, width, height);
    let settings = export.settings;

    with_pixmap(&mut canvas, |pixmap| {
        if let Some([p1, p2]) = export.snapshot.calibration.points() {
            draw_segment(pixmap, p1, p2, &settings.calibration_style(), settings.point_size);
        }
        for measurement in &export.snapshot.measurements {
            let style = settings.measurement_style(&measurement.style);
            draw_segment(pixmap, measurement.start(), measurement.end(), &style, settings.point_size);
        }
    });

    if settings.show_measurement_labels {
        draw_labels(&mut canvas, export);
    }

    if settings.show_rulers {
        let scale = export
            .snapshot
            .calibration
            .scale()
            .and_then(|scale| scale.usable_scale_factor(export.snapshot.zoom_level));
        if let Some(plan) = scale.and_then(RulerPlan::new) {
            draw_rulers(&mut canvas, &plan, settings.ruler_color);
        }
    }

    draw_footer(&mut canvas, &footer_text(export.snapshot, export.exported_at));
    Ok(canvas)
}

/// Render and write the labelled export; the format follows the extension
pub fn save_labelled(
    path: &Path,
    source: &impl ImageSource,
    image: &LoadedImage,
    export: &LabelledExport<'_>,
) -> Result<(), RasterError> {
    let canvas = render_labelled(source, image, export)?;
    save_image(&canvas, path)?;
    log::info!(
        "exported labelled image {}x{} to {}",
        canvas.width(),
        canvas.height(),
        path.display()
    );
    Ok(())
}

pub fn footer_text(snapshot: &SessionSnapshot, exported_at: NaiveDateTime) -> String {
    let mut text = format!("{TOOL_NAME} | {}", exported_at.format(FOOTER_DATE_FORMAT));
    if snapshot.calibration.is_confirmed() {
        text.push_str(&format!(
            " | Unit: {} | Zoom: {}%",
            snapshot.calibration_unit(),
            snapshot.zoom_percent()
        ));
    }
    text
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(image: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let Some(size) = IntSize::from_wh(image.width(), image.height()) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(image.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    image.copy_from_slice(pixmap.data());
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}

fn draw_segment(pixmap: &mut Pixmap, start: Point, end: Point, style: &ResolvedStyle, point_size: u32) {
    let mut builder = PathBuilder::new();
    builder.move_to(start.x as f32, start.y as f32);
    builder.line_to(end.x as f32, end.y as f32);
    if let Some(path) = builder.finish() {
        let stroke = Stroke {
            width: style.line_width.max(1) as f32,
            line_cap: LineCap::Butt,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint(style.line_color), &stroke, Transform::identity(), None);
    }

    let radius = point_size as f32;
    for point in [start, end] {
        if let Some(circle) = PathBuilder::from_circle(point.x as f32, point.y as f32, radius) {
            pixmap.fill_path(
                &circle,
                &paint(style.point_color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }
}

fn draw_labels(canvas: &mut RgbaImage, export: &LabelledExport<'_>) {
    let settings = export.settings;
    let calibration_unit = export.snapshot.calibration_unit();
    let scale = scale_for_size(settings.measurement_text_size);

    for measurement in &export.snapshot.measurements {
        let style = settings.measurement_style(&measurement.style);
        let text = measurement.label(calibration_unit, export.display_unit);
        let anchor = measurement.label_anchor();
        let (x, y) = centered_origin(anchor.x, anchor.y - LABEL_OFFSET_Y, &text, scale);

        if settings.label_background {
            fill_rect(
                canvas,
                x - LABEL_PADDING,
                y - LABEL_PADDING,
                text_width(&text, scale) + 2 * LABEL_PADDING as u32,
                text_height(scale) + 2 * LABEL_PADDING as u32,
                rgba(settings.label_bg_color),
            );
        }
        draw_text(canvas, x, y, &text, rgba(style.text_color), scale);
    }
}

fn draw_rulers(canvas: &mut RgbaImage, plan: &RulerPlan, color: Color) {
    let color = rgba(color);
    let (width, height) = canvas.dimensions();

    for tick in plan.ticks(f64::from(width)) {
        let x = tick.position.round() as i32;
        let length = tick.kind.length();
        fill_rect(canvas, x, 0, 1, length, color);
        if let Some(label) = &tick.label {
            let label_x = x - text_width(label, 1) as i32 / 2;
            draw_text(canvas, label_x, length as i32 + 2, label, color, 1);
        }
    }

    for tick in plan.ticks(f64::from(height)) {
        let y = tick.position.round() as i32;
        let length = tick.kind.length();
        fill_rect(canvas, 0, y, length, 1, color);
        match &tick.label {
            Some(label) if tick.position > VERTICAL_LABEL_MIN_Y => {
                let label_y = y - text_height(1) as i32 / 2;
                draw_text(canvas, length as i32 + 2, label_y, label, color, 1);
            }
            _ => {}
        }
    }
}

fn draw_footer(canvas: &mut RgbaImage, text: &str) {
    let y = canvas.height() as i32 - FOOTER_OFFSET_FROM_BOTTOM;
    fill_rect(
        canvas,
        FOOTER_X - 2,
        y - 2,
        text_width(text, 1) + 4,
        text_height(1) + 4,
        rgba(Color::WHITE),
    );
    draw_text(canvas, FOOTER_X, y, text, rgba(Color::BLACK), 1);
}

//! Zoom level bookkeeping and canvas rescaling
//!
//! Stored points are kept in zoomed canvas space, so every zoom change
//! multiplies them by `new / old`. Real distances and the calibration's base
//! scale are zoom independent and are never touched.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Viewport assumed when the real one has not been laid out yet
pub const FALLBACK_VIEWPORT: (u32, u32) = (800, 600);

/// Zoom bounds and step size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 10.0,
            zoom_step: 0.1,
        }
    }
}

impl ZoomConfig {
    pub fn clamp(&self, zoom_level: f64) -> f64 {
        zoom_level.clamp(self.min_zoom, self.max_zoom)
    }

    /// Next level one step in `direction` from `current`, clamped
    pub fn stepped(&self, current: f64, direction: ZoomDirection) -> f64 {
        let target = match direction {
            ZoomDirection::In => current + self.zoom_step,
            ZoomDirection::Out => current - self.zoom_step,
        };
        // Keeps repeated 0.1 steps from drifting away from 1.0
        self.clamp((target * 1e6).round() / 1e6)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
}

/// Dimensions of the loaded image and its fit-to-viewport factor
///
/// `base_scale` is computed once when the image is loaded and stays fixed
/// for the lifetime of that image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    pub base_scale: f64,
}

impl ImageFrame {
    /// Fit an image into `viewport`, never enlarging it
    ///
    /// A viewport axis of 1px or less has not been laid out and falls back
    /// to [`FALLBACK_VIEWPORT`].
    pub fn fit(width: u32, height: u32, viewport: Option<(u32, u32)>) -> Self {
        let (viewport_w, viewport_h) = viewport.unwrap_or(FALLBACK_VIEWPORT);
        let viewport_w = if viewport_w <= 1 { FALLBACK_VIEWPORT.0 } else { viewport_w };
        let viewport_h = if viewport_h <= 1 { FALLBACK_VIEWPORT.1 } else { viewport_h };

        let base_scale = if width == 0 || height == 0 {
            1.0
        } else {
            (f64::from(viewport_w) / f64::from(width))
                .min(f64::from(viewport_h) / f64::from(height))
                .min(1.0)
        };

        Self { width, height, base_scale }
    }

    /// Displayed canvas extent at `zoom_level`, truncated to whole pixels
    pub fn display_size(&self, zoom_level: f64) -> (u32, u32) {
        let scale = self.base_scale * zoom_level;
        (
            (f64::from(self.width) * scale) as u32,
            (f64::from(self.height) * scale) as u32,
        )
    }
}

/// Anything holding canvas-space coordinates that must follow zoom changes
pub trait Rescale {
    fn rescale(&mut self, factor: f64);
}

impl Rescale for Point {
    fn rescale(&mut self, factor: f64) {
        *self = self.scaled(factor);
    }
}

impl<T: Rescale> Rescale for Option<T> {
    fn rescale(&mut self, factor: f64) {
        if let Some(inner) = self {
            inner.rescale(factor);
        }
    }
}

impl<T: Rescale> Rescale for [T] {
    fn rescale(&mut self, factor: f64) {
        for item in self {
            item.rescale(factor);
        }
    }
}

impl<T: Rescale> Rescale for Vec<T> {
    fn rescale(&mut self, factor: f64) {
        self.as_mut_slice().rescale(factor);
    }
}

/// Scroll offset that keeps the canvas pixel under the pointer in place
///
/// `pointer` is the pointer position inside the window and `scroll` the
/// current scroll offset on the same axis. The result never goes negative.
pub fn anchored_scroll(scroll: f64, pointer: f64, factor: f64) -> f64 {
    ((scroll + pointer) * factor - pointer).max(0.0)
}

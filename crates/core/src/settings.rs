//! Display settings and per-measurement style overrides
//!
//! Settings are plain immutable values handed to drawing and export code.
//! The serialized form is a flat key/value map; missing keys take their
//! defaults and unknown keys are ignored so older files keep loading.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque RGB color, serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError(s.to_owned());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Global style and display options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub calibration_line_color: Color,
    pub calibration_point_color: Color,
    pub calibration_line_width: u32,
    pub measurement_line_color: Color,
    pub measurement_point_color: Color,
    pub measurement_line_width: u32,
    pub measurement_text_color: Color,
    pub measurement_text_size: u32,
    pub measurement_text_font: String,
    pub canvas_bg_color: Color,
    /// Radius of endpoint markers in pixels
    pub point_size: u32,
    pub show_measurement_labels: bool,
    pub label_background: bool,
    pub label_bg_color: Color,
    pub grid_enabled: bool,
    pub grid_color: Color,
    pub grid_spacing: u32,
    pub show_crosshair: bool,
    pub crosshair_color: Color,
    pub crosshair_width: u32,
    pub show_rulers: bool,
    pub ruler_color: Color,
    pub ruler_bg_color: Color,
    /// Thickness of the ruler bands in pixels
    pub ruler_size: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            calibration_line_color: Color::RED,
            calibration_point_color: Color::RED,
            calibration_line_width: 2,
            measurement_line_color: Color::BLUE,
            measurement_point_color: Color::BLUE,
            measurement_line_width: 2,
            measurement_text_color: Color::BLUE,
            measurement_text_size: 10,
            measurement_text_font: "Arial".to_owned(),
            canvas_bg_color: Color::rgb(0x80, 0x80, 0x80),
            point_size: 4,
            show_measurement_labels: true,
            label_background: true,
            label_bg_color: Color::WHITE,
            grid_enabled: false,
            grid_color: Color::rgb(0xCC, 0xCC, 0xCC),
            grid_spacing: 50,
            show_crosshair: true,
            crosshair_color: Color::GREEN,
            crosshair_width: 1,
            show_rulers: true,
            ruler_color: Color::BLACK,
            ruler_bg_color: Color::rgb(0xE0, 0xE0, 0xE0),
            ruler_size: 30,
        }
    }
}

impl DisplaySettings {
    /// Style a measurement is drawn with once `overrides` are layered on top
    pub fn measurement_style(&self, overrides: &StyleOverride) -> ResolvedStyle {
        ResolvedStyle {
            line_color: overrides.line_color.unwrap_or(self.measurement_line_color),
            point_color: overrides.point_color.unwrap_or(self.measurement_point_color),
            line_width: overrides.line_width.unwrap_or(self.measurement_line_width),
            text_color: overrides.text_color.unwrap_or(self.measurement_text_color),
        }
    }

    /// Current measurement style with every field pinned
    ///
    /// Stored on new measurements so later settings changes leave them alone.
    pub fn measurement_defaults(&self) -> StyleOverride {
        self.measurement_style(&StyleOverride::default()).into()
    }

    pub fn calibration_style(&self) -> ResolvedStyle {
        ResolvedStyle {
            line_color: self.calibration_line_color,
            point_color: self.calibration_point_color,
            line_width: self.calibration_line_width,
            text_color: self.calibration_line_color,
        }
    }
}

/// Per-measurement style; unset fields follow the global settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverride {
    pub line_color: Option<Color>,
    pub point_color: Option<Color>,
    pub line_width: Option<u32>,
    pub text_color: Option<Color>,
}

impl StyleOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `other` on top, keeping fields it leaves unset
    pub fn merged(self, other: StyleOverride) -> Self {
        Self {
            line_color: other.line_color.or(self.line_color),
            point_color: other.point_color.or(self.point_color),
            line_width: other.line_width.or(self.line_width),
            text_color: other.text_color.or(self.text_color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub line_color: Color,
    pub point_color: Color,
    pub line_width: u32,
    pub text_color: Color,
}

impl From<ResolvedStyle> for StyleOverride {
    fn from(style: ResolvedStyle) -> Self {
        Self {
            line_color: Some(style.line_color),
            point_color: Some(style.point_color),
            line_width: Some(style.line_width),
            text_color: Some(style.text_color),
        }
    }
}

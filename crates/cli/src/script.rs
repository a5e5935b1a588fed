//! Scripted session replay
//!
//! A script is a JSON array of UI events, replayed in order against one
//! session. Events the session rejects are reported and replay continues.

use planscale_core::{LinearUnit, MeasurementSession, Point, StyleOverride, ZoomDirection};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReferenceText {
    Number(f64),
    Text(String),
}

impl ReferenceText {
    fn into_text(self) -> String {
        match self {
            ReferenceText::Number(value) => value.to_string(),
            ReferenceText::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptEvent {
    Click {
        x: f64,
        y: f64,
        #[serde(default)]
        snap: bool,
    },
    SetReference {
        distance: ReferenceText,
        #[serde(default)]
        unit: LinearUnit,
    },
    SetZoom {
        level: f64,
    },
    ZoomIn,
    ZoomOut,
    ResetZoom,
    /// Wheel step with the pointer at window position (`x`, `y`)
    Wheel {
        direction: ZoomDirection,
        x: f64,
        y: f64,
    },
    Cancel,
    Undo,
    ResetCalibration,
    ClearMeasurements,
    Select {
        x: f64,
        y: f64,
    },
    Delete {
        index: usize,
    },
    Style {
        index: usize,
        style: StyleOverride,
    },
}

/// Result of replaying a script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replay {
    /// Scroll offset after the last wheel event
    pub scroll: Point,
    /// One message per rejected event
    pub rejected: Vec<String>,
}

pub fn parse_script(json: &str) -> serde_json::Result<Vec<ScriptEvent>> {
    serde_json::from_str(json)
}

pub fn replay(session: &mut MeasurementSession, events: Vec<ScriptEvent>) -> Replay {
    let mut replay = Replay::default();

    for (i, event) in events.into_iter().enumerate() {
        let number = i + 1;
        match event {
            ScriptEvent::Click { x, y, snap } => {
                if let Err(err) = session.click(Point::new(x, y), snap) {
                    log::warn!("event {number}: {err}");
                    replay.rejected.push(format!("event {number}: {err}"));
                }
            }
            ScriptEvent::SetReference { distance, unit } => {
                session.set_calibration_input(distance.into_text(), unit);
            }
            ScriptEvent::SetZoom { level } => {
                session.set_zoom(level);
            }
            ScriptEvent::ZoomIn => {
                session.zoom_in();
            }
            ScriptEvent::ZoomOut => {
                session.zoom_out();
            }
            ScriptEvent::ResetZoom => {
                session.reset_zoom();
            }
            ScriptEvent::Wheel { direction, x, y } => {
                if let Some(scroll) = session.wheel_zoom(direction, Point::new(x, y), replay.scroll) {
                    replay.scroll = scroll;
                }
            }
            ScriptEvent::Cancel => {
                session.cancel();
            }
            ScriptEvent::Undo => {
                session.undo();
            }
            ScriptEvent::ResetCalibration => session.reset_calibration(),
            ScriptEvent::ClearMeasurements => session.clear_measurements(),
            ScriptEvent::Select { x, y } => {
                session.select_at(Point::new(x, y));
            }
            ScriptEvent::Delete { index } => {
                if !session.delete_measurement(index) {
                    replay.rejected.push(format!("event {number}: no measurement at index {index}"));
                }
            }
            ScriptEvent::Style { index, style } => {
                if !session.customize_measurement(index, style) {
                    replay.rejected.push(format!("event {number}: no measurement at index {index}"));
                }
            }
        }
    }

    replay
}

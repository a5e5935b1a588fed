//! Ruler tick planning
//!
//! Picks a readable real-world tick spacing for the current scale and lays
//! out tick marks along one canvas axis. Both the interactive rulers and the
//! exported image overlay are driven from the same plan.

use std::ops::RangeInclusive;

/// Spacings a ruler may use, in real units
pub const NICE_SPACINGS: [f64; 13] = [
    0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0,
];

pub const MAJOR_TICK_LENGTH: u32 = 15;
pub const MINOR_TICK_LENGTH: u32 = 8;
/// Every n-th tick is major and carries a label
pub const MAJOR_TICK_EVERY: usize = 5;
/// Ticks closer together than this are not drawn at all
pub const MIN_TICK_SPACING_PX: f64 = 1.0;
/// Upper bound on ticks laid out along one axis
pub const MAX_TICKS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Major,
    Minor,
}

impl TickKind {
    pub fn length(self) -> u32 {
        match self {
            TickKind::Major => MAJOR_TICK_LENGTH,
            TickKind::Minor => MINOR_TICK_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Position of the tick counted from the axis origin
    pub index: usize,
    /// Canvas pixel position along the axis
    pub position: f64,
    pub kind: TickKind,
    /// Real distance from the origin, one decimal; major ticks only
    pub label: Option<String>,
}

/// Tick spacing chosen for one scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerPlan {
    /// Pixels per unit at the current zoom
    pub scale_factor: f64,
    pub spacing_real: f64,
    pub spacing_px: f64,
}

impl RulerPlan {
    /// Plan ticks for `current_scale_factor` pixels per unit
    ///
    /// Returns `None` for a scale that is zero, negative or not finite.
    pub fn new(current_scale_factor: f64) -> Option<Self> {
        if !(current_scale_factor > 0.0 && current_scale_factor.is_finite()) {
            return None;
        }

        let real_per_100px = 100.0 / current_scale_factor;
        let spacing_real = nearest_spacing(real_per_100px);
        Some(Self {
            scale_factor: current_scale_factor,
            spacing_real,
            spacing_px: spacing_real * current_scale_factor,
        })
    }

    /// Every tick from 0 up to and including `extent`
    pub fn ticks(&self, extent: f64) -> Vec<Tick> {
        self.ticks_within(extent, 0.0..=extent)
    }

    /// Ticks up to `extent` that fall inside `visible`
    ///
    /// Indices still count from the axis origin so major ticks stay put
    /// while scrolling. Sub-pixel spacing or a non-finite extent yields no
    /// ticks, and at most [`MAX_TICKS`] are returned.
    pub fn ticks_within(&self, extent: f64, visible: RangeInclusive<f64>) -> Vec<Tick> {
        if !(self.spacing_px >= MIN_TICK_SPACING_PX) || !extent.is_finite() || extent < 0.0 {
            return Vec::new();
        }

        let first = (visible.start().max(0.0) / self.spacing_px).ceil() as usize;
        (first..)
            .map(|index| (index, index as f64 * self.spacing_px))
            .take_while(|&(_, position)| position <= extent && position <= *visible.end())
            .take(MAX_TICKS)
            .map(|(index, position)| self.tick(index, position))
            .collect()
    }

    fn tick(&self, index: usize, position: f64) -> Tick {
        if index % MAJOR_TICK_EVERY == 0 {
            Tick {
                index,
                position,
                kind: TickKind::Major,
                label: Some(format!("{:.1}", position / self.scale_factor)),
            }
        } else {
            Tick { index, position, kind: TickKind::Minor, label: None }
        }
    }
}

/// Candidate closest to `target`; the smaller candidate wins a tie
fn nearest_spacing(target: f64) -> f64 {
    let mut best = NICE_SPACINGS[0];
    for candidate in NICE_SPACINGS {
        if (candidate - target).abs() < (best - target).abs() {
            best = candidate;
        }
    }
    best
}

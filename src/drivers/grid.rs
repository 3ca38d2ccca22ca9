use crate::drivers::config::{DisplayConfig, DisplayMode};

/// Visual class of a grid line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    /// The calibrated zero reference through the vertical center.
    Zero,
    Major,
    Minor,
}

/// Positioned text attached to a grid line, anchored south-west.
#[derive(Clone, Debug)]
pub struct GridLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// One horizontal or vertical calibration line.
#[derive(Clone, Debug)]
pub struct GridLine {
    pub style: LineStyle,
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub label: Option<GridLabel>,
}

/// Vertical pixel window the grid covers above the center line.
const GRID_ABOVE: i32 = 350;
/// Pixels the oscilloscope grid extends below the center line.
const SCOPE_BELOW: i32 = 175;

const ROW_STEP: i32 = 25;
const SCOPE_COLUMN_STEP: i32 = 23;
const SPECTRUM_COLUMN_STEP: i32 = 28;
const SCOPE_MAJOR_EVERY: i32 = 5;
const SPECTRUM_MAJOR_EVERY: i32 = 4;

/// Pixels per volt at unit amplification.
const PIXELS_PER_VOLT: f32 = 50.0;
/// Column ticks per millisecond at 1 ms/div.
const TICKS_PER_MS: f32 = 20.0;
/// Frequency covered by one column tick, in kHz.
const KHZ_PER_TICK: f32 = 5.0;

/// Computes the full calibration overlay for the current configuration.
///
/// Recomputed every cycle so the labels always reflect the live
/// amplification and span without separate invalidation.
pub fn overlay(config: &DisplayConfig) -> Vec<GridLine> {
    let mut lines = rows(config);
    lines.extend(columns(config));
    lines
}

fn rows(config: &DisplayConfig) -> Vec<GridLine> {
    let center = config.center;
    let bottom = match config.mode {
        DisplayMode::Scope => center + SCOPE_BELOW,
        DisplayMode::Spectrum => center,
    };
    let width = config.width as f32;
    let mut lines = Vec::new();
    let mut ct = -1i32;
    let mut y = center - GRID_ABOVE;
    while y <= bottom {
        let style = if y == center {
            LineStyle::Zero
        } else if (ct & 1) == 1 {
            LineStyle::Major
        } else {
            LineStyle::Minor
        };
        let label = (style != LineStyle::Minor).then(|| GridLabel {
            text: format!(
                "{:.1} V",
                (center - y) as f32 / PIXELS_PER_VOLT / config.amplification
            ),
            x: 5.0,
            y: y as f32,
        });
        lines.push(GridLine {
            style,
            from: [0.0, y as f32],
            to: [width, y as f32],
            label,
        });
        ct += 1;
        y += ROW_STEP;
    }
    lines
}

fn columns(config: &DisplayConfig) -> Vec<GridLine> {
    let center = config.center;
    let (step, major_every, bottom) = match config.mode {
        DisplayMode::Scope => (SCOPE_COLUMN_STEP, SCOPE_MAJOR_EVERY, center + SCOPE_BELOW),
        DisplayMode::Spectrum => (SPECTRUM_COLUMN_STEP, SPECTRUM_MAJOR_EVERY, center + 5),
    };
    let top = center - GRID_ABOVE;
    let mut lines = Vec::new();
    let mut ct = 0i32;
    let mut x = 0i32;
    while x < config.width as i32 {
        let style = if ct % major_every == 0 {
            LineStyle::Major
        } else {
            LineStyle::Minor
        };
        let label = (style == LineStyle::Major && ct > 0).then(|| match config.mode {
            DisplayMode::Scope => GridLabel {
                text: format!("{:.2} ms", ct as f32 / TICKS_PER_MS * config.bw_ms_per_div),
                x: x as f32,
                y: center as f32,
            },
            DisplayMode::Spectrum => GridLabel {
                text: format!("{:.1} kHz", KHZ_PER_TICK * ct as f32),
                x: (x - 20) as f32,
                y: (center + 20) as f32,
            },
        });
        lines.push(GridLine {
            style,
            from: [x as f32, top as f32],
            to: [x as f32, bottom as f32],
            label,
        });
        ct += 1;
        x += step;
    }
    lines
}

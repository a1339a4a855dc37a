use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::{OverplotError, OverplotResult};

/// Axes box as figure fractions measured from the bottom-left (matplotlib subplot defaults).
const SUBPLOT_LEFT: f64 = 0.125;
const SUBPLOT_RIGHT: f64 = 0.9;
const SUBPLOT_BOTTOM: f64 = 0.11;
const SUBPLOT_TOP: f64 = 0.88;

/// Upper bound on ticks per axis.
pub const MAX_TICKS: usize = 9;

/// Pixel geometry of the plotting surface and the data-to-pixel mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxesLayout {
    /// Whole figure.
    pub canvas: Canvas,
    /// Axes box in pixels, y growing downwards.
    pub plot: Rect,
    /// `(min, max)` of the time axis.
    pub x_range: (f64, f64),
    /// `(min, max)` of the value axis.
    pub y_range: (f64, f64),
}

impl AxesLayout {
    /// Place the axes box inside `canvas` with the given data limits.
    pub fn new(canvas: Canvas, x_range: (f64, f64), y_range: (f64, f64)) -> OverplotResult<Self> {
        for (name, (lo, hi)) in [("x", x_range), ("y", y_range)] {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(OverplotError::validation(format!(
                    "{name} axis limits must be finite with min < max, got ({lo}, {hi})"
                )));
            }
        }
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let plot = Rect::new(
            (SUBPLOT_LEFT * w).round(),
            ((1.0 - SUBPLOT_TOP) * h).round(),
            (SUBPLOT_RIGHT * w).round(),
            ((1.0 - SUBPLOT_BOTTOM) * h).round(),
        );
        if plot.width() < 1.0 || plot.height() < 1.0 {
            return Err(OverplotError::validation(format!(
                "canvas {}x{} is too small for a plot",
                canvas.width, canvas.height
            )));
        }
        Ok(Self {
            canvas,
            plot,
            x_range,
            y_range,
        })
    }

    /// Map a data-space `(t, v)` sample to pixel space.
    pub fn to_px(&self, t: f64, v: f64) -> Point {
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        Point::new(
            self.plot.x0 + (t - x0) / (x1 - x0) * self.plot.width(),
            self.plot.y1 - (v - y0) / (y1 - y0) * self.plot.height(),
        )
    }

    /// Tick positions along the time axis.
    pub fn x_ticks(&self) -> Vec<f64> {
        nice_ticks(self.x_range.0, self.x_range.1, MAX_TICKS)
    }

    /// Tick positions along the value axis.
    pub fn y_ticks(&self) -> Vec<f64> {
        nice_ticks(self.y_range.0, self.y_range.1, MAX_TICKS)
    }

    /// Integer pixel bounds of the axes box, clamped to the canvas: `(x0, y0, x1, y1)`, exclusive end.
    pub fn plot_px_bounds(&self) -> (u32, u32, u32, u32) {
        let clamp_x = |v: f64| (v.max(0.0) as u32).min(self.canvas.width);
        let clamp_y = |v: f64| (v.max(0.0) as u32).min(self.canvas.height);
        (
            clamp_x(self.plot.x0.floor()),
            clamp_y(self.plot.y0.floor()),
            clamp_x(self.plot.x1.ceil()),
            clamp_y(self.plot.y1.ceil()),
        )
    }
}

/// "Nice" ticks covering `[lo, hi]`: multiples of 1, 2, 2.5 or 5 times a power of ten.
pub fn nice_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 || max_ticks < 2 {
        return Vec::new();
    }
    let step = tick_step(span / (max_ticks - 1) as f64);
    let eps = step * 1e-9;
    let first = ((lo - eps) / step).ceil() as i64;
    let last = ((hi + eps) / step).floor() as i64;
    (first..=last)
        .map(|k| {
            let v = k as f64 * step;
            if v.abs() < eps { 0.0 } else { v }
        })
        .collect()
}

fn tick_step(raw: f64) -> f64 {
    let mag = 10f64.powf(raw.log10().floor());
    for m in [1.0, 2.0, 2.5, 5.0, 10.0] {
        let step = m * mag;
        if step >= raw * (1.0 - 1e-9) {
            return step;
        }
    }
    10.0 * mag
}

/// Format a tick value with just enough decimals to distinguish multiples of `step`.
pub fn format_tick(v: f64, step: f64) -> String {
    let mut decimals = 0usize;
    while decimals < 10 {
        let scaled = step * 10f64.powi(decimals as i32);
        if (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0) {
            break;
        }
        decimals += 1;
    }
    let s = format!("{v:.decimals$}");
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().any(|c| c != '0' && c != '.') => format!("\u{2212}{rest}"),
        Some(rest) => rest.to_string(),
        None => s,
    }
}

/// Spacing between consecutive ticks, or `1.0` when there are fewer than two.
pub fn tick_spacing(ticks: &[f64]) -> f64 {
    match ticks {
        [a, b, ..] => b - a,
        _ => 1.0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plot/layout.rs"]
mod tests;

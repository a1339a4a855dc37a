use std::path::PathBuf;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{OverplotError, OverplotResult};

/// Line colours assigned to channels in registration order (matplotlib "tab10").
pub const TAB10: [Rgba8; 10] = [
    Rgba8::rgb(0x1f, 0x77, 0xb4),
    Rgba8::rgb(0xff, 0x7f, 0x0e),
    Rgba8::rgb(0x2c, 0xa0, 0x2c),
    Rgba8::rgb(0xd6, 0x27, 0x28),
    Rgba8::rgb(0x94, 0x67, 0xbd),
    Rgba8::rgb(0x8c, 0x56, 0x4b),
    Rgba8::rgb(0xe3, 0x77, 0xc2),
    Rgba8::rgb(0x7f, 0x7f, 0x7f),
    Rgba8::rgb(0xbc, 0xbd, 0x22),
    Rgba8::rgb(0x17, 0xbe, 0xcf),
];

/// Per-job plot appearance.
///
/// Sizes are in points and scale with `dpi`, so a 3840x2160 video at 300 dpi gets the same
/// proportions as a 1920x1080 one at 150 dpi.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotStyle {
    /// Rendering resolution in dots per inch.
    pub dpi: f64,
    /// Base font size for ticks, labels and legend.
    pub font_size_pt: f64,
    /// Title font size.
    pub title_size_pt: f64,
    /// Channel line width.
    pub line_width_pt: f64,
    /// Colour of spines, ticks, labels, title and legend text.
    pub foreground: Rgba8,
    /// Grid line colour.
    pub grid: Rgba8,
    /// Grid line width.
    pub grid_width_pt: f64,
    /// Line colour cycle.
    pub palette: Vec<Rgba8>,
    /// Font family list handed to the text shaper.
    pub font_family: String,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` fonts.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            font_size_pt: 10.0,
            title_size_pt: 12.0,
            line_width_pt: 1.5,
            foreground: Rgba8::WHITE,
            grid: Rgba8::rgb(0xb0, 0xb0, 0xb0),
            grid_width_pt: 0.8,
            palette: TAB10.to_vec(),
            font_family: "DejaVu Sans, Bitstream Vera Sans, Arial, sans-serif".to_string(),
            font_dirs: Vec::new(),
        }
    }
}

impl PlotStyle {
    /// Check that every size is positive and the palette is non-empty.
    pub fn validate(&self) -> OverplotResult<()> {
        for (name, v) in [
            ("dpi", self.dpi),
            ("font_size_pt", self.font_size_pt),
            ("title_size_pt", self.title_size_pt),
            ("line_width_pt", self.line_width_pt),
            ("grid_width_pt", self.grid_width_pt),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(OverplotError::validation(format!(
                    "style.{name} must be positive, got {v}"
                )));
            }
        }
        if self.palette.is_empty() {
            return Err(OverplotError::validation("style.palette must not be empty"));
        }
        Ok(())
    }

    /// Convert points to pixels at this style's dpi.
    pub fn px(&self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }

    /// Colour of the `i`-th registered channel.
    pub fn line_color(&self, i: usize) -> Rgba8 {
        self.palette[i % self.palette.len()]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plot/style.rs"]
mod tests;

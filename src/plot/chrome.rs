use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{OverplotError, OverplotResult};
use crate::plot::layout::{AxesLayout, format_tick, tick_spacing};
use crate::plot::style::PlotStyle;

const TICK_LEN_PT: f64 = 3.5;
const TICK_PAD_PT: f64 = 3.5;
const LABEL_PAD_PT: f64 = 4.0;
const TITLE_PAD_PT: f64 = 6.0;
const SPINE_WIDTH_PT: f64 = 0.8;
/// Dash pattern of the grid, in multiples of the grid line width.
const GRID_DASH: (f64, f64) = (3.7, 1.6);
/// Rough advance width of one glyph as a fraction of the font size.
const GLYPH_ASPECT: f64 = 0.6;

/// Text shown around the axes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChromeText {
    /// Figure title.
    pub title: String,
    /// Time axis label.
    pub xlabel: String,
    /// Value axis label.
    pub ylabel: String,
}

/// One legend row.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    /// Channel label.
    pub label: String,
    /// Line colour.
    pub color: Rgba8,
}

/// Build the SVG document for everything that does not change between frames: grid, spines,
/// ticks, tick labels, axis labels, title and legend. The background is left transparent.
pub fn build_chrome_svg(
    layout: &AxesLayout,
    style: &PlotStyle,
    text: &ChromeText,
    legend: &[LegendEntry],
) -> String {
    let Canvas { width, height } = layout.canvas;
    let p = layout.plot;
    let fg = style.foreground;
    let font_px = style.px(style.font_size_pt);
    let tick_len = style.px(TICK_LEN_PT);
    let tick_pad = style.px(TICK_PAD_PT);
    let spine_w = style.px(SPINE_WIDTH_PT);
    let grid_w = style.px(style.grid_width_pt);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="{}">"#,
        escape_xml(&style.font_family)
    );

    let x_ticks = layout.x_ticks();
    let y_ticks = layout.y_ticks();

    // Grid.
    let _ = write!(
        svg,
        r#"<g stroke="{}" stroke-opacity="{}" stroke-width="{grid_w:.3}" stroke-dasharray="{:.3},{:.3}" fill="none">"#,
        style.grid.to_hex_rgb(),
        style.grid.opacity(),
        GRID_DASH.0 * grid_w,
        GRID_DASH.1 * grid_w,
    );
    for &t in &x_ticks {
        let x = layout.to_px(t, layout.y_range.0).x;
        let _ = write!(
            svg,
            r#"<line x1="{x:.3}" y1="{:.3}" x2="{x:.3}" y2="{:.3}"/>"#,
            p.y0, p.y1
        );
    }
    for &v in &y_ticks {
        let y = layout.to_px(layout.x_range.0, v).y;
        let _ = write!(
            svg,
            r#"<line x1="{:.3}" y1="{y:.3}" x2="{:.3}" y2="{y:.3}"/>"#,
            p.x0, p.x1
        );
    }
    svg.push_str("</g>");

    // Spines and tick marks.
    let _ = write!(
        svg,
        r#"<g stroke="{}" stroke-opacity="{}" stroke-width="{spine_w:.3}" fill="none">"#,
        fg.to_hex_rgb(),
        fg.opacity()
    );
    let _ = write!(
        svg,
        r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}"/>"#,
        p.x0,
        p.y0,
        p.width(),
        p.height()
    );
    for &t in &x_ticks {
        let x = layout.to_px(t, layout.y_range.0).x;
        let _ = write!(
            svg,
            r#"<line x1="{x:.3}" y1="{:.3}" x2="{x:.3}" y2="{:.3}"/>"#,
            p.y1,
            p.y1 + tick_len
        );
    }
    for &v in &y_ticks {
        let y = layout.to_px(layout.x_range.0, v).y;
        let _ = write!(
            svg,
            r#"<line x1="{:.3}" y1="{y:.3}" x2="{:.3}" y2="{y:.3}"/>"#,
            p.x0 - tick_len,
            p.x0
        );
    }
    svg.push_str("</g>");

    // Tick labels.
    let _ = write!(
        svg,
        r#"<g fill="{}" fill-opacity="{}" font-size="{font_px:.3}">"#,
        fg.to_hex_rgb(),
        fg.opacity()
    );
    let x_step = tick_spacing(&x_ticks);
    let x_label_baseline = p.y1 + tick_len + tick_pad + 0.8 * font_px;
    for &t in &x_ticks {
        let x = layout.to_px(t, layout.y_range.0).x;
        let _ = write!(
            svg,
            r#"<text x="{x:.3}" y="{x_label_baseline:.3}" text-anchor="middle">{}</text>"#,
            escape_xml(&format_tick(t, x_step))
        );
    }
    let y_step = tick_spacing(&y_ticks);
    let mut widest_y_label = 0.0f64;
    for &v in &y_ticks {
        let y = layout.to_px(layout.x_range.0, v).y;
        let label = format_tick(v, y_step);
        widest_y_label = widest_y_label.max(estimate_text_width(&label, font_px));
        let _ = write!(
            svg,
            r#"<text x="{:.3}" y="{:.3}" text-anchor="end">{}</text>"#,
            p.x0 - tick_len - tick_pad,
            y + 0.35 * font_px,
            escape_xml(&label)
        );
    }
    svg.push_str("</g>");

    // Axis labels and title.
    let label_pad = style.px(LABEL_PAD_PT);
    if !text.xlabel.is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{:.3}" y="{:.3}" text-anchor="middle" font-size="{font_px:.3}" fill="{}" fill-opacity="{}">{}</text>"#,
            p.center().x,
            x_label_baseline + label_pad + font_px,
            fg.to_hex_rgb(),
            fg.opacity(),
            escape_xml(&text.xlabel)
        );
    }
    if !text.ylabel.is_empty() {
        let x = p.x0 - tick_len - tick_pad - widest_y_label - label_pad - 0.2 * font_px;
        let y = p.center().y;
        let _ = write!(
            svg,
            r#"<text x="{x:.3}" y="{y:.3}" transform="rotate(-90 {x:.3} {y:.3})" text-anchor="middle" font-size="{font_px:.3}" fill="{}" fill-opacity="{}">{}</text>"#,
            fg.to_hex_rgb(),
            fg.opacity(),
            escape_xml(&text.ylabel)
        );
    }
    if !text.title.is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{:.3}" y="{:.3}" text-anchor="middle" font-size="{:.3}" fill="{}" fill-opacity="{}">{}</text>"#,
            p.center().x,
            p.y0 - style.px(TITLE_PAD_PT),
            style.px(style.title_size_pt),
            fg.to_hex_rgb(),
            fg.opacity(),
            escape_xml(&text.title)
        );
    }

    write_legend(&mut svg, layout, style, legend);

    svg.push_str("</svg>");
    svg
}

/// Legend in the upper-right corner of the axes, without a frame.
fn write_legend(svg: &mut String, layout: &AxesLayout, style: &PlotStyle, legend: &[LegendEntry]) {
    if legend.is_empty() {
        return;
    }
    let p = layout.plot;
    let font_px = style.px(style.font_size_pt);
    let handle_len = 2.0 * font_px;
    let handle_pad = 0.8 * font_px;
    let border_pad = 0.4 * font_px;
    let axes_pad = 0.5 * font_px;
    let row_h = 1.5 * font_px;
    let line_w = style.px(style.line_width_pt);

    let text_w = legend
        .iter()
        .map(|e| estimate_text_width(&e.label, font_px))
        .fold(0.0f64, f64::max);
    let left = p.x1 - axes_pad - border_pad - text_w - handle_pad - handle_len;
    let top = p.y0 + axes_pad + border_pad;

    let fg = style.foreground;
    let _ = write!(
        svg,
        r#"<g font-size="{font_px:.3}" fill="{}" fill-opacity="{}">"#,
        fg.to_hex_rgb(),
        fg.opacity()
    );
    for (i, entry) in legend.iter().enumerate() {
        let mid = top + (i as f64 + 0.5) * row_h;
        let _ = write!(
            svg,
            r#"<line x1="{left:.3}" y1="{mid:.3}" x2="{:.3}" y2="{mid:.3}" stroke="{}" stroke-opacity="{}" stroke-width="{line_w:.3}"/>"#,
            left + handle_len,
            entry.color.to_hex_rgb(),
            entry.color.opacity()
        );
        let _ = write!(
            svg,
            r#"<text x="{:.3}" y="{:.3}">{}</text>"#,
            left + handle_len + handle_pad,
            mid + 0.35 * font_px,
            escape_xml(&entry.label)
        );
    }
    svg.push_str("</g>");
}

fn estimate_text_width(s: &str, font_px: f64) -> f64 {
    s.chars().count() as f64 * GLYPH_ASPECT * font_px
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Font database with system fonts plus every font file found in `dirs`.
pub fn build_fontdb(dirs: &[impl AsRef<Path>]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in dirs {
        load_fonts_from_dir(&mut db, dir.as_ref());
    }
    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(font = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Rasterize an SVG document into a premultiplied RGBA8 buffer of exactly `canvas` size.
pub fn rasterize_svg(
    svg: &str,
    canvas: Canvas,
    fontdb: Arc<usvg::fontdb::Database>,
) -> OverplotResult<Vec<u8>> {
    let opts = usvg::Options {
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| OverplotError::render(format!("plot chrome svg is invalid: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| OverplotError::render("failed to allocate chrome pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap.take())
}

#[cfg(test)]
#[path = "../../tests/unit/plot/chrome.rs"]
mod tests;

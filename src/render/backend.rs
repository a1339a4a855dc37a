use crate::channel::store::ChannelId;
use crate::foundation::core::{Canvas, FrameIndex, Point, Rgba8};
use crate::foundation::error::OverplotResult;
use crate::foundation::math::unpremultiply_rgba8;
use crate::media::probe::VideoMetadata;
use crate::plot::chrome::ChromeText;
use crate::plot::scale::AxisScale;
use crate::plot::style::PlotStyle;
use crate::timeline::window::RenderWindow;

/// A rendered overlay frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the `premultiplied` flag makes this explicit at API
/// boundaries. Sinks that need straight alpha convert on their side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixels as straight (non-premultiplied) RGBA8, as image files and ffmpeg expect.
    pub fn to_straight_alpha(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = vec![0u8; self.data.len()];
        unpremultiply_rgba8(&mut out, &self.data);
        out
    }
}

/// Capability shared by every render strategy: one pixel buffer per frame index.
pub trait FrameRenderer {
    /// Size of every buffer this renderer produces.
    fn canvas(&self) -> Canvas;

    /// Freeze configuration (axis limits, legend, labels). Idempotent.
    fn finalize(&mut self) -> OverplotResult<()>;

    /// Render `frame`. Frames must be requested in ascending order within one job.
    fn render(&mut self, frame: FrameIndex) -> OverplotResult<FrameRGBA>;
}

/// A renderer that plots registered time-series channels.
pub trait OverlayRenderer: FrameRenderer {
    /// Register a channel; only allowed before finalization.
    fn add_channel(&mut self, label: &str, time: Vec<f64>, data: Vec<f64>)
    -> OverplotResult<ChannelId>;

    /// Number of registered channels.
    fn channel_count(&self) -> usize;
}

/// Per-frame update of one drawable line, in pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct LineUpdate {
    /// Channel owning the line.
    pub channel: ChannelId,
    /// Stroke colour.
    pub color: Rgba8,
    /// Polyline vertices; `None` marks a gap (non-finite sample).
    pub points: Vec<Option<Point>>,
}

impl LineUpdate {
    /// Return `true` when at least one segment would be painted.
    pub fn has_segment(&self) -> bool {
        self.points
            .windows(2)
            .any(|w| w[0].is_some() && w[1].is_some())
    }
}

/// Artists touched by one [`IncrementalRenderer::update`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangedArtists {
    /// Window the update was computed for.
    pub window: Option<RenderWindow>,
    /// One entry per channel line, in registration order.
    pub lines: Vec<LineUpdate>,
}

/// Split of a frame render into "what changed" and "how to paint it".
pub trait IncrementalRenderer {
    /// Re-slice every channel to `window` and return the updated line artists.
    fn update(&mut self, window: RenderWindow) -> OverplotResult<ChangedArtists>;

    /// Paint `changed` onto the persistent surface and read back the full frame.
    fn rasterize(&mut self, changed: &ChangedArtists) -> OverplotResult<FrameRGBA>;
}

/// Available render strategies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Time-series line graph with a trailing data window.
    #[default]
    LineGraph,
}

/// Strategy-independent renderer configuration.
#[derive(Clone, Debug)]
pub struct RendererOpts {
    /// Data time at the first video frame, in seconds.
    pub data_time_at_video_start: f64,
    /// Title and axis labels.
    pub text: ChromeText,
    /// Value axis range policy.
    pub scale: AxisScale,
    /// Appearance.
    pub style: PlotStyle,
}

/// Create the renderer for `strategy`, sized and timed from `meta`.
pub fn create_renderer(
    strategy: RenderStrategy,
    meta: &VideoMetadata,
    opts: RendererOpts,
) -> OverplotResult<Box<dyn OverlayRenderer>> {
    match strategy {
        RenderStrategy::LineGraph => Ok(Box::new(
            crate::render::line_graph::LineGraphRenderer::new(meta, opts)?,
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;

use crate::channel::store::{ChannelId, ChannelStore};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{OverplotError, OverplotResult};
use crate::media::probe::VideoMetadata;
use crate::plot::chrome::{ChromeText, LegendEntry, build_chrome_svg, build_fontdb, rasterize_svg};
use crate::plot::layout::AxesLayout;
use crate::plot::scale::AxisScale;
use crate::plot::style::PlotStyle;
use crate::render::backend::{
    ChangedArtists, FrameRGBA, FrameRenderer, IncrementalRenderer, LineUpdate, OverlayRenderer,
    RendererOpts,
};
use crate::render::cpu::LineRasterizer;
use crate::timeline::window::{RenderWindow, window};

/// Lifecycle of a [`LineGraphRenderer`]. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// Channels may be added; axis limits are not fixed yet.
    Configuring,
    /// Axis limits, legend and labels are fixed; channels are frozen.
    Finalized,
    /// At least one frame has been produced.
    Rendering,
}

/// State that only exists once the renderer is finalized.
struct Surface {
    layout: AxesLayout,
    /// Premultiplied RGBA8; starts as the static chrome and accumulates line segments.
    pixels: Vec<u8>,
    rasterizer: LineRasterizer,
}

/// Line-graph render strategy.
///
/// Every frame shows only the samples of its trailing window, painted on top of everything
/// painted by earlier frames, so the trace grows as the video plays. One instance serves exactly
/// one job; build a new one for the next job.
pub struct LineGraphRenderer {
    canvas: Canvas,
    data_time_at_video_start: f64,
    duration_sec: f64,
    interval: f64,
    scale: AxisScale,
    text: ChromeText,
    style: PlotStyle,
    store: ChannelStore,
    state: RenderState,
    surface: Option<Surface>,
    last_frame: Option<FrameIndex>,
}

impl LineGraphRenderer {
    /// Create a renderer in the [`RenderState::Configuring`] state.
    pub fn new(meta: &VideoMetadata, opts: RendererOpts) -> OverplotResult<Self> {
        opts.style.validate()?;
        if !opts.data_time_at_video_start.is_finite() {
            return Err(OverplotError::validation(
                "data_time_at_video_start must be finite",
            ));
        }
        Ok(Self {
            canvas: meta.canvas(),
            data_time_at_video_start: opts.data_time_at_video_start,
            duration_sec: meta.duration_sec,
            interval: meta.frame_interval(),
            scale: opts.scale,
            text: opts.text,
            style: opts.style,
            store: ChannelStore::new(),
            state: RenderState::Configuring,
            surface: None,
            last_frame: None,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Registered channels.
    pub fn channels(&self) -> &ChannelStore {
        &self.store
    }

    /// Resolved axes geometry, once finalized.
    pub fn layout(&self) -> Option<&AxesLayout> {
        self.surface.as_ref().map(|s| &s.layout)
    }

    /// Time-axis limits: the video span in data time.
    pub fn x_range(&self) -> (f64, f64) {
        (
            self.data_time_at_video_start,
            self.data_time_at_video_start + self.duration_sec,
        )
    }

    fn legend(&self) -> Vec<LegendEntry> {
        self.store
            .iter()
            .map(|(id, c)| LegendEntry {
                label: c.label.clone(),
                color: self.style.line_color(id.0 as usize),
            })
            .collect()
    }
}

impl FrameRenderer for LineGraphRenderer {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn finalize(&mut self) -> OverplotResult<()> {
        if self.state != RenderState::Configuring {
            return Ok(());
        }

        let y_range = self.scale.resolve(&self.store)?;
        let x_range = self.x_range();
        let layout = AxesLayout::new(self.canvas, x_range, y_range)?;

        for (_, c) in self.store.iter() {
            if c.slice(x_range.0, x_range.1).is_empty() {
                tracing::warn!(channel = %c.label, "channel has no samples inside the video span");
            }
        }

        let svg = build_chrome_svg(&layout, &self.style, &self.text, &self.legend());
        let fontdb = build_fontdb(self.style.font_dirs.as_slice());
        let pixels = rasterize_svg(&svg, self.canvas, fontdb)?;
        let rasterizer = LineRasterizer::new(self.canvas)?;

        tracing::info!(
            channels = self.store.len(),
            x_min = x_range.0,
            x_max = x_range.1,
            y_min = y_range.0,
            y_max = y_range.1,
            "plot finalized"
        );
        self.surface = Some(Surface {
            layout,
            pixels,
            rasterizer,
        });
        self.state = RenderState::Finalized;
        Ok(())
    }

    fn render(&mut self, frame: FrameIndex) -> OverplotResult<FrameRGBA> {
        if let Some(last) = self.last_frame
            && frame <= last
        {
            return Err(OverplotError::render(format!(
                "frame {} requested after frame {}; frames must ascend",
                frame.0, last.0
            )));
        }
        self.finalize()?;
        self.state = RenderState::Rendering;
        self.last_frame = Some(frame);

        let w = window(frame, self.data_time_at_video_start, self.interval);
        let changed = self.update(w)?;
        self.rasterize(&changed)
    }
}

impl IncrementalRenderer for LineGraphRenderer {
    fn update(&mut self, w: RenderWindow) -> OverplotResult<ChangedArtists> {
        let layout = self
            .surface
            .as_ref()
            .map(|s| s.layout)
            .ok_or_else(|| OverplotError::render("line graph renderer is not finalized"))?;

        let lines = self
            .store
            .iter()
            .map(|(id, c)| {
                let slice = c.slice(w.start, w.end);
                LineUpdate {
                    channel: id,
                    color: self.style.line_color(id.0 as usize),
                    points: slice
                        .points()
                        .map(|(t, v)| v.is_finite().then(|| layout.to_px(t, v)))
                        .collect(),
                }
            })
            .collect();

        Ok(ChangedArtists {
            window: Some(w),
            lines,
        })
    }

    fn rasterize(&mut self, changed: &ChangedArtists) -> OverplotResult<FrameRGBA> {
        let line_width = self.style.px(self.style.line_width_pt);
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| OverplotError::render("line graph renderer is not finalized"))?;

        let clip = surface.layout.plot_px_bounds();
        surface
            .rasterizer
            .paint_lines(&changed.lines, line_width, clip, &mut surface.pixels)?;

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: surface.pixels.clone(),
            premultiplied: true,
        })
    }
}

impl OverlayRenderer for LineGraphRenderer {
    fn add_channel(
        &mut self,
        label: &str,
        time: Vec<f64>,
        data: Vec<f64>,
    ) -> OverplotResult<ChannelId> {
        if self.state != RenderState::Configuring {
            return Err(OverplotError::validation(format!(
                "cannot add channel '{label}': renderer is finalized and channels are frozen"
            )));
        }
        self.store.register(label, time, data)
    }

    fn channel_count(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/line_graph.rs"]
mod tests;

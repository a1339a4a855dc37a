use crate::channel::store::ChannelId;
use crate::encode::ffmpeg::{CompositorOpts, CompositorSink};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OverplotError, OverplotResult};
use crate::media::probe::{VideoMetadata, probe_video};
use crate::plot::chrome::ChromeText;
use crate::plot::scale::AxisScale;
use crate::plot::style::PlotStyle;
use crate::render::backend::{
    FrameRGBA, OverlayRenderer, RenderStrategy, RendererOpts, create_renderer,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Default time-axis label.
pub const DEFAULT_XLABEL: &str = "Time (seconds)";

/// Everything needed to set up one overlay job, apart from the channels.
#[derive(Clone, Debug)]
pub struct JobOptions {
    /// Source video.
    pub video_file: PathBuf,
    /// Composited output video.
    pub output_path: PathBuf,
    /// Data time (seconds) that lines up with the first video frame.
    pub data_time_at_video_start: f64,
    /// Figure title.
    pub title: String,
    /// Value axis label.
    pub ylabel: String,
    /// Time axis label.
    pub xlabel: String,
    /// Explicit value axis range; derived from the data when `None`.
    pub ylim: Option<(f64, f64)>,
    /// Slow-motion factor: the probed duration is divided by it.
    pub slowmo_amount: Option<f64>,
    /// Appearance.
    pub style: PlotStyle,
    /// Compositor invocation.
    pub compositor: CompositorOpts,
    /// Render strategy.
    pub strategy: RenderStrategy,
}

impl JobOptions {
    /// Options with default labels, style and compositor.
    pub fn new(
        video_file: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        data_time_at_video_start: f64,
    ) -> Self {
        Self {
            video_file: video_file.into(),
            output_path: output_path.into(),
            data_time_at_video_start,
            title: String::new(),
            ylabel: String::new(),
            xlabel: DEFAULT_XLABEL.to_string(),
            ylim: None,
            slowmo_amount: None,
            style: PlotStyle::default(),
            compositor: CompositorOpts::default(),
            strategy: RenderStrategy::default(),
        }
    }
}

/// Outcome of a completed render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStats {
    /// Frames rendered and handed to the sink.
    pub frames_written: u64,
    /// Wall-clock time of the whole pass.
    pub elapsed: Duration,
}

impl RenderStats {
    /// Average rendering throughput.
    pub fn frames_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames_written as f64 / secs
        } else {
            0.0
        }
    }
}

/// One overlay job.
///
/// Construct it, add channels, then consume it with exactly one render call. Rendering again
/// needs a fresh job, since the renderer's surface keeps everything painted so far.
pub struct OverlayJob {
    meta: VideoMetadata,
    video_file: PathBuf,
    output_path: PathBuf,
    compositor: CompositorOpts,
    renderer: Box<dyn OverlayRenderer>,
}

impl std::fmt::Debug for OverlayJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayJob")
            .field("meta", &self.meta)
            .field("video_file", &self.video_file)
            .field("output_path", &self.output_path)
            .field("channels", &self.renderer.channel_count())
            .finish_non_exhaustive()
    }
}

impl OverlayJob {
    /// Probe `opts.video_file` and set up the job.
    #[tracing::instrument(level = "debug", skip(opts), fields(video = %opts.video_file.display()))]
    pub fn new(opts: JobOptions) -> OverplotResult<Self> {
        let meta = probe_video(&opts.video_file)?;
        Self::from_metadata(meta, opts)
    }

    /// Set up a job from already known metadata; nothing is probed.
    ///
    /// `opts.slowmo_amount` is applied to `meta` here.
    pub fn from_metadata(meta: VideoMetadata, opts: JobOptions) -> OverplotResult<Self> {
        let meta = match opts.slowmo_amount {
            Some(divisor) => meta.with_slowmo(divisor)?,
            None => meta,
        };
        opts.compositor.validate()?;

        let renderer = create_renderer(
            opts.strategy,
            &meta,
            RendererOpts {
                data_time_at_video_start: opts.data_time_at_video_start,
                text: ChromeText {
                    title: opts.title,
                    xlabel: opts.xlabel,
                    ylabel: opts.ylabel,
                },
                scale: AxisScale::from_ylim(opts.ylim),
                style: opts.style,
            },
        )?;

        Ok(Self {
            meta,
            video_file: opts.video_file,
            output_path: opts.output_path,
            compositor: opts.compositor,
            renderer,
        })
    }

    /// Effective video metadata (after slow-motion scaling).
    pub fn metadata(&self) -> &VideoMetadata {
        &self.meta
    }

    /// Composited output path.
    pub fn output_path(&self) -> &std::path::Path {
        &self.output_path
    }

    /// Number of registered channels.
    pub fn channel_count(&self) -> usize {
        self.renderer.channel_count()
    }

    /// Register a channel. `time` must be non-decreasing and as long as `data`.
    pub fn add_channel(
        &mut self,
        time: Vec<f64>,
        data: Vec<f64>,
        label: &str,
    ) -> OverplotResult<ChannelId> {
        self.renderer.add_channel(label, time, data)
    }

    /// Render every frame and composite the result over the source video with ffmpeg.
    pub fn render_video(self) -> OverplotResult<RenderStats> {
        let mut sink = CompositorSink::new(
            self.video_file.clone(),
            self.output_path.clone(),
            self.compositor.clone(),
        );
        let stats = self.render_into(&mut sink)?;
        tracing::info!(
            out = %sink.out_path().display(),
            seconds = stats.elapsed.as_secs_f64(),
            "saved composited video"
        );
        Ok(stats)
    }

    /// Render frames `0..frame_count` in order into `sink`.
    #[tracing::instrument(level = "info", skip(self, sink), fields(frames = self.meta.frame_count))]
    pub fn render_into(mut self, sink: &mut dyn FrameSink) -> OverplotResult<RenderStats> {
        let started = Instant::now();
        let total = self.meta.frame_count;

        self.renderer.finalize()?;
        sink.begin(SinkConfig {
            canvas: self.meta.canvas(),
            frame_count: total,
        })?;

        let progress_step = (total / 10).max(1);
        for i in 0..total {
            let idx = FrameIndex(i);
            let frame = self.renderer.render(idx)?;
            sink.push_frame(idx, &frame)?;

            let done = i + 1;
            if done % progress_step == 0 || done == total {
                tracing::info!(
                    done,
                    total,
                    percent = done * 100 / total,
                    "rendering overlay"
                );
            }
        }
        sink.end()?;

        let stats = RenderStats {
            frames_written: total,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            frames = stats.frames_written,
            seconds = stats.elapsed.as_secs_f64(),
            fps = stats.frames_per_second(),
            "render finished"
        );
        Ok(stats)
    }

    /// Render frames `0..=frame` and return the last one, without compositing.
    ///
    /// Earlier frames are rendered too because each frame paints on top of its predecessors.
    pub fn render_preview(mut self, frame: FrameIndex) -> OverplotResult<FrameRGBA> {
        if frame.0 >= self.meta.frame_count {
            return Err(OverplotError::validation(format!(
                "frame {} is out of range (video has {} frames)",
                frame.0, self.meta.frame_count
            )));
        }
        self.renderer.finalize()?;
        let mut last = None;
        for i in 0..=frame.0 {
            last = Some(self.renderer.render(FrameIndex(i))?);
        }
        last.ok_or_else(|| OverplotError::render("no frame was rendered"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/overlay.rs"]
mod tests;

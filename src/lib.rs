//! Overplot draws time-synchronized telemetry line graphs on top of a video.
//!
//! A job probes the source video, takes one or more time-series channels, and renders one
//! transparent overlay frame per video frame. Each frame shows the samples that fall into the
//! trailing time window ending at that frame's nominal time. Frames are streamed in order into a
//! [`FrameSink`]; [`CompositorSink`] pipes them into `ffmpeg`, which composites them over the
//! source video and copies its audio.
//!
//! - Describe a job with [`JobOptions`] or a [`JobFile`]
//! - Build an [`OverlayJob`] and register channels
//! - Consume it with [`OverlayJob::render_video`], [`OverlayJob::render_into`] or
//!   [`OverlayJob::render_preview`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod channel;
mod encode;
mod foundation;
mod job;
mod media;
mod plot;
mod render;
mod timeline;

pub use crate::foundation::core::{Canvas, FrameIndex, Point, Rect, Rgba8};
pub use crate::foundation::error::{OverplotError, OverplotResult};

pub use crate::channel::store::{Channel, ChannelId, ChannelSlice, ChannelStore};
pub use crate::encode::ffmpeg::{
    CompositorOpts, CompositorSink, compositor_args, ensure_parent_dir, is_tool_on_path,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::job::config::{ChannelFile, ChannelSpec, JobFile, LoadedChannel};
pub use crate::job::overlay::{DEFAULT_XLABEL, JobOptions, OverlayJob, RenderStats};
pub use crate::media::probe::{VideoMetadata, parse_probe_json, probe_video};
pub use crate::plot::chrome::{ChromeText, LegendEntry};
pub use crate::plot::layout::AxesLayout;
pub use crate::plot::scale::{AxisScale, YLIM_MARGIN};
pub use crate::plot::style::{PlotStyle, TAB10};
pub use crate::render::backend::{
    ChangedArtists, FrameRGBA, FrameRenderer, IncrementalRenderer, LineUpdate, OverlayRenderer,
    RenderStrategy, RendererOpts, create_renderer,
};
pub use crate::render::line_graph::{LineGraphRenderer, RenderState};
pub use crate::timeline::window::{RenderWindow, window};

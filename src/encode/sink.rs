use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{OverplotError, OverplotResult};
use crate::render::backend::FrameRGBA;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame size in pixels.
    pub canvas: Canvas,
    /// Number of frames the driver is going to push.
    pub frame_count: u64,
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing [`FrameIndex`] values,
/// starting at 0, with no gaps.
pub trait FrameSink {
    /// Called once before any frame is pushed.
    fn begin(&mut self, cfg: SinkConfig) -> OverplotResult<()>;
    /// Push the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> OverplotResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> OverplotResult<()>;
}

/// Sink that keeps every frame in memory, for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured by `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Consume the sink and return its frames.
    pub fn into_frames(self) -> Vec<(FrameIndex, FrameRGBA)> {
        self.frames
    }

    /// Return `true` once `end` has been called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> OverplotResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> OverplotResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| OverplotError::validation("in-memory sink not started"))?;
        check_frame(cfg, self.frames.last().map(|(i, _)| *i), idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> OverplotResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Enforce the ordering contract and frame geometry shared by every sink.
pub(crate) fn check_frame(
    cfg: SinkConfig,
    last: Option<FrameIndex>,
    idx: FrameIndex,
    frame: &FrameRGBA,
) -> OverplotResult<()> {
    let expected = last.map_or(0, |l| l.0 + 1);
    if idx.0 != expected {
        return Err(OverplotError::validation(format!(
            "sink received frame {} but expected frame {expected}",
            idx.0
        )));
    }
    if frame.width != cfg.canvas.width || frame.height != cfg.canvas.height {
        return Err(OverplotError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
        )));
    }
    if frame.data.len() != cfg.canvas.rgba_len() {
        return Err(OverplotError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

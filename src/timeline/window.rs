use crate::foundation::core::FrameIndex;

/// Span of data time whose samples are visible in one rendered frame.
///
/// Both bounds are inclusive when slicing, so the sample sitting on a shared boundary appears in
/// two consecutive frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderWindow {
    /// Window start in data-time seconds.
    pub start: f64,
    /// Window end in data-time seconds.
    pub end: f64,
}

impl RenderWindow {
    /// Window length in seconds.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// Trailing window for `frame`: one interval ending at the frame's nominal time.
///
/// `start = offset + (frame - 1) * interval`, `end = offset + frame * interval`. Frame 0 therefore
/// looks one interval *before* the video start.
pub fn window(frame: FrameIndex, offset: f64, interval: f64) -> RenderWindow {
    let f = frame.0 as f64;
    RenderWindow {
        start: offset + (f - 1.0) * interval,
        end: offset + f * interval,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/window.rs"]
mod tests;

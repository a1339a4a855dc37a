use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{OverplotError, OverplotResult};

/// Timing and geometry of the source video, as reported by `ffprobe`.
///
/// Immutable once probed. `duration_sec` may have been rescaled by a slow-motion divisor (see
/// [`VideoMetadata::with_slowmo`]); `frame_count` never is.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct VideoMetadata {
    /// Effective duration in seconds.
    pub duration_sec: f64,
    /// Number of frames in the first video stream.
    pub frame_count: u64,
    /// Coded width in pixels.
    pub width: u32,
    /// Coded height in pixels.
    pub height: u32,
}

impl VideoMetadata {
    /// Build validated metadata.
    pub fn new(duration_sec: f64, frame_count: u64, width: u32, height: u32) -> OverplotResult<Self> {
        if !duration_sec.is_finite() || duration_sec <= 0.0 {
            return Err(OverplotError::media(format!(
                "video duration must be positive, got {duration_sec}"
            )));
        }
        if frame_count == 0 {
            return Err(OverplotError::media("video frame count must be non-zero"));
        }
        if width == 0 || height == 0 {
            return Err(OverplotError::media(format!(
                "video dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            duration_sec,
            frame_count,
            width,
            height,
        })
    }

    /// Divide the duration by `divisor`, stretching playback relative to data time.
    ///
    /// Must be applied before [`VideoMetadata::frame_interval`] is used.
    pub fn with_slowmo(mut self, divisor: f64) -> OverplotResult<Self> {
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(OverplotError::validation(format!(
                "slowmo_amount must be a positive number, got {divisor}"
            )));
        }
        self.duration_sec /= divisor;
        Ok(self)
    }

    /// Seconds of data time represented by one frame.
    pub fn frame_interval(&self) -> f64 {
        self.duration_sec / self.frame_count as f64
    }

    /// Frame geometry.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
    avg_frame_rate: Option<String>,
    coded_width: Option<u32>,
    coded_height: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe `path` with the system `ffprobe` binary.
///
/// Fails with a validation error when `path` is not an existing file, and with a media error
/// when `ffprobe` fails or reports no usable video stream.
#[tracing::instrument(level = "debug")]
pub fn probe_video(path: &Path) -> OverplotResult<VideoMetadata> {
    if !path.is_file() {
        return Err(OverplotError::validation(format!(
            "provided video_file path is not a file: '{}'",
            path.display()
        )));
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| OverplotError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(OverplotError::media(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let meta = parse_probe_json(&out.stdout).map_err(|e| match e {
        OverplotError::Media(msg) => {
            OverplotError::media(format!("{msg} in file '{}'", path.display()))
        }
        other => other,
    })?;

    tracing::info!(
        video = %path.display(),
        duration_sec = meta.duration_sec,
        frames = meta.frame_count,
        width = meta.width,
        height = meta.height,
        "loaded video"
    );
    Ok(meta)
}

/// Extract [`VideoMetadata`] from `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(bytes: &[u8]) -> OverplotResult<VideoMetadata> {
    let parsed: ProbeOut = serde_json::from_slice(bytes)
        .map_err(|e| OverplotError::media(format!("ffprobe json parse failed: {e}")))?;

    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| OverplotError::media("no video stream found"))?;

    let duration_sec = parse_f64(stream.duration.as_deref())
        .or_else(|| parse_f64(parsed.format.as_ref().and_then(|f| f.duration.as_deref())))
        .ok_or_else(|| OverplotError::media("missing video duration from ffprobe"))?;

    let frame_count = match stream.nb_frames.as_deref().and_then(|s| s.parse::<u64>().ok()) {
        Some(n) if n > 0 => n,
        _ => {
            let (num, den) = stream
                .avg_frame_rate
                .as_deref()
                .and_then(parse_ff_ratio)
                .ok_or_else(|| {
                    OverplotError::media("missing nb_frames and avg_frame_rate from ffprobe")
                })?;
            (duration_sec * f64::from(num) / f64::from(den)).round() as u64
        }
    };

    let width = stream
        .coded_width
        .filter(|&w| w > 0)
        .or(stream.width)
        .ok_or_else(|| OverplotError::media("missing video width from ffprobe"))?;
    let height = stream
        .coded_height
        .filter(|&h| h > 0)
        .or(stream.height)
        .ok_or_else(|| OverplotError::media("missing video height from ffprobe"))?;

    VideoMetadata::new(duration_sec, frame_count, width, height)
}

fn parse_f64(s: Option<&str>) -> Option<f64> {
    s?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;

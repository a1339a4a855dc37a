use crate::encode::sink::{FrameSink, SinkConfig, check_frame};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{OverplotError, OverplotResult};
use crate::foundation::math::unpremultiply_rgba8;
use crate::render::backend::FrameRGBA;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};

/// How the external compositor is invoked.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorOpts {
    /// `ffmpeg` executable name or path.
    pub ffmpeg: PathBuf,
    /// Nominal rate of the raw overlay stream, in frames per second.
    pub input_rate: u32,
    /// Output video encoder.
    pub video_codec: String,
    /// Hardware decoder for the source video (for example `d3d11va`, `vaapi`).
    pub hwaccel: Option<String>,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            input_rate: 60,
            video_codec: "libx264".to_string(),
            hwaccel: None,
            overwrite: true,
        }
    }
}

impl CompositorOpts {
    /// Reject settings ffmpeg could never accept.
    pub fn validate(&self) -> OverplotResult<()> {
        if self.input_rate == 0 {
            return Err(OverplotError::validation(
                "compositor input_rate must be non-zero",
            ));
        }
        if self.video_codec.trim().is_empty() {
            return Err(OverplotError::validation(
                "compositor video_codec must not be empty",
            ));
        }
        if self.hwaccel.as_deref().is_some_and(|h| h.trim().is_empty()) {
            return Err(OverplotError::validation(
                "compositor hwaccel must not be empty when set",
            ));
        }
        Ok(())
    }
}

/// Argument vector for compositing a raw RGBA stream from stdin over `video`.
///
/// Source audio is copied when present; the output ends with the shorter stream.
pub fn compositor_args(
    video: &Path,
    out_path: &Path,
    canvas: Canvas,
    opts: &CompositorOpts,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |s: &str| args.push(OsString::from(s));

    push(if opts.overwrite { "-y" } else { "-n" });
    push("-loglevel");
    push("error");
    if let Some(hw) = opts.hwaccel.as_deref() {
        push("-hwaccel");
        push(hw);
    }
    push("-i");
    args.push(video.as_os_str().to_owned());

    let size = format!("{}x{}", canvas.width, canvas.height);
    let rate = opts.input_rate.to_string();
    for s in [
        "-f",
        "rawvideo",
        "-vcodec",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        size.as_str(),
        "-r",
        rate.as_str(),
        "-i",
        "pipe:0",
        "-filter_complex",
        "[0:v:0][1:v:0]overlay[out]",
        "-shortest",
        "-map",
        "[out]",
        "-map",
        "0:a?",
        "-c:a",
        "copy",
        "-c:v",
        opts.video_codec.as_str(),
        "-pix_fmt",
        "yuv420p",
    ] {
        args.push(OsString::from(s));
    }
    args.push(out_path.as_os_str().to_owned());
    args
}

/// Sink that spawns `ffmpeg` and composites the streamed overlay frames over the source video.
///
/// Writes block when ffmpeg's stdin is full, which throttles rendering to the encoder's pace.
pub struct CompositorSink {
    video: PathBuf,
    out_path: PathBuf,
    opts: CompositorOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl CompositorSink {
    /// Create a sink writing the composite of `video` and the overlay to `out_path`.
    pub fn new(
        video: impl Into<PathBuf>,
        out_path: impl Into<PathBuf>,
        opts: CompositorOpts,
    ) -> Self {
        Self {
            video: video.into(),
            out_path: out_path.into(),
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Output file path.
    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    /// Close stdin, wait for ffmpeg and collect whatever it printed on stderr.
    fn reap(&mut self) -> OverplotResult<(ExitStatus, String)> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| OverplotError::composition("compositor not started"))?;

        let status = child.wait().map_err(|e| {
            OverplotError::composition(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| OverplotError::composition("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| {
                    OverplotError::composition(format!("ffmpeg stderr read failed: {e}"))
                })?,
            None => Vec::new(),
        };
        Ok((
            status,
            String::from_utf8_lossy(&stderr_bytes).trim().to_string(),
        ))
    }
}

impl FrameSink for CompositorSink {
    #[tracing::instrument(level = "debug", skip(self), fields(out = %self.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> OverplotResult<()> {
        self.opts.validate()?;
        if cfg.canvas.width == 0 || cfg.canvas.height == 0 {
            return Err(OverplotError::validation(
                "compositor width/height must be non-zero",
            ));
        }
        if !cfg.canvas.width.is_multiple_of(2) || !cfg.canvas.height.is_multiple_of(2) {
            return Err(OverplotError::validation(format!(
                "compositor width/height must be even for yuv420p output, got {}x{}",
                cfg.canvas.width, cfg.canvas.height
            )));
        }
        if !self.video.is_file() {
            return Err(OverplotError::validation(format!(
                "video file '{}' does not exist",
                self.video.display()
            )));
        }

        ensure_parent_dir(&self.out_path)?;
        if !self.opts.overwrite && self.out_path.exists() {
            return Err(OverplotError::validation(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }

        let args = compositor_args(&self.video, &self.out_path, cfg.canvas, &self.opts);
        tracing::debug!(ffmpeg = %self.opts.ffmpeg.display(), ?args, "spawning compositor");

        let mut child = Command::new(&self.opts.ffmpeg)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                OverplotError::composition(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.opts.ffmpeg.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| OverplotError::composition("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| OverplotError::composition("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; cfg.canvas.rgba_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> OverplotResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| OverplotError::composition("compositor not started"))?;
        check_frame(cfg, self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);

        // ffmpeg's rgba is straight alpha.
        if frame.premultiplied {
            unpremultiply_rgba8(&mut self.scratch, &frame.data);
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(OverplotError::composition("compositor is already finished"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&self.scratch) {
            let detail = match self.reap() {
                Ok((status, stderr)) if stderr.is_empty() => format!("ffmpeg {status}"),
                Ok((status, stderr)) => format!("ffmpeg {status}: {stderr}"),
                Err(reap_err) => reap_err.to_string(),
            };
            self.cfg = None;
            return Err(OverplotError::composition(format!(
                "failed to write frame {} to ffmpeg stdin: {e} ({detail})",
                idx.0
            )));
        }
        Ok(())
    }

    fn end(&mut self) -> OverplotResult<()> {
        let (status, stderr) = self.reap()?;
        self.cfg = None;
        if !status.success() {
            return Err(OverplotError::composition(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }
        if !stderr.is_empty() {
            tracing::warn!(%stderr, "ffmpeg reported problems");
        }
        tracing::debug!(frames = self.last_idx.map_or(0, |i| i.0 + 1), "compositor finished");
        Ok(())
    }
}

impl Drop for CompositorSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> OverplotResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `program -version` runs successfully.
pub fn is_tool_on_path(program: impl AsRef<std::ffi::OsStr>) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

use crate::encode::ffmpeg::CompositorOpts;
use crate::foundation::error::{OverplotError, OverplotResult};
use crate::job::overlay::{DEFAULT_XLABEL, JobOptions, OverlayJob};
use crate::plot::style::PlotStyle;
use crate::render::backend::RenderStrategy;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn default_xlabel() -> String {
    DEFAULT_XLABEL.to_string()
}

/// JSON description of one overlay job.
///
/// Relative paths (video, output, channel files) are resolved against the directory of the job
/// file when loaded with [`JobFile::from_path`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    /// Source video.
    pub video_file: PathBuf,
    /// Composited output video.
    pub output_path: PathBuf,
    /// Data time (seconds) at the first video frame.
    pub data_time_at_video_start: f64,
    /// Figure title.
    #[serde(default)]
    pub title: String,
    /// Value axis label.
    #[serde(default)]
    pub ylabel: String,
    /// Time axis label.
    #[serde(default = "default_xlabel")]
    pub xlabel: String,
    /// Explicit value axis range `[min, max]`.
    #[serde(default)]
    pub ylim: Option<(f64, f64)>,
    /// Slow-motion factor.
    #[serde(default)]
    pub slowmo_amount: Option<f64>,
    /// Render strategy.
    #[serde(default)]
    pub strategy: RenderStrategy,
    /// Appearance.
    #[serde(default)]
    pub style: PlotStyle,
    /// Compositor invocation.
    #[serde(default)]
    pub compositor: CompositorOpts,
    /// Channels in legend order.
    pub channels: Vec<ChannelSpec>,

    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// One channel entry: inline samples, or a channel file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelSpec {
    /// Legend label; overrides the channel file's `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Inline sample times in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Vec<f64>>,
    /// Inline sample values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<f64>>,
    /// Channel file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// On-disk channel file: `{ "name": .., "time": [..], "data": [..] }`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelFile {
    /// Channel name, used as the legend label unless overridden.
    pub name: String,
    /// Sample times in seconds.
    pub time: Vec<f64>,
    /// Sample values.
    pub data: Vec<f64>,
}

/// A channel ready for registration.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedChannel {
    /// Legend label.
    pub label: String,
    /// Sample times.
    pub time: Vec<f64>,
    /// Sample values.
    pub data: Vec<f64>,
}

impl ChannelFile {
    /// Read a channel file.
    pub fn from_path(path: impl AsRef<Path>) -> OverplotResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OverplotError::validation(format!("open channel file '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            OverplotError::serde(format!("parse channel file '{}': {e}", path.display()))
        })
    }
}

impl JobFile {
    /// Parse a job from a JSON reader. Relative paths stay relative to the working directory.
    pub fn from_reader<R: std::io::Read>(r: R) -> OverplotResult<Self> {
        serde_json::from_reader(r).map_err(|e| OverplotError::serde(format!("parse job JSON: {e}")))
    }

    /// Parse a job file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> OverplotResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OverplotError::validation(format!("open job file '{}': {e}", path.display()))
        })?;
        let mut job = Self::from_reader(BufReader::new(f))?;
        job.base_dir = path.parent().map(Path::to_path_buf);
        Ok(job)
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        }
    }

    /// Check everything that can be checked without touching the video.
    pub fn validate(&self) -> OverplotResult<()> {
        if self.video_file.as_os_str().is_empty() {
            return Err(OverplotError::validation("video_file must not be empty"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(OverplotError::validation("output_path must not be empty"));
        }
        if !self.data_time_at_video_start.is_finite() {
            return Err(OverplotError::validation(
                "data_time_at_video_start must be finite",
            ));
        }
        if let Some(s) = self.slowmo_amount
            && !(s.is_finite() && s > 0.0)
        {
            return Err(OverplotError::validation(format!(
                "slowmo_amount must be a positive number, got {s}"
            )));
        }
        if let Some((min, max)) = self.ylim
            && !(min.is_finite() && max.is_finite() && min < max)
        {
            return Err(OverplotError::validation(format!(
                "ylim must be finite with min < max, got [{min}, {max}]"
            )));
        }
        if self.channels.is_empty() {
            return Err(OverplotError::validation("job has no channels"));
        }
        for (i, c) in self.channels.iter().enumerate() {
            match (&c.path, &c.time, &c.data) {
                (Some(_), None, None) => {}
                (None, Some(t), Some(d)) => {
                    if c.label.is_none() {
                        return Err(OverplotError::validation(format!(
                            "channels[{i}]: inline channel needs a label"
                        )));
                    }
                    if t.len() != d.len() {
                        return Err(OverplotError::validation(format!(
                            "channels[{i}]: time has {} samples but data has {}",
                            t.len(),
                            d.len()
                        )));
                    }
                }
                _ => {
                    return Err(OverplotError::validation(format!(
                        "channels[{i}]: give either `path` or both `time` and `data`"
                    )));
                }
            }
        }
        self.style.validate()?;
        self.compositor.validate()
    }

    /// Job options with every path resolved.
    pub fn options(&self) -> JobOptions {
        JobOptions {
            video_file: self.resolve(&self.video_file),
            output_path: self.resolve(&self.output_path),
            data_time_at_video_start: self.data_time_at_video_start,
            title: self.title.clone(),
            ylabel: self.ylabel.clone(),
            xlabel: self.xlabel.clone(),
            ylim: self.ylim,
            slowmo_amount: self.slowmo_amount,
            style: self.style.clone(),
            compositor: self.compositor.clone(),
            strategy: self.strategy,
        }
    }

    /// Load every channel, reading channel files as needed.
    pub fn load_channels(&self) -> OverplotResult<Vec<LoadedChannel>> {
        self.channels
            .iter()
            .map(|c| match &c.path {
                Some(p) => {
                    let file = ChannelFile::from_path(self.resolve(p))?;
                    Ok(LoadedChannel {
                        label: c.label.clone().unwrap_or(file.name),
                        time: file.time,
                        data: file.data,
                    })
                }
                None => Ok(LoadedChannel {
                    label: c.label.clone().unwrap_or_default(),
                    time: c.time.clone().unwrap_or_default(),
                    data: c.data.clone().unwrap_or_default(),
                }),
            })
            .collect()
    }

    /// Validate, probe the video and register every channel.
    pub fn into_job(self) -> OverplotResult<OverlayJob> {
        self.validate()?;
        let channels = self.load_channels()?;
        let mut job = OverlayJob::new(self.options())?;
        register_all(&mut job, channels)?;
        Ok(job)
    }

    /// Like [`JobFile::into_job`] but with known metadata instead of probing.
    pub fn into_job_with_metadata(
        self,
        meta: crate::media::probe::VideoMetadata,
    ) -> OverplotResult<OverlayJob> {
        self.validate()?;
        let channels = self.load_channels()?;
        let mut job = OverlayJob::from_metadata(meta, self.options())?;
        register_all(&mut job, channels)?;
        Ok(job)
    }
}

fn register_all(job: &mut OverlayJob, channels: Vec<LoadedChannel>) -> OverplotResult<()> {
    for c in channels {
        job.add_channel(c.time, c.data, &c.label)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/job/config.rs"]
mod tests;

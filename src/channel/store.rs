use crate::foundation::error::{OverplotError, OverplotResult};

/// Handle to a channel registered in a [`ChannelStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(pub u32);

/// A named time-series: non-decreasing timestamps paired with values.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Display label (legend entry).
    pub label: String,
    time: Vec<f64>,
    data: Vec<f64>,
}

impl Channel {
    /// Timestamps in seconds, non-decreasing.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Sample values, same length as [`Channel::time`].
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Return `true` when the channel has no samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Contiguous samples with `start <= t <= end`.
    ///
    /// Window bounds are found by binary search over the sorted time array.
    pub fn slice(&self, start: f64, end: f64) -> ChannelSlice<'_> {
        let lo = self.time.partition_point(|&t| t < start);
        let hi = self.time.partition_point(|&t| t <= end);
        if lo >= hi {
            return ChannelSlice {
                time: &[],
                data: &[],
            };
        }
        ChannelSlice {
            time: &self.time[lo..hi],
            data: &self.data[lo..hi],
        }
    }
}

/// Borrowed window of a channel's samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelSlice<'a> {
    /// Timestamps inside the window.
    pub time: &'a [f64],
    /// Values paired with `time`.
    pub data: &'a [f64],
}

impl ChannelSlice<'_> {
    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Return `true` when no samples fall inside the window.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Iterate `(time, value)` pairs in their original order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.data.iter().copied())
    }
}

/// Owns every channel of one overlay job. Channels are read-only once registered.
#[derive(Clone, Debug, Default)]
pub struct ChannelStore {
    channels: Vec<Channel>,
}

impl ChannelStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel and return its handle.
    ///
    /// `time` must be non-decreasing, free of NaN, and the same length as `data`.
    pub fn register(
        &mut self,
        label: impl Into<String>,
        time: Vec<f64>,
        data: Vec<f64>,
    ) -> OverplotResult<ChannelId> {
        let label = label.into();
        if time.len() != data.len() {
            return Err(OverplotError::validation(format!(
                "channel '{label}': time has {} samples but data has {}",
                time.len(),
                data.len()
            )));
        }
        if let Some(i) = time.iter().position(|t| t.is_nan()) {
            return Err(OverplotError::validation(format!(
                "channel '{label}': time[{i}] is NaN"
            )));
        }
        if let Some(i) = time.windows(2).position(|w| w[1] < w[0]) {
            return Err(OverplotError::validation(format!(
                "channel '{label}': time must be non-decreasing (time[{}] < time[{i}])",
                i + 1
            )));
        }

        let id = ChannelId(
            u32::try_from(self.channels.len())
                .map_err(|_| OverplotError::validation("too many channels"))?,
        );
        tracing::debug!(channel = %label, samples = time.len(), "registered channel");
        self.channels.push(Channel { label, time, data });
        Ok(id)
    }

    /// Look up a channel.
    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(id.0 as usize)
    }

    /// Samples of `id` with `start <= t <= end`; empty when nothing falls in range.
    pub fn slice(&self, id: ChannelId, start: f64, end: f64) -> OverplotResult<ChannelSlice<'_>> {
        self.get(id)
            .map(|c| c.slice(start, end))
            .ok_or_else(|| OverplotError::validation(format!("unknown channel id {}", id.0)))
    }

    /// All channels in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &Channel)> + '_ {
        self.channels
            .iter()
            .enumerate()
            .map(|(i, c)| (ChannelId(i as u32), c))
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Return `true` when no channel is registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Minimum and maximum over the finite samples of every channel.
    pub fn data_bounds(&self) -> Option<(f64, f64)> {
        self.channels
            .iter()
            .flat_map(|c| c.data.iter().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/channel/store.rs"]
mod tests;

//! Frame sinks.
//!
//! Sinks consume rendered overlay frames in ascending frame order; the job driver feeds them.

/// `ffmpeg` compositor sink.
pub(crate) mod ffmpeg;
/// Sink trait and the in-memory sink.
pub(crate) mod sink;

/// Convenience result type used across overplot.
pub type OverplotResult<T> = Result<T, OverplotError>;

/// Top-level error taxonomy used by every job stage.
///
/// All variants are fatal for the job that produced them; nothing in the pipeline retries.
#[derive(thiserror::Error, Debug)]
pub enum OverplotError {
    /// Malformed input: mismatched channel arrays, missing video file, bad job config.
    #[error("validation error: {0}")]
    Validation(String),

    /// The probe could not find a usable video stream, or the file is unreadable.
    #[error("media error: {0}")]
    Media(String),

    /// Rasterizer failures (surface allocation, plot chrome).
    #[error("render error: {0}")]
    Render(String),

    /// The external compositor failed or closed its input pipe mid-stream.
    #[error("composition error: {0}")]
    Composition(String),

    /// Errors when serializing or deserializing job files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverplotError {
    /// Build a [`OverplotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`OverplotError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`OverplotError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`OverplotError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`OverplotError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

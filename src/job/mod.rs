//! Overlay jobs: options, the JSON job file, and the frame-loop driver.

/// JSON job file boundary.
pub(crate) mod config;
/// Job construction and the render driver.
pub(crate) mod overlay;

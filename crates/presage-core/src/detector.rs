//! Face landmark detector contract.
//!
//! Detection intelligence is delegated entirely to an external pretrained
//! model library (a fast face locator plus a 68-point landmark model). The
//! gate consumes only the nose point of the first detected face; everything
//! else a detector reports is ignored.

use std::path::Path;
use thiserror::Error;

use crate::camera::Frame;
use crate::geometry::Point;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model resource not found: {0}")]
    NotFound(String),
    #[error("model load failed: {0}")]
    LoadFailure(String),
}

/// Per-tick, transient detection failure. Logged and swallowed by the
/// controller — the next tick retries.
#[derive(Error, Debug)]
#[error("detection failed: {0}")]
pub struct DetectionError(pub String);

/// One detected face. Only the nose landmark is consumed here.
#[derive(Debug, Clone)]
pub struct Face {
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
    /// Nose-tip landmark in frame-pixel coordinates.
    pub nose: Point,
}

/// Produces zero or more faces per frame. An empty result is valid — it
/// means "no data this cycle", not an error.
pub trait LandmarkDetector {
    /// Load the face locator and the 68-point landmark model from
    /// `resource_base`. A failure leaves detection permanently unavailable
    /// for the session; there is no retry and no fallback.
    fn load_models(&mut self, resource_base: &Path) -> Result<(), ModelLoadError>;

    /// Detect faces in one frame.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Face>, DetectionError>;
}

//! Camera provider contract and frame type.
//!
//! Real device backends live outside this crate; the controller only needs
//! something that can hand out a live stream for a requested resolution and
//! release the device on teardown.

use thiserror::Error;

/// Capture constraints requested from the camera provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
}

impl Default for StreamConstraints {
    /// The liveness check captures at 640×480.
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// One RGB24 frame as delivered by the stream.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Packed RGB24 pixel data, `width * height * 3` bytes.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no capture device available")]
    NoDevice,
    #[error("camera error: {0}")]
    Unknown(String),
}

/// Yields a live video stream for the requested constraints.
pub trait CameraProvider {
    type Stream: VideoStream;

    fn request_stream(
        &mut self,
        constraints: StreamConstraints,
    ) -> Result<Self::Stream, CameraError>;
}

/// A live video stream backed by a capture device.
pub trait VideoStream {
    /// Grab the current frame.
    fn frame(&mut self) -> Result<Frame, CameraError>;

    /// Actual stream resolution (width, height).
    fn resolution(&self) -> (u32, u32);

    /// Release the backing device. The session controller is solely
    /// responsible for calling this on teardown.
    fn stop(&mut self);
}

//! Drawable surface: off-screen rasterisation and still-image encoding.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use thiserror::Error;

use crate::camera::Frame;

/// Encodings the surface can serialise to. PNG only — the captured still
/// must be lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
}

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("frame buffer is {got} bytes, expected {expected} for {width}x{height} RGB24")]
    InvalidFrame {
        got: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
    #[error("no frame has been drawn to the surface")]
    Empty,
    #[error("png encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// An off-screen drawable that can rasterise a video frame and serialise it
/// to an encoded image payload.
pub trait DrawSurface {
    fn draw(&mut self, frame: &Frame) -> Result<(), EncodingError>;
    fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, EncodingError>;
}

/// Off-screen surface backed by an `image` RGB buffer.
///
/// Resizes itself to each incoming frame, so it always matches the video's
/// pixel size.
#[derive(Debug, Default)]
pub struct PixmapSurface {
    pixmap: Option<RgbImage>,
}

impl PixmapSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawSurface for PixmapSurface {
    fn draw(&mut self, frame: &Frame) -> Result<(), EncodingError> {
        let expected = frame.width as usize * frame.height as usize * 3;
        let pixmap = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or(EncodingError::InvalidFrame {
                got: frame.data.len(),
                expected,
                width: frame.width,
                height: frame.height,
            })?;
        self.pixmap = Some(pixmap);
        Ok(())
    }

    fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, EncodingError> {
        let pixmap = self.pixmap.as_ref().ok_or(EncodingError::Empty)?;
        match format {
            ImageFormat::Png => {
                let mut out = Vec::new();
                PngEncoder::new(&mut out).write_image(
                    pixmap.as_raw(),
                    pixmap.width(),
                    pixmap.height(),
                    ExtendedColorType::Rgb8,
                )?;
                Ok(out)
            }
        }
    }
}

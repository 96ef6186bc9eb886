//! Image engine capability traits and the default `image`-crate backend.
//!
//! The pipeline only needs four pixel operations — size, crop, resize,
//! encode — so that is the whole trait surface. Handles are immutable:
//! every operation returns a new handle, which lets one decoded source be
//! shared behind an `Arc` across concurrent transforms without locking.

use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

use crate::error::EngineError;
use crate::types::{ImageFormat, PixelSize};

/// A decoded image the pipeline can transform.
pub trait ImageHandle: Send + Sync + Sized + 'static {
    /// Pixel dimensions of this image.
    fn size(&self) -> PixelSize;

    /// Extract the rectangle at `(x, y)` with the given size.
    /// Implementations clamp the rectangle to the image bounds.
    fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self;

    /// Resample to exactly the given size.
    fn resize(&self, width: u32, height: u32) -> Self;

    /// Encode into `format` at `quality` (0-100).
    fn encode(&self, format: ImageFormat, quality: u8) -> Result<Vec<u8>, EngineError>;
}

/// A decoding engine producing transformable handles.
pub trait ImageEngine: Send + Sync + 'static {
    type Handle: ImageHandle;

    /// Decode raw bytes into a handle.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Handle, EngineError>;
}

/// Default engine over the `image` crate's pure Rust codecs.
///
/// Decodes whatever the crate's readers recognize (JPEG, PNG, WebP, GIF,
/// TIFF, ...). AVIF is encode-only: the `avif` feature ships the rav1e
/// encoder, while decoding would require the C dav1d library.
#[derive(Debug, Clone, Default)]
pub struct RasterEngine;

impl RasterEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ImageEngine for RasterEngine {
    type Handle = RasterImage;

    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, EngineError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| EngineError::Decode(format!("Cannot detect image format: {}", e)))?;
        let image = reader
            .decode()
            .map_err(|e| EngineError::Decode(e.to_string()))?;
        Ok(RasterImage { image })
    }
}

/// Pixel data backed by a [`DynamicImage`].
#[derive(Debug)]
pub struct RasterImage {
    image: DynamicImage,
}

impl From<DynamicImage> for RasterImage {
    fn from(image: DynamicImage) -> Self {
        Self { image }
    }
}

impl ImageHandle for RasterImage {
    fn size(&self) -> PixelSize {
        let (width, height) = self.image.dimensions();
        PixelSize::new(width, height)
    }

    fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            image: self.image.crop_imm(x, y, width, height),
        }
    }

    fn resize(&self, width: u32, height: u32) -> Self {
        Self {
            image: self.image.resize_exact(width, height, FilterType::Lanczos3),
        }
    }

    fn encode(&self, format: ImageFormat, quality: u8) -> Result<Vec<u8>, EngineError> {
        let mut buf = Vec::new();
        match format {
            ImageFormat::Jpg => {
                // JPEG carries no alpha channel
                let rgb = self.image.to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
                rgb.write_with_encoder(encoder)
                    .map_err(|e| encode_error(format, e))?;
            }
            ImageFormat::Png => {
                // Lossless; quality does not apply
                let encoder = PngEncoder::new(&mut buf);
                self.image
                    .write_with_encoder(encoder)
                    .map_err(|e| encode_error(format, e))?;
            }
            ImageFormat::Webp => {
                // The pure Rust WebP encoder is lossless-only and 8-bit only
                let rgba = self.image.to_rgba8();
                let encoder = WebPEncoder::new_lossless(&mut buf);
                rgba.write_with_encoder(encoder)
                    .map_err(|e| encode_error(format, e))?;
            }
            ImageFormat::Avif => {
                let rgba = self.image.to_rgba8();
                let encoder = AvifEncoder::new_with_speed_quality(&mut buf, 6, quality);
                rgba.write_with_encoder(encoder)
                    .map_err(|e| encode_error(format, e))?;
            }
        }
        Ok(buf)
    }
}

fn encode_error(format: ImageFormat, err: image::ImageError) -> EngineError {
    EngineError::Encode {
        format: format.to_string(),
        message: err.to_string(),
    }
}

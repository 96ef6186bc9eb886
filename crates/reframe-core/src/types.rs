//! Core data types for the Reframe conversion pipeline.
//!
//! `ImageSpec` is the wire contract shared with browser croppers and the
//! CLI: camelCase field names, fractional crop geometry (UI croppers emit
//! sub-pixel values), normalized quality in `0.0..=1.0`.

use serde::{Deserialize, Serialize};

/// Output format for a converted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpg,
    Webp,
    Avif,
}

impl ImageFormat {
    /// Every supported output format, in presentation order.
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Png,
        ImageFormat::Jpg,
        ImageFormat::Webp,
        ImageFormat::Avif,
    ];

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Webp => "webp",
            ImageFormat::Avif => "avif",
        }
    }

    /// Parse a user-supplied format name. Accepts `jpeg` as an alias
    /// for `jpg`; anything else unrecognized is `None`.
    pub fn parse(s: &str) -> Option<ImageFormat> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpg),
            "webp" => Some(ImageFormat::Webp),
            "avif" => Some(ImageFormat::Avif),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Top-left corner of a crop box, in source pixels.
///
/// Fractional values are legal on the wire; the transform executor rounds
/// to the nearest integer pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// Width and height of a crop box, in source pixels. Fractional like
/// [`Coordinate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub width: f64,
    pub height: f64,
}

/// An exact pixel dimension: the resize target of a spec, or the decoded
/// source size. Integral by contract — the encoder cannot produce
/// fractional output sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One requested output: crop box, resize target, format, quality.
///
/// A batch request carries an array of these against a single source
/// image. Unknown extra fields are tolerated and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    /// Client-side identifier, echoed back in failure reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display title; becomes the stem of the archive entry name
    #[serde(default)]
    pub title: String,

    /// Top-left corner of the crop box
    pub coordinate: Coordinate,

    /// Crop box size
    pub dimension: Region,

    /// Exact output size after the crop is resampled
    pub resize_to: PixelSize,

    /// Encode quality, normalized `0.0..=1.0`. Out-of-range values are
    /// clamped at the encode boundary rather than rejected.
    pub quality: f64,

    /// Output format
    pub format: ImageFormat,

    /// Advisory cropper state; accepted for wire compatibility, unused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,

    /// Advisory cropper state (string or numeric form); unused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio_with_div: Option<serde_json::Value>,
}

/// A successfully converted output: encoded bytes plus the spec that
/// produced them. Attribution travels with the buffer, never by position.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub spec: ImageSpec,
}

/// A spec-local failure with its user-visible reason.
#[derive(Debug, Clone)]
pub struct SpecFailure {
    pub spec: ImageSpec,
    pub reason: String,
}

/// Settled result of running a batch of specs against one source image.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Decoded source dimensions the specs were validated against
    pub source: PixelSize,

    /// Converted outputs, in request order
    pub succeeded: Vec<RenderedImage>,

    /// Spec-local failures, in request order
    pub failed: Vec<SpecFailure>,
}

impl BatchOutcome {
    /// Number of specs the request asked for.
    pub fn requested(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when at least one spec was requested and every one failed.
    /// An empty request is not a total failure.
    pub fn is_total_failure(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }
}

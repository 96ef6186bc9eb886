//! Request validation: spec geometry and upload payloads.

use crate::config::{ConversionConfig, LimitsConfig};
use crate::error::{PipelineError, SpecRejection};
use crate::types::{Coordinate, PixelSize, Region};

/// Validate one spec's geometry against the decoded source size.
///
/// Pure and deterministic; needs no pixel data. Rejections happen on the
/// raw fractional values, before any rounding. Checks run in a fixed
/// order and the first failure wins:
/// 1. resize target within the source (no upscaling past the original)
/// 2. non-negative crop origin
/// 3. non-negative crop size
/// 4. crop box inside the source
pub fn check_spec_geometry(
    coordinate: Coordinate,
    crop: Region,
    resize_to: PixelSize,
    source: PixelSize,
) -> Result<(), SpecRejection> {
    if resize_to.width > source.width || resize_to.height > source.height {
        return Err(SpecRejection::ResizeExceedsSource);
    }
    if coordinate.x < 0.0 || coordinate.y < 0.0 {
        return Err(SpecRejection::NegativeCoordinate);
    }
    if crop.width < 0.0 || crop.height < 0.0 {
        return Err(SpecRejection::NegativeDimension);
    }
    let right = coordinate.x + crop.width;
    let bottom = coordinate.y + crop.height;
    if right > f64::from(source.width) || bottom > f64::from(source.height) {
        return Err(SpecRejection::CropOutOfBounds);
    }
    Ok(())
}

/// Validates uploaded payloads before any decode work.
///
/// Checks the file name extension against the configured allow-list and
/// the leading bytes against known image signatures. The two checks are
/// independent: a `.jpg` holding PNG data passes both, and the decoder
/// sniffs the real format from content anyway.
pub struct UploadValidator {
    limits: LimitsConfig,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    /// Create a new validator with the given limits and allow-list.
    pub fn new(limits: LimitsConfig, conversion: &ConversionConfig) -> Self {
        Self {
            limits,
            allowed_extensions: conversion.supported_formats.clone(),
        }
    }

    /// Validate an uploaded payload: size cap, extension, magic bytes.
    pub fn validate(&self, file_name: &str, bytes: &[u8]) -> Result<(), PipelineError> {
        let max_bytes = self.limits.max_upload_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(PipelineError::SourceTooLarge {
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_upload_mb,
            });
        }

        if !self.has_allowed_extension(file_name) {
            return Err(PipelineError::UnsupportedFormat {
                detail: format!("extension of {:?} is not an accepted image type", file_name),
            });
        }

        if !is_supported_image_header(bytes) {
            return Err(PipelineError::UnsupportedFormat {
                detail: "payload does not start with a known image signature".to_string(),
            });
        }

        Ok(())
    }

    fn has_allowed_extension(&self, file_name: &str) -> bool {
        std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}

/// Check if the leading bytes match a supported image signature.
fn is_supported_image_header(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }

    // JPEG: FF D8 FF
    if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
        return true;
    }

    // PNG: 89 50 4E 47
    if header[0] == 0x89 && header[1] == b'P' && header[2] == b'N' && header[3] == b'G' {
        return true;
    }

    // WebP: RIFF....WEBP
    if header[0] == b'R' && header[1] == b'I' && header[2] == b'F' && header[3] == b'F' {
        if header.len() >= 12 {
            return header[8] == b'W' && header[9] == b'E' && header[10] == b'B' && header[11] == b'P';
        }
        // Could be WebP, allow it to proceed
        return true;
    }

    // AVIF (ISO-BMFF): ftyp box at offset 4
    if header.len() >= 12 && header[4] == b'f' && header[5] == b't' && header[6] == b'y' && header[7] == b'p' {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> PixelSize {
        PixelSize::new(200, 100)
    }

    fn origin() -> Coordinate {
        Coordinate { x: 0.0, y: 0.0 }
    }

    #[test]
    fn test_valid_geometry_passes() {
        let result = check_spec_geometry(
            Coordinate { x: 10.0, y: 5.0 },
            Region {
                width: 100.0,
                height: 50.0,
            },
            PixelSize::new(50, 25),
            source(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_exact_fit_crop_passes() {
        // Crop box touching the far edge is still in bounds
        let result = check_spec_geometry(
            origin(),
            Region {
                width: 200.0,
                height: 100.0,
            },
            PixelSize::new(200, 100),
            source(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_resize_beyond_source_rejected() {
        let result = check_spec_geometry(
            origin(),
            Region {
                width: 100.0,
                height: 50.0,
            },
            PixelSize::new(201, 50),
            source(),
        );
        assert_eq!(result.unwrap_err(), SpecRejection::ResizeExceedsSource);
    }

    #[test]
    fn test_negative_coordinate_rejected() {
        let result = check_spec_geometry(
            Coordinate { x: -1.0, y: 0.0 },
            Region {
                width: 10.0,
                height: 10.0,
            },
            PixelSize::new(10, 10),
            source(),
        );
        assert_eq!(result.unwrap_err(), SpecRejection::NegativeCoordinate);
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let result = check_spec_geometry(
            origin(),
            Region {
                width: -10.0,
                height: 10.0,
            },
            PixelSize::new(10, 10),
            source(),
        );
        assert_eq!(result.unwrap_err(), SpecRejection::NegativeDimension);
    }

    #[test]
    fn test_crop_out_of_bounds_rejected() {
        let result = check_spec_geometry(
            Coordinate { x: 150.0, y: 0.0 },
            Region {
                width: 51.0,
                height: 50.0,
            },
            PixelSize::new(50, 50),
            source(),
        );
        assert_eq!(result.unwrap_err(), SpecRejection::CropOutOfBounds);
    }

    #[test]
    fn test_fractional_overrun_rejected_before_rounding() {
        // 0.5 + 199.6 = 200.1 > 200, even though both round inside
        let result = check_spec_geometry(
            Coordinate { x: 0.5, y: 0.0 },
            Region {
                width: 199.6,
                height: 50.0,
            },
            PixelSize::new(50, 25),
            source(),
        );
        assert_eq!(result.unwrap_err(), SpecRejection::CropOutOfBounds);
    }

    #[test]
    fn test_first_failing_check_wins() {
        // Oversized resize and negative coordinate: resize check runs first
        let result = check_spec_geometry(
            Coordinate { x: -5.0, y: 0.0 },
            Region {
                width: 10.0,
                height: 10.0,
            },
            PixelSize::new(500, 500),
            source(),
        );
        assert_eq!(result.unwrap_err(), SpecRejection::ResizeExceedsSource);
    }

    fn upload_validator() -> UploadValidator {
        UploadValidator::new(
            crate::config::LimitsConfig::default(),
            &ConversionConfig::default(),
        )
    }

    const JPEG_HEADER: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const PNG_HEADER: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_upload_accepts_jpeg() {
        assert!(upload_validator().validate("photo.jpg", &JPEG_HEADER).is_ok());
        assert!(upload_validator().validate("photo.JPEG", &JPEG_HEADER).is_ok());
    }

    #[test]
    fn test_upload_rejects_disallowed_extension() {
        let err = upload_validator()
            .validate("notes.txt", &PNG_HEADER)
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_upload_rejects_bad_signature() {
        let err = upload_validator()
            .validate("photo.png", b"<html>not an image</html>")
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_upload_extension_and_signature_are_independent() {
        // PNG data under a .jpg name decodes fine; the sniffing decoder
        // goes by content
        assert!(upload_validator().validate("photo.jpg", &PNG_HEADER).is_ok());
    }

    #[test]
    fn test_upload_accepts_avif_container() {
        let mut header = [0u8; 12];
        header[4..8].copy_from_slice(b"ftyp");
        header[8..12].copy_from_slice(b"avif");
        assert!(upload_validator().validate("still.avif", &header).is_ok());
    }

    #[test]
    fn test_upload_rejects_oversized_payload() {
        let limits = crate::config::LimitsConfig {
            max_upload_mb: 1,
            ..Default::default()
        };
        let validator = UploadValidator::new(limits, &ConversionConfig::default());
        let payload = vec![0xFFu8; 1024 * 1024 + 1];
        let err = validator.validate("big.jpg", &payload).unwrap_err();
        assert!(matches!(err, PipelineError::SourceTooLarge { .. }));
    }

    #[test]
    fn test_upload_rejects_tiny_payload() {
        let err = upload_validator().validate("photo.jpg", &[0xFF, 0xD8]).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }
}

//! Per-spec transform execution: validate, crop, resize, encode.

use crate::error::TransformError;
use crate::pipeline::engine::ImageHandle;
use crate::pipeline::validate::check_spec_geometry;
use crate::types::ImageSpec;

/// Clamp a normalized quality (`0.0..=1.0` by convention) into the
/// encoder's 0-100 scale. Out-of-range inputs saturate instead of
/// failing, so `1.5` encodes at 100 and `-0.2` at 0.
pub fn clamp_quality(quality: f64) -> u8 {
    (quality * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Render one spec against a decoded source.
///
/// Geometry validation runs first on the raw fractional values; a
/// rejected spec never touches the engine. Crop coordinates then round
/// to the nearest pixel, the resize is exact, and the encode uses the
/// clamped quality. Runs synchronously; callers put it on the blocking
/// pool.
pub fn render_spec<H: ImageHandle>(
    source: &H,
    spec: &ImageSpec,
) -> Result<Vec<u8>, TransformError> {
    check_spec_geometry(
        spec.coordinate,
        spec.dimension,
        spec.resize_to,
        source.size(),
    )?;

    let x = spec.coordinate.x.round() as u32;
    let y = spec.coordinate.y.round() as u32;
    let width = spec.dimension.width.round() as u32;
    let height = spec.dimension.height.round() as u32;

    let cropped = source.crop(x, y, width, height);
    let resized = cropped.resize(spec.resize_to.width, spec.resize_to.height);
    let bytes = resized.encode(spec.format, clamp_quality(spec.quality))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecRejection;
    use crate::pipeline::engine::tests::{RecordedOp, ScriptedEngine};
    use crate::pipeline::engine::ImageEngine;
    use crate::types::{Coordinate, ImageFormat, PixelSize, Region};

    fn spec(x: f64, y: f64, w: f64, h: f64, target: (u32, u32)) -> ImageSpec {
        ImageSpec {
            id: None,
            title: "test".to_string(),
            coordinate: Coordinate { x, y },
            dimension: Region {
                width: w,
                height: h,
            },
            resize_to: PixelSize::new(target.0, target.1),
            quality: 0.9,
            format: ImageFormat::Png,
            aspect_ratio: None,
            aspect_ratio_with_div: None,
        }
    }

    #[test]
    fn test_clamp_quality_scales_and_saturates() {
        assert_eq!(clamp_quality(0.8), 80);
        assert_eq!(clamp_quality(0.855), 86);
        assert_eq!(clamp_quality(1.0), 100);
        assert_eq!(clamp_quality(1.5), 100);
        assert_eq!(clamp_quality(0.0), 0);
        assert_eq!(clamp_quality(-0.2), 0);
    }

    #[test]
    fn test_render_rounds_crop_to_nearest_pixel() {
        let engine = ScriptedEngine::with_source(200, 100);
        let source = engine.decode(b"src").unwrap();

        let bytes = render_spec(&source, &spec(10.4, 19.5, 100.3, 50.5, (50, 25))).unwrap();
        assert_eq!(bytes, b"rendered 50x25 png q90");

        let ops = engine.recorded();
        assert_eq!(
            ops[1],
            RecordedOp::Crop {
                x: 10,
                y: 20,
                width: 100,
                height: 51
            }
        );
        assert_eq!(
            ops[2],
            RecordedOp::Resize {
                width: 50,
                height: 25
            }
        );
        assert_eq!(
            ops[3],
            RecordedOp::Encode {
                format: ImageFormat::Png,
                quality: 90
            }
        );
    }

    #[test]
    fn test_rejected_spec_never_touches_the_engine() {
        let engine = ScriptedEngine::with_source(200, 100);
        let source = engine.decode(b"src").unwrap();

        let err = render_spec(&source, &spec(0.0, 0.0, 100.0, 50.0, (400, 50))).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Rejected(SpecRejection::ResizeExceedsSource)
        ));

        // Only the decode itself was recorded; no crop/resize/encode
        assert_eq!(engine.recorded(), vec![RecordedOp::Decode]);
    }

    #[test]
    fn test_engine_encode_failure_is_spec_local() {
        let engine = ScriptedEngine {
            source_size: PixelSize::new(200, 100),
            fail_encode_widths: [50].into_iter().collect(),
            ..Default::default()
        };
        let source = engine.decode(b"src").unwrap();

        let err = render_spec(&source, &spec(0.0, 0.0, 100.0, 50.0, (50, 25))).unwrap_err();
        assert!(matches!(err, TransformError::Engine(_)));
    }
}

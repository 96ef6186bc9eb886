//! Responsive breakpoint presets and parsing for the CLI converters.
//!
//! A breakpoint argument is either a preset name (`bootstrap`, `tailwind`)
//! or a comma-separated list of pixel widths. Each width becomes a
//! full-frame [`ImageSpec`] so breakpoint conversion runs through the same
//! pipeline as explicit crop requests.

use crate::types::{Coordinate, ImageFormat, ImageSpec, PixelSize, Region};

/// Bootstrap grid breakpoints (sm through xxl).
pub const BOOTSTRAP: [u32; 5] = [576, 768, 992, 1200, 1400];

/// Tailwind default screens (sm through 2xl).
pub const TAILWIND: [u32; 5] = [640, 768, 1024, 1280, 1536];

/// Named presets, in presentation order for the prompts.
pub const PRESETS: [(&str, &[u32]); 2] = [("bootstrap", &BOOTSTRAP), ("tailwind", &TAILWIND)];

/// Parse a breakpoint argument.
///
/// Accepts a preset name (case-insensitive) or a comma-separated list of
/// positive pixel widths. Anything else is `None`, which callers treat as
/// "prompt the user".
pub fn parse_breakpoints(input: &str) -> Option<Vec<u32>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    for (name, widths) in PRESETS {
        if trimmed.eq_ignore_ascii_case(name) {
            return Some(widths.to_vec());
        }
    }
    let widths: Result<Vec<u32>, _> = trimmed
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect();
    match widths {
        Ok(widths) if !widths.is_empty() && widths.iter().all(|w| *w > 0) => Some(widths),
        _ => None,
    }
}

/// Build the full-frame spec that renders `source` at breakpoint width
/// `width`, preserving the source aspect ratio.
///
/// The target height rounds to the nearest pixel with a floor of one.
/// A width beyond the source is not caught here; the geometry validator
/// rejects it like any other oversized resize target.
pub fn spec_for_breakpoint(
    title: &str,
    source: PixelSize,
    width: u32,
    format: ImageFormat,
    quality: f64,
) -> ImageSpec {
    let aspect_height =
        (f64::from(width) * f64::from(source.height) / f64::from(source.width)).round() as u32;
    ImageSpec {
        id: None,
        title: title.to_string(),
        coordinate: Coordinate { x: 0.0, y: 0.0 },
        dimension: Region {
            width: f64::from(source.width),
            height: f64::from(source.height),
        },
        resize_to: PixelSize::new(width, aspect_height.max(1)),
        quality,
        format,
        aspect_ratio: None,
        aspect_ratio_with_div: None,
    }
}

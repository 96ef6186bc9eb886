//! Deterministic output file names.

use crate::types::{ImageFormat, ImageSpec};

/// Archive entry name for one rendered spec.
///
/// Spaces in the title become underscores, then the target dimensions
/// and format extension are appended: `My Title` resized to 300x200 as
/// webp becomes `My_Title_300x200.webp`. The same spec always yields
/// the same name; callers that allow duplicate titles get duplicate
/// entries, which zip tolerates.
pub fn archive_entry_name(spec: &ImageSpec) -> String {
    format!(
        "{}_{}x{}.{}",
        spec.title.replace(' ', "_"),
        spec.resize_to.width,
        spec.resize_to.height,
        spec.format.extension()
    )
}

/// Output file name for one breakpoint rendition of a source file.
///
/// `photo` at breakpoint 576 as webp becomes `photo-576.webp`; the stem
/// is the source file name without its extension.
pub fn breakpoint_file_name(stem: &str, width: u32, format: ImageFormat) -> String {
    format!("{}-{}.{}", stem, width, format.extension())
}

//! Image conversion pipeline components.
//!
//! This module contains all the stages of the conversion pipeline:
//! - **validate**: Upload checks and per-spec geometry checks
//! - **engine**: Decode, crop, resize and encode behind a trait seam
//! - **decode**: Load the source image once, with a deadline
//! - **transform**: Render a single spec against a decoded source
//! - **batch**: Fan a batch of specs out over the blocking pool
//! - **naming**: Deterministic output file names
//! - **archive**: Zip assembly with the accounting manifest
//! - **discovery**: Find image files for batch conversion

pub mod archive;
pub mod batch;
pub mod decode;
pub mod discovery;
pub mod engine;
pub mod naming;
pub mod transform;
pub mod validate;

// Re-exports for convenient access
pub use archive::{ArchiveManifest, ArchiveWriter, FailureEntry, MANIFEST_FILE};
pub use batch::BatchOrchestrator;
pub use decode::SourceDecoder;
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use engine::{ImageEngine, ImageHandle, RasterEngine};
pub use naming::{archive_entry_name, breakpoint_file_name};
pub use transform::{clamp_quality, render_spec};
pub use validate::{check_spec_geometry, UploadValidator};

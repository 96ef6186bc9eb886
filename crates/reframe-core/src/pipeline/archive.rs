//! Zip assembly for batch results.

use std::io::{Cursor, Seek, Write};

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ArchiveConfig;
use crate::error::PipelineError;
use crate::pipeline::naming::archive_entry_name;
use crate::types::{BatchOutcome, PixelSize, SpecFailure};

/// Name of the accounting entry appended to every archive.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Writes a settled batch as a zip: one entry per rendered spec, in the
/// order the batch reported them, then a `manifest.json` entry that
/// accounts for every requested spec. The manifest is always present,
/// so consumers can tell "not requested" apart from "requested but
/// failed" without parsing entry names.
pub struct ArchiveWriter {
    config: ArchiveConfig,
}

/// Accounting record stored as `manifest.json`.
#[derive(Debug, Serialize)]
pub struct ArchiveManifest {
    pub requested: usize,
    pub produced: usize,
    pub source: PixelSize,
    pub failed: Vec<FailureEntry>,
}

/// One failed spec, identified the way the caller identified it.
#[derive(Debug, Serialize)]
pub struct FailureEntry {
    pub id: Option<String>,
    pub title: String,
    pub reason: String,
}

impl From<&SpecFailure> for FailureEntry {
    fn from(failure: &SpecFailure) -> Self {
        Self {
            id: failure.spec.id.clone(),
            title: failure.spec.title.clone(),
            reason: failure.reason.clone(),
        }
    }
}

impl ArchiveManifest {
    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        Self {
            requested: outcome.requested(),
            produced: outcome.succeeded.len(),
            source: outcome.source,
            failed: outcome.failed.iter().map(FailureEntry::from).collect(),
        }
    }
}

impl ArchiveWriter {
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// Write the archive into `sink` and return it on success.
    ///
    /// Any zip or IO failure aborts the whole archive; entries are
    /// never silently dropped.
    pub fn write_into<W: Write + Seek>(
        &self,
        outcome: &BatchOutcome,
        sink: W,
    ) -> Result<W, PipelineError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(self.config.compression_level)));
        let mut zip = ZipWriter::new(sink);

        for rendered in &outcome.succeeded {
            zip.start_file(archive_entry_name(&rendered.spec), options)
                .map_err(archive_err)?;
            zip.write_all(&rendered.bytes).map_err(archive_err)?;
        }

        let manifest = ArchiveManifest::from_outcome(outcome);
        let manifest_json = serde_json::to_vec_pretty(&manifest).map_err(archive_err)?;
        zip.start_file(MANIFEST_FILE, options).map_err(archive_err)?;
        zip.write_all(&manifest_json).map_err(archive_err)?;

        zip.finish().map_err(archive_err)
    }

    /// Build the archive in memory, for responses served from RAM.
    pub fn write_to_buffer(&self, outcome: &BatchOutcome) -> Result<Vec<u8>, PipelineError> {
        let cursor = self.write_into(outcome, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }
}

fn archive_err(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Archive {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinate, ImageFormat, ImageSpec, Region, RenderedImage};
    use std::io::Read;

    fn spec(id: Option<&str>, title: &str, format: ImageFormat) -> ImageSpec {
        ImageSpec {
            id: id.map(String::from),
            title: title.to_string(),
            coordinate: Coordinate { x: 0.0, y: 0.0 },
            dimension: Region {
                width: 100.0,
                height: 50.0,
            },
            resize_to: PixelSize::new(100, 50),
            quality: 0.8,
            format,
            aspect_ratio: None,
            aspect_ratio_with_div: None,
        }
    }

    fn read_entry(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, index: usize) -> (String, Vec<u8>) {
        let mut file = archive.by_index(index).unwrap();
        let name = file.name().to_string();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).unwrap();
        (name, bytes)
    }

    #[test]
    fn test_archive_holds_entries_then_manifest() {
        let outcome = BatchOutcome {
            source: PixelSize::new(640, 480),
            succeeded: vec![
                RenderedImage {
                    bytes: b"png bytes".to_vec(),
                    spec: spec(Some("a"), "hero banner", ImageFormat::Png),
                },
                RenderedImage {
                    bytes: b"jpg bytes".to_vec(),
                    spec: spec(None, "thumb", ImageFormat::Jpg),
                },
            ],
            failed: vec![SpecFailure {
                spec: spec(Some("c"), "broken", ImageFormat::Webp),
                reason: "Resize dimension is greater than original dimension".to_string(),
            }],
        };

        let buffer = ArchiveWriter::new(ArchiveConfig::default())
            .write_to_buffer(&outcome)
            .unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();

        assert_eq!(archive.len(), 3);

        let (name, bytes) = read_entry(&mut archive, 0);
        assert_eq!(name, "hero_banner_100x50.png");
        assert_eq!(bytes, b"png bytes");

        let (name, bytes) = read_entry(&mut archive, 1);
        assert_eq!(name, "thumb_100x50.jpg");
        assert_eq!(bytes, b"jpg bytes");

        let (name, bytes) = read_entry(&mut archive, 2);
        assert_eq!(name, MANIFEST_FILE);
        let manifest: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(manifest["requested"], 3);
        assert_eq!(manifest["produced"], 2);
        assert_eq!(manifest["source"]["width"], 640);
        assert_eq!(manifest["source"]["height"], 480);
        assert_eq!(manifest["failed"][0]["id"], "c");
        assert_eq!(manifest["failed"][0]["title"], "broken");
        assert_eq!(
            manifest["failed"][0]["reason"],
            "Resize dimension is greater than original dimension"
        );
    }

    #[test]
    fn test_empty_outcome_still_writes_manifest() {
        let outcome = BatchOutcome {
            source: PixelSize::new(10, 10),
            ..BatchOutcome::default()
        };

        let buffer = ArchiveWriter::new(ArchiveConfig::default())
            .write_to_buffer(&outcome)
            .unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();

        assert_eq!(archive.len(), 1);
        let (name, bytes) = read_entry(&mut archive, 0);
        assert_eq!(name, MANIFEST_FILE);
        let manifest: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(manifest["requested"], 0);
        assert_eq!(manifest["produced"], 0);
        assert_eq!(manifest["failed"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_missing_id_serializes_as_null() {
        let outcome = BatchOutcome {
            source: PixelSize::new(10, 10),
            succeeded: Vec::new(),
            failed: vec![SpecFailure {
                spec: spec(None, "anonymous", ImageFormat::Png),
                reason: "Coordinate value cannot be negative".to_string(),
            }],
        };

        let buffer = ArchiveWriter::new(ArchiveConfig::default())
            .write_to_buffer(&outcome)
            .unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
        let (_, bytes) = read_entry(&mut archive, 0);
        let manifest: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(manifest["failed"][0]["id"].is_null());
    }

    #[test]
    fn test_duplicate_titles_yield_duplicate_entries() {
        let outcome = BatchOutcome {
            source: PixelSize::new(10, 10),
            succeeded: vec![
                RenderedImage {
                    bytes: b"first".to_vec(),
                    spec: spec(None, "same", ImageFormat::Png),
                },
                RenderedImage {
                    bytes: b"second".to_vec(),
                    spec: spec(None, "same", ImageFormat::Png),
                },
            ],
            failed: Vec::new(),
        };

        let buffer = ArchiveWriter::new(ArchiveConfig::default())
            .write_to_buffer(&outcome)
            .unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();

        assert_eq!(archive.len(), 3);
        let (name_a, bytes_a) = read_entry(&mut archive, 0);
        let (name_b, bytes_b) = read_entry(&mut archive, 1);
        assert_eq!(name_a, name_b);
        assert_eq!(bytes_a, b"first");
        assert_eq!(bytes_b, b"second");
    }
}

//! Reframe Core - Embeddable image conversion library.
//!
//! Reframe takes one source image plus a batch of conversion specs and
//! produces a zip of renditions: each spec names a crop region, a target
//! size, an output format and a quality, and failures are reported per
//! spec instead of aborting the batch.
//!
//! # Architecture
//!
//! The pipeline decodes the source exactly once and fans the specs out
//! over the blocking pool:
//!
//! ```text
//! Upload → Validate → Decode once → per spec: Crop → Resize → Encode → Zip + manifest
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use reframe_core::{ImageSpec, Reframe};
//!
//! #[tokio::main]
//! async fn main() -> reframe_core::Result<()> {
//!     let reframe = Reframe::with_defaults()?;
//!     let source = std::fs::read("photo.jpg")?;
//!     let specs: Vec<ImageSpec> = serde_json::from_str(specs_json)?;
//!
//!     let outcome = reframe.run(source, specs).await?;
//!     let archive = reframe.write_archive(&outcome)?;
//!     std::fs::write("images.zip", archive)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod breakpoints;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use breakpoints::{parse_breakpoints, spec_for_breakpoint, PRESETS};
pub use config::Config;
pub use error::{
    ConfigError, EngineError, PipelineError, PipelineResult, ReframeError, Result, SpecRejection,
    TransformError,
};
pub use pipeline::{ArchiveWriter, BatchOrchestrator, RasterEngine, UploadValidator};
pub use types::{
    BatchOutcome, Coordinate, ImageFormat, ImageSpec, PixelSize, Region, RenderedImage,
    SpecFailure,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reframe converter - the main entry point for batch conversion.
///
/// Bundles the upload validator, the batch orchestrator and the archive
/// writer, wired from one [`Config`]. The HTTP server and the CLI both
/// drive this one type.
pub struct Reframe {
    config: Config,
    validator: UploadValidator,
    orchestrator: BatchOrchestrator<RasterEngine>,
    archive: ArchiveWriter,
}

impl Reframe {
    /// Create a new Reframe instance with the given configuration.
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing Reframe v{}", VERSION);
        let validator = UploadValidator::new(config.limits.clone(), &config.conversion);
        let orchestrator = BatchOrchestrator::new(RasterEngine::new(), config.limits.clone());
        let archive = ArchiveWriter::new(config.archive.clone());
        Self {
            config,
            validator,
            orchestrator,
            archive,
        }
    }

    /// Create a new Reframe instance with configuration from the
    /// default location.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::new(config))
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the upload validator, for callers that check payloads before
    /// committing to a batch.
    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    /// Decode one source image and render every spec against it.
    pub async fn run(
        &self,
        source_bytes: Vec<u8>,
        specs: Vec<ImageSpec>,
    ) -> PipelineResult<BatchOutcome> {
        self.orchestrator.run(source_bytes, specs).await
    }

    /// Zip a settled batch in memory, manifest included.
    pub fn write_archive(&self, outcome: &BatchOutcome) -> PipelineResult<Vec<u8>> {
        self.archive.write_to_buffer(outcome)
    }
}

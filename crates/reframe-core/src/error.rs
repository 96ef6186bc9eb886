//! Error types for the Reframe conversion pipeline.
//!
//! Errors are split by blast radius. `PipelineError` covers failures that
//! doom a whole request (undecodable source, archive write), while
//! `SpecRejection` and `TransformError` stay local to one requested output
//! and are reported without aborting sibling transforms.

use thiserror::Error;

/// Top-level error type for Reframe operations.
#[derive(Error, Debug)]
pub enum ReframeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request-fatal pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors surfaced by the image engine while turning bytes into pixels
/// and back.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine could not decode the supplied bytes
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// Encoding the output failed
    #[error("Could not encode {format} output: {message}")]
    Encode { format: String, message: String },
}

/// Request-fatal pipeline errors.
///
/// Any of these dooms the whole batch: without a decodable source or a
/// writable archive no per-spec outcome is meaningful.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source bytes could not be decoded into pixels
    #[error("Could not decode source image: {message}")]
    Decode { message: String },

    /// Source payload exceeds the upload size limit
    #[error("Source file too large: {size_mb}MB > {max_mb}MB")]
    SourceTooLarge { size_mb: u64, max_mb: u64 },

    /// Decoded dimensions exceed the configured cap
    #[error("Source image too large: {width}x{height} > {max_dim}")]
    SourceDimensionsTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Upload failed the extension or signature check
    #[error("Unsupported file type: {detail}")]
    UnsupportedFormat { detail: String },

    /// A pipeline stage exceeded its deadline
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// Writing the output archive failed
    #[error("Archive write failed: {message}")]
    Archive { message: String },

    /// A spawned pipeline task could not be joined
    #[error("Pipeline task failed: {message}")]
    Task { message: String },
}

/// Deterministic geometry rejections for a single requested output.
///
/// The `Display` strings are the user-visible failure reasons; they travel
/// into the archive manifest and API error bodies verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecRejection {
    /// The resize target exceeds the decoded source on either axis
    #[error("Resize dimension is greater than original dimension")]
    ResizeExceedsSource,

    /// The crop origin has a negative component
    #[error("Coordinate value cannot be negative")]
    NegativeCoordinate,

    /// The crop size has a negative component
    #[error("Dimension value cannot be negative")]
    NegativeDimension,

    /// Origin plus crop size runs past the source edge
    #[error("Coordinate and dimension exceed original dimension")]
    CropOutOfBounds,
}

/// Failure of a single requested output.
///
/// Recorded against the spec that produced it; sibling transforms keep
/// running.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Geometry validation rejected the spec before any pixel work
    #[error(transparent)]
    Rejected(#[from] SpecRejection),

    /// The engine failed while cropping, resizing, or encoding
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The transform exceeded its per-spec deadline
    #[error("Transform timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The transform task panicked or was cancelled
    #[error("Transform task failed: {message}")]
    Task { message: String },
}

/// Convenience type alias for Reframe results.
pub type Result<T> = std::result::Result<T, ReframeError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

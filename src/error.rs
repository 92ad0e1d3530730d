use crate::workflow::WorkflowPhase;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while re-encoding a single file. Always recovered per file by the batch loop.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Input too large: {0} bytes. Maximum allowed: {1} bytes")]
    InputTooLarge(u64, u64),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("Could not fit under {limit} bytes, smallest attempt was {smallest} bytes")]
    SizeLimitUnmet { limit: u64, smallest: u64 },

    #[error("Codec worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to persist archive: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No image files selected")]
    EmptySelection,

    #[error("Command not allowed in {actual:?} phase (expected {expected:?})")]
    InvalidPhase {
        expected: WorkflowPhase,
        actual: WorkflowPhase,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid quality value: {0}. Must be between 0.1 and 1.0")]
    InvalidQuality(f32),

    #[error("Invalid max size: {0} MB. Must be at least 0.1 MB")]
    InvalidMaxSize(f64),

    #[error("Invalid max dimension: must be greater than zero")]
    InvalidMaxDimension,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

pub type Result<T> = std::result::Result<T, CompressionError>;

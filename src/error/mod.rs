//! Error handling module for videocompress

use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::model::JobPhase;

/// Main error type for videocompress operations
#[derive(Error, Debug)]
pub enum VideoCompressError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// Settings rejected before reaching the engine
    #[error("Invalid conversion settings: {source}")]
    InvalidSettings {
        #[source]
        source: DomainError,
    },

    /// Engine could not be loaded; the next attempt retries
    #[error("Failed to initialize engine: {source}")]
    EngineInit {
        #[source]
        source: DomainError,
    },

    /// A job stage failed
    #[error("{phase} stage failed: {source}")]
    Stage {
        phase: JobPhase,
        #[source]
        source: DomainError,
    },

    /// Engine ran but reported failure
    #[error("Encoder exited with status {code}")]
    EncoderExit { code: i32 },

    /// A job is already running against this session
    #[error("A conversion is already in progress")]
    Busy,

    /// Output file write error
    #[error("Failed to write output file: {message}")]
    OutputError { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl VideoCompressError {
    pub fn stage(phase: JobPhase, source: DomainError) -> Self {
        VideoCompressError::Stage { phase, source }
    }

    /// Phase the error is attributed to, if it came from a job stage
    pub fn phase(&self) -> Option<JobPhase> {
        match self {
            VideoCompressError::EngineInit { .. } => Some(JobPhase::Initializing),
            VideoCompressError::Stage { phase, .. } => Some(*phase),
            VideoCompressError::EncoderExit { .. } => Some(JobPhase::Encoding),
            _ => None,
        }
    }
}

/// Result type alias for videocompress operations
pub type CompressResult<T> = std::result::Result<T, VideoCompressError>;

//! videocompress Library
//!
//! Converts a video to a smaller, web-friendly file by translating user
//! settings into encoder arguments and running them on an external codec
//! engine, with progress and remaining-time reporting.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    ConversionSettings, ConvertedMedia, JobPhase, RateControl, Resolution, ResolutionPreset,
    SourceMedia, TargetFormat,
};
pub use domain::rules::{CommandBuilder, QualityPolicy};
pub use engine::{EngineHandle, EngineState, TranscodeSession};
pub use error::{CompressResult, VideoCompressError};
pub use ports::{EngineCore, EnginePort};

// Convert interactor - Orchestrates the video conversion use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{ConversionReport, ProgressSnapshot, ProgressTracker, TranscodeSession};
use crate::error::{CompressResult, VideoCompressError};
use crate::output::{OutputWriter, OverwritePolicy};
use crate::utils::path::PathUtils;

/// Form-level choices for one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest {
    pub input_path: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub format: TargetFormat,
    pub resolution: Resolution,
    pub rate_control: RateControl,
    /// Derive CRF from the source size in constant-quality mode
    pub auto_quality: bool,
    pub overwrite: bool,
}

impl ConvertRequest {
    /// Request with the default form choices: mp4, original size, auto CRF
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: None,
            format: TargetFormat::Mp4,
            resolution: Resolution::Original,
            rate_control: RateControl::ConstantQuality { crf: 28 },
            auto_quality: true,
            overwrite: false,
        }
    }

    /// Final settings for a source of `size_bytes`
    pub fn resolve_settings(&self, size_bytes: u64) -> Result<ConversionSettings, DomainError> {
        let rate_control = QualityPolicy::resolve(self.rate_control, self.auto_quality, size_bytes);
        let settings = ConversionSettings::new(self.format, self.resolution, rate_control);
        settings.validate()?;
        Ok(settings)
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct ConvertResponse {
    pub output_path: PathBuf,
    pub report: ConversionReport,
}

/// Interactor for the conversion use case
pub struct ConvertInteractor {
    session: Arc<TranscodeSession>,
}

impl ConvertInteractor {
    /// Create new convert interactor with injected session
    pub fn new(session: Arc<TranscodeSession>) -> Self {
        Self { session }
    }

    /// Read the source, convert it and write `<stem>-compressed.<ext>`
    pub async fn execute<F>(&self, request: &ConvertRequest, mut on_progress: F) -> CompressResult<ConvertResponse>
    where
        F: FnMut(ProgressSnapshot) + Send,
    {
        let source = load_source(&request.input_path).await?;
        let settings = request
            .resolve_settings(source.size())
            .map_err(|source| VideoCompressError::InvalidSettings { source })?;

        info!(
            "Settings for {}: {} / {} / {}",
            source.name, settings.format, settings.resolution, settings.rate_control
        );

        let tracker = ProgressTracker::new();
        let (media, report) = self
            .session
            .convert_with_report(&source, &settings, |percent| {
                on_progress(tracker.observe(percent))
            })
            .await?;

        let dir = PathUtils::output_dir(request.output_dir.as_deref(), &request.input_path);
        let writer = OutputWriter::new(OverwritePolicy::from_flag(request.overwrite));
        let output_path = writer.write_output(&dir, &media.download_name(&source.name), &media.bytes)?;

        Ok(ConvertResponse {
            output_path,
            report,
        })
    }

    /// Engine arguments the request would run with, without running them
    pub async fn plan(&self, request: &ConvertRequest) -> CompressResult<Vec<String>> {
        let size = source_size(&request.input_path).await?;
        let settings = request
            .resolve_settings(size)
            .map_err(|source| VideoCompressError::InvalidSettings { source })?;
        Ok(CommandBuilder::for_settings(INPUT_NAME, &settings))
    }
}

/// Read a user-selected video file
pub(crate) async fn load_source(path: &Path) -> CompressResult<SourceMedia> {
    PathUtils::validate_video_input(path)
        .map_err(|source| VideoCompressError::InvalidSettings { source })?;

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => VideoCompressError::InputFileNotFound {
            path: path.display().to_string(),
        },
        _ => VideoCompressError::IoError(e),
    })?;

    let name = PathUtils::file_name(path).unwrap_or_default();
    Ok(SourceMedia::new(name, bytes))
}

async fn source_size(path: &Path) -> CompressResult<u64> {
    PathUtils::validate_video_input(path)
        .map_err(|source| VideoCompressError::InvalidSettings { source })?;

    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.len())
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VideoCompressError::InputFileNotFound {
                path: path.display().to_string(),
            },
            _ => VideoCompressError::IoError(e),
        })
}

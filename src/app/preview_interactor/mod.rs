// Preview interactor - Short preview clip use case

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::TranscodeSession;
use crate::error::{CompressResult, VideoCompressError};
use crate::output::{OutputWriter, OverwritePolicy};
use crate::utils::path::PathUtils;

use super::convert_interactor::load_source;

/// Request for a two-second preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    pub input_path: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub format: TargetFormat,
    pub crf: u8,
    pub overwrite: bool,
}

/// Interactor for the preview use case
pub struct PreviewInteractor {
    session: Arc<TranscodeSession>,
}

impl PreviewInteractor {
    pub fn new(session: Arc<TranscodeSession>) -> Self {
        Self { session }
    }

    /// Encode the preview and write `<stem>-preview.<ext>`
    pub async fn execute(&self, request: &PreviewRequest) -> CompressResult<PathBuf> {
        RateControl::ConstantQuality { crf: request.crf }
            .validate()
            .map_err(|source| VideoCompressError::InvalidSettings { source })?;

        let source = load_source(&request.input_path).await?;
        info!("Generating preview of {} at crf {}", source.name, request.crf);

        let media = self
            .session
            .preview(&source, request.format, request.crf)
            .await?;

        let file_name = format!(
            "{}-preview.{}",
            source_stem(&source.name),
            request.format.extension()
        );
        let dir = PathUtils::output_dir(request.output_dir.as_deref(), &request.input_path);
        OutputWriter::new(OverwritePolicy::from_flag(request.overwrite))
            .write_output(&dir, &file_name, &media.bytes)
    }
}

impl PreviewRequest {
    pub fn new(input_path: impl Into<PathBuf>, crf: u8) -> Result<Self, DomainError> {
        let input_path = input_path.into();
        PathUtils::validate_video_input(&input_path)?;
        Ok(Self {
            input_path,
            output_dir: None,
            format: TargetFormat::Mp4,
            crf,
            overwrite: false,
        })
    }
}

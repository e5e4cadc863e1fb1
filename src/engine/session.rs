//! Transcode session: runs one job at a time against a shared engine

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::domain::rules::CommandBuilder;
use crate::engine::handle::EngineHandle;
use crate::engine::progress::to_percent;
use crate::error::{CompressResult, VideoCompressError};
use crate::ports::EnginePort;

/// Summary of a finished conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source_name: String,
    pub source_size: u64,
    pub output_size: u64,
    pub mime_type: String,
    pub settings: ConversionSettings,
    pub command: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
}

impl ConversionReport {
    /// Output size relative to source size
    pub fn size_ratio(&self) -> f64 {
        if self.source_size == 0 {
            return 0.0;
        }
        self.output_size as f64 / self.source_size as f64
    }
}

/// Drives the engine through write, encode, read and cleanup.
///
/// Staged files use the fixed names `input` and `output.<ext>`, so jobs on
/// one engine handle are strictly serial, even across sessions sharing it.
/// A job submitted while another is in flight is rejected with
/// [`VideoCompressError::Busy`].
pub struct TranscodeSession {
    engine: EngineHandle,
    phase: watch::Sender<JobPhase>,
}

impl TranscodeSession {
    pub fn new(engine: EngineHandle) -> Self {
        let (phase, _) = watch::channel(JobPhase::Idle);
        Self {
            engine,
            phase,
        }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Phase of the current (or last) job
    pub fn phase(&self) -> JobPhase {
        *self.phase.borrow()
    }

    /// Watch phase transitions
    pub fn subscribe_phase(&self) -> watch::Receiver<JobPhase> {
        self.phase.subscribe()
    }

    /// Convert `source` with `settings`, reporting whole percentages
    pub async fn convert<F>(
        &self,
        source: &SourceMedia,
        settings: &ConversionSettings,
        on_progress: F,
    ) -> CompressResult<ConvertedMedia>
    where
        F: FnMut(u8) + Send,
    {
        self.convert_with_report(source, settings, on_progress)
            .await
            .map(|(media, _)| media)
    }

    /// Like [`convert`](Self::convert), also returning a timing report
    pub async fn convert_with_report<F>(
        &self,
        source: &SourceMedia,
        settings: &ConversionSettings,
        mut on_progress: F,
    ) -> CompressResult<(ConvertedMedia, ConversionReport)>
    where
        F: FnMut(u8) + Send,
    {
        let command = CommandBuilder::for_settings(INPUT_NAME, settings);
        let output_name = settings.format.output_name();
        let started_at = Utc::now();

        info!(
            "Converting {} ({} bytes) to {} at {} with {}",
            source.name,
            source.size(),
            settings.format,
            settings.resolution,
            settings.rate_control
        );

        let bytes = self
            .run_job(&source.bytes, &command, &output_name, Some(&mut on_progress))
            .await?;

        let finished_at = Utc::now();
        let media = ConvertedMedia::new(bytes, settings.format);
        let report = ConversionReport {
            source_name: source.name.clone(),
            source_size: source.size(),
            output_size: media.bytes.len() as u64,
            mime_type: media.mime_type.clone(),
            settings: *settings,
            command,
            started_at,
            finished_at,
            elapsed_secs: (finished_at - started_at).num_milliseconds() as f64 / 1000.0,
        };

        info!(
            "Conversion finished: {} -> {} bytes in {:.1}s",
            report.source_size, report.output_size, report.elapsed_secs
        );
        Ok((media, report))
    }

    /// Encode a short silent preview of `source`
    pub async fn preview(
        &self,
        source: &SourceMedia,
        format: TargetFormat,
        crf: u8,
    ) -> CompressResult<ConvertedMedia> {
        let command = CommandBuilder::build_preview_command(INPUT_NAME, format, crf);
        let bytes = self
            .run_job(&source.bytes, &command, &format.preview_name(), None)
            .await?;
        Ok(ConvertedMedia::new(bytes, format))
    }

    async fn run_job(
        &self,
        input: &[u8],
        command: &[String],
        output_name: &str,
        on_progress: Option<&mut (dyn FnMut(u8) + Send)>,
    ) -> CompressResult<Vec<u8>> {
        let _job = self.engine.begin_job()?;

        self.set_phase(JobPhase::Initializing);
        if let Err(e) = self.engine.ensure_ready().await {
            self.set_phase(JobPhase::Failed);
            return Err(e);
        }

        let port = self.engine.port();
        let result = self
            .stage_and_encode(port, input, command, output_name, on_progress)
            .await;

        self.set_phase(JobPhase::CleaningUp);
        Self::cleanup(port, output_name).await;

        match result {
            Ok(bytes) => {
                self.set_phase(JobPhase::Done);
                Ok(bytes)
            }
            Err(e) => {
                warn!("Job failed: {}", e);
                self.set_phase(JobPhase::Failed);
                Err(e)
            }
        }
    }

    async fn stage_and_encode(
        &self,
        port: &dyn EnginePort,
        input: &[u8],
        command: &[String],
        output_name: &str,
        mut on_progress: Option<&mut (dyn FnMut(u8) + Send)>,
    ) -> CompressResult<Vec<u8>> {
        self.set_phase(JobPhase::Writing);
        port.write_file(INPUT_NAME, input)
            .await
            .map_err(|e| VideoCompressError::stage(JobPhase::Writing, e))?;

        self.set_phase(JobPhase::Encoding);
        debug!("Engine command: {}", command.join(" "));

        let mut progress_rx = port.subscribe_progress();
        let mut percent = 0u8;
        let mut forward = |fraction: f64| {
            // never report less than already reported for this job
            percent = percent.max(to_percent(fraction));
            if let Some(callback) = on_progress.as_mut() {
                callback(percent);
            }
        };

        let exec = port.exec(command);
        tokio::pin!(exec);
        let status = loop {
            tokio::select! {
                status = &mut exec => break status,
                Some(fraction) = progress_rx.recv() => forward(fraction),
            }
        };
        while let Ok(fraction) = progress_rx.try_recv() {
            forward(fraction);
        }

        let code = status.map_err(|e| VideoCompressError::stage(JobPhase::Encoding, e))?;
        if code != 0 {
            return Err(VideoCompressError::EncoderExit { code });
        }

        self.set_phase(JobPhase::Reading);
        port.read_file(output_name)
            .await
            .map_err(|e| VideoCompressError::stage(JobPhase::Reading, e))
    }

    /// Remove both staged files. Failures are logged, never returned.
    async fn cleanup(port: &dyn EnginePort, output_name: &str) {
        let (input, output) =
            tokio::join!(port.delete_file(INPUT_NAME), port.delete_file(output_name));
        for (name, result) in [(INPUT_NAME, input), (output_name, output)] {
            if let Err(e) = result {
                debug!("Cleanup of {} skipped: {}", name, e);
            }
        }
    }

    fn set_phase(&self, phase: JobPhase) {
        debug!("Job phase: {}", phase);
        self.phase.send_replace(phase);
    }
}

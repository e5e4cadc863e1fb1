use std::sync::Arc;

use crate::adapters::toml_config::AppConfig;
use crate::adapters::FfmpegProcessEngine;
use crate::app::{convert_interactor::ConvertInteractor, preview_interactor::PreviewInteractor};
use crate::engine::{EngineHandle, TranscodeSession};
use crate::ports::{EngineCore, EnginePort};

pub trait AppContainer: Send + Sync {
    fn convert_interactor(&self) -> Arc<ConvertInteractor>;
    fn preview_interactor(&self) -> Arc<PreviewInteractor>;
    fn session(&self) -> Arc<TranscodeSession>;
}

/// Wires one engine handle and session into every interactor
pub struct DefaultAppContainer {
    session: Arc<TranscodeSession>,
    convert_interactor: Arc<ConvertInteractor>,
    preview_interactor: Arc<PreviewInteractor>,
}

impl DefaultAppContainer {
    /// Container backed by the ffmpeg process engine
    pub fn new(config: &AppConfig) -> Self {
        let engine: Arc<dyn EnginePort> = match &config.engine.work_dir {
            Some(dir) => Arc::new(FfmpegProcessEngine::with_work_root(dir)),
            None => Arc::new(FfmpegProcessEngine::new()),
        };
        Self::with_engine(engine, EngineCore::new(&config.engine.ffmpeg_path))
    }

    /// Container backed by any engine implementation
    pub fn with_engine(engine: Arc<dyn EnginePort>, core: EngineCore) -> Self {
        let handle = EngineHandle::new(engine, core);
        let session = Arc::new(TranscodeSession::new(handle));

        let convert_interactor = Arc::new(ConvertInteractor::new(Arc::clone(&session)));
        let preview_interactor = Arc::new(PreviewInteractor::new(Arc::clone(&session)));

        Self {
            session,
            convert_interactor,
            preview_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn convert_interactor(&self) -> Arc<ConvertInteractor> {
        Arc::clone(&self.convert_interactor)
    }

    fn preview_interactor(&self) -> Arc<PreviewInteractor> {
        Arc::clone(&self.preview_interactor)
    }

    fn session(&self) -> Arc<TranscodeSession> {
        Arc::clone(&self.session)
    }
}

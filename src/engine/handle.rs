//! Shared, lazily-initialized engine handle

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::{CompressResult, VideoCompressError};
use crate::ports::{EngineCore, EnginePort};

/// Load state of the engine behind a handle
#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    /// Never loaded
    Unloaded,
    /// Loaded and reusable for every later job
    Ready,
    /// Last load attempt failed. Not permanent: the next use retries.
    Failed { attempts: u32, last_error: String },
}

/// Cloneable handle to one engine instance.
///
/// The engine is loaded on first use and stays loaded for the lifetime of
/// the handle. Initialization is serialized, so concurrent callers share a
/// single load; a failed load is recorded and retried by the next caller.
///
/// Jobs stage files under fixed names, so at most one job may run against
/// the engine at a time across every clone of the handle. See
/// [`begin_job`](Self::begin_job).
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    port: Arc<dyn EnginePort>,
    core: EngineCore,
    state: Mutex<EngineState>,
    job_lock: Mutex<()>,
}

impl EngineHandle {
    pub fn new(port: Arc<dyn EnginePort>, core: EngineCore) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                port,
                core,
                state: Mutex::new(EngineState::Unloaded),
                job_lock: Mutex::new(()),
            }),
        }
    }

    /// Engine operations, valid once `ensure_ready` succeeded
    pub fn port(&self) -> &dyn EnginePort {
        self.inner.port.as_ref()
    }

    pub async fn state(&self) -> EngineState {
        self.inner.state.lock().await.clone()
    }

    /// Claim the engine for one job. Fails with `Busy` while another job
    /// holds it; the claim is released when the guard drops.
    pub fn begin_job(&self) -> CompressResult<MutexGuard<'_, ()>> {
        self.inner
            .job_lock
            .try_lock()
            .map_err(|_| VideoCompressError::Busy)
    }

    /// Load the engine unless it is already loaded
    pub async fn ensure_ready(&self) -> CompressResult<()> {
        let mut state = self.inner.state.lock().await;

        let previous_attempts = match &*state {
            EngineState::Ready => return Ok(()),
            EngineState::Unloaded => 0,
            EngineState::Failed {
                attempts,
                last_error,
            } => {
                info!(
                    "Retrying engine initialization after {} failed attempt(s), last error: {}",
                    attempts, last_error
                );
                *attempts
            }
        };

        debug!("Loading engine core from {}", self.inner.core.binary.display());
        match self.inner.port.load(&self.inner.core).await {
            Ok(()) => {
                *state = EngineState::Ready;
                info!("Engine loaded successfully");
                Ok(())
            }
            Err(source) => {
                warn!("Engine initialization failed: {}", source);
                *state = EngineState::Failed {
                    attempts: previous_attempts + 1,
                    last_error: source.to_string(),
                };
                Err(VideoCompressError::EngineInit { source })
            }
        }
    }
}

// Ports - Interface definitions (contracts)

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::errors::*;

/// Location of the engine's core resources
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCore {
    /// Executable or module the engine runs on
    pub binary: PathBuf,
}

impl EngineCore {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// Receiving end of the engine's progress events. Each value is the
/// completed fraction of the running job, nominally in `[0, 1]`.
pub type ProgressReceiver = mpsc::UnboundedReceiver<f64>;

/// Port for the external codec engine.
///
/// The engine owns a private file namespace. Callers stage input with
/// `write_file`, run `exec`, then fetch results with `read_file`. At most one
/// `exec` may run against an engine at a time; callers serialize jobs.
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Load the engine core. Called once per successful initialization.
    async fn load(&self, core: &EngineCore) -> Result<(), DomainError>;

    /// Store bytes under `name` in the engine filesystem
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError>;

    /// Read `name` from the engine filesystem
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError>;

    /// Remove `name` from the engine filesystem
    async fn delete_file(&self, name: &str) -> Result<(), DomainError>;

    /// Run the engine with `args`, returning its exit status
    async fn exec(&self, args: &[String]) -> Result<i32, DomainError>;

    /// Subscribe to progress events. Single subscriber: a new subscription
    /// replaces the previous one, whose receiver then closes.
    fn subscribe_progress(&self) -> ProgressReceiver;
}

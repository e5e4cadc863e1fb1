//! FFmpeg execution adapter
//!
//! Runs a native ffmpeg executable as the codec engine. The engine
//! filesystem is a private temporary directory created at load time and
//! removed when the adapter is dropped.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::ports::*;

/// Global flags placed before every job's arguments
const GLOBAL_ARGS: [&str; 8] = [
    "-hide_banner",
    "-nostdin",
    "-y",
    "-progress",
    "pipe:1",
    "-nostats",
    "-loglevel",
    "info",
];

/// Diagnostic lines kept for failure reports
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based engine adapter
pub struct FfmpegProcessEngine {
    work_root: Option<PathBuf>,
    loaded: Mutex<Option<LoadedEngine>>,
    progress_tx: Mutex<Option<mpsc::UnboundedSender<f64>>>,
}

struct LoadedEngine {
    binary: PathBuf,
    dir: TempDir,
}

impl FfmpegProcessEngine {
    /// Create new adapter; temporary files go to the system temp directory
    pub fn new() -> Self {
        Self {
            work_root: None,
            loaded: Mutex::new(None),
            progress_tx: Mutex::new(None),
        }
    }

    /// Create the engine filesystem under `root` instead
    pub fn with_work_root(root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: Some(root.into()),
            ..Self::new()
        }
    }

    /// Executable and work directory of the loaded engine
    fn loaded_paths(&self) -> Result<(PathBuf, PathBuf), DomainError> {
        let loaded = self
            .loaded
            .lock()
            .map_err(|_| DomainError::InternalError("Engine state lock poisoned".to_string()))?;
        loaded
            .as_ref()
            .map(|engine| (engine.binary.clone(), engine.dir.path().to_path_buf()))
            .ok_or_else(|| DomainError::EngineUnavailable("Engine not loaded".to_string()))
    }

    /// Resolve `name` inside the engine filesystem
    fn file_path(&self, name: &str) -> Result<PathBuf, DomainError> {
        validate_file_name(name)?;
        let (_, dir) = self.loaded_paths()?;
        Ok(dir.join(name))
    }

    fn progress_sender(&self) -> Option<mpsc::UnboundedSender<f64>> {
        self.progress_tx.lock().ok().and_then(|tx| tx.clone())
    }

    fn create_work_dir(&self) -> Result<TempDir, DomainError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("videocompress-");
        let dir = match &self.work_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| DomainError::FsFail(format!("Failed to create engine work directory: {}", e)))
    }
}

impl Default for FfmpegProcessEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnginePort for FfmpegProcessEngine {
    async fn load(&self, core: &EngineCore) -> Result<(), DomainError> {
        let output = Command::new(&core.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::EngineUnavailable(format!(
                    "Cannot run {}: {}",
                    core.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(DomainError::EngineUnavailable(format!(
                "{} -version exited with {}",
                core.binary.display(),
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(version) = stdout.lines().next() {
            info!("Using {}", version);
        }

        let dir = self.create_work_dir()?;
        debug!("Engine work directory: {}", dir.path().display());

        let mut loaded = self
            .loaded
            .lock()
            .map_err(|_| DomainError::InternalError("Engine state lock poisoned".to_string()))?;
        *loaded = Some(LoadedEngine {
            binary: core.binary.clone(),
            dir,
        });
        Ok(())
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let path = self.file_path(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to write {}: {}", name, e)))
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.file_path(name)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DomainError::FileNotFound(name.to_string()),
            _ => DomainError::FsFail(format!("Failed to read {}: {}", name, e)),
        })
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        let path = self.file_path(name)?;
        tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DomainError::FileNotFound(name.to_string()),
            _ => DomainError::FsFail(format!("Failed to delete {}: {}", name, e)),
        })
    }

    async fn exec(&self, args: &[String]) -> Result<i32, DomainError> {
        let (binary, dir) = self.loaded_paths()?;
        let sender = self.progress_sender();

        let mut child = Command::new(&binary)
            .current_dir(&dir)
            .args(GLOBAL_ARGS)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::EngineFailure(format!("Failed to start engine: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DomainError::InternalError("Engine stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DomainError::InternalError("Engine stderr not captured".to_string()))?;

        let mut progress_lines = BufReader::new(stdout).lines();
        let mut log_lines = BufReader::new(stderr).lines();
        let mut progress_done = false;
        let mut log_done = false;
        let mut duration: Option<f64> = None;
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

        while !(progress_done && log_done) {
            tokio::select! {
                line = progress_lines.next_line(), if !progress_done => match line {
                    Ok(Some(line)) => {
                        if let (Some(fraction), Some(tx)) = (parse_progress_line(&line, duration), &sender) {
                            let _ = tx.send(fraction);
                        }
                    }
                    _ => progress_done = true,
                },
                line = log_lines.next_line(), if !log_done => match line {
                    Ok(Some(line)) => {
                        if duration.is_none() {
                            duration = parse_duration_line(&line);
                        }
                        if tail.len() == STDERR_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                    _ => log_done = true,
                },
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::EngineFailure(format!("Failed to wait for engine: {}", e)))?;
        let code = status.code().unwrap_or(-1);

        if code != 0 {
            warn!(
                "Engine exited with status {}:\n{}",
                code,
                tail.iter().cloned().collect::<Vec<_>>().join("\n")
            );
        }
        Ok(code)
    }

    fn subscribe_progress(&self) -> ProgressReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut current) = self.progress_tx.lock() {
            *current = Some(tx);
        }
        rx
    }
}

/// Names must stay inside the engine directory
fn validate_file_name(name: &str) -> Result<(), DomainError> {
    let path = Path::new(name);
    let plain = path.components().count() == 1 && path.file_name().is_some();
    if name.is_empty() || !plain {
        return Err(DomainError::BadArgs(format!(
            "Invalid engine file name: {}",
            name
        )));
    }
    Ok(())
}

/// Input duration in seconds from a `Duration: HH:MM:SS.xx, ...` line
fn parse_duration_line(line: &str) -> Option<f64> {
    let rest = line.trim_start().strip_prefix("Duration:")?;
    let stamp = rest.trim_start().split(',').next()?.trim();
    let seconds = parse_timestamp(stamp)?;
    (seconds > 0.0).then_some(seconds)
}

fn parse_timestamp(stamp: &str) -> Option<f64> {
    let mut parts = stamp.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Completed fraction from one `key=value` progress line
fn parse_progress_line(line: &str, duration: Option<f64>) -> Option<f64> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        // both keys carry microseconds
        "out_time_us" | "out_time_ms" => {
            let total = duration?;
            let micros: f64 = value.parse().ok()?;
            Some((micros / 1_000_000.0 / total).clamp(0.0, 1.0))
        }
        "progress" if value == "end" => Some(1.0),
        _ => None,
    }
}

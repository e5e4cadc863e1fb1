//! Output file writer implementation

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{CompressResult, VideoCompressError};
use crate::output::OverwritePolicy;

/// Writes converted media next to the user's files
pub struct OutputWriter {
    policy: OverwritePolicy,
}

impl OutputWriter {
    pub fn new(policy: OverwritePolicy) -> Self {
        Self { policy }
    }

    /// Write `bytes` to `dir/file_name` through a temporary file and rename.
    /// The target only ever holds complete output.
    pub fn write_output(&self, dir: &Path, file_name: &str, bytes: &[u8]) -> CompressResult<PathBuf> {
        let target = dir.join(file_name);
        info!("Writing output file: {}", target.display());

        if self.policy == OverwritePolicy::Never && target.exists() {
            return Err(VideoCompressError::OutputError {
                message: format!(
                    "{} already exists (use --overwrite to replace it)",
                    target.display()
                ),
            });
        }

        std::fs::create_dir_all(dir).map_err(|e| VideoCompressError::OutputError {
            message: format!("Failed to create output directory {}: {}", dir.display(), e),
        })?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| VideoCompressError::OutputError {
            message: format!("Failed to create temporary file: {}", e),
        })?;
        temp.write_all(bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| VideoCompressError::OutputError {
                message: format!("Failed to write data: {}", e),
            })?;

        let persisted = match self.policy {
            OverwritePolicy::Always => temp.persist(&target),
            OverwritePolicy::Never => temp.persist_noclobber(&target),
        };
        persisted.map_err(|e| VideoCompressError::OutputError {
            message: format!("Failed to move output into place: {}", e.error),
        })?;

        info!("Output file written successfully: {}", target.display());
        Ok(target)
    }
}

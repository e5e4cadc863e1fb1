//! Path helpers for input selection and output naming

use std::path::{Path, PathBuf};

use crate::domain::errors::DomainError;

/// Extensions accepted as video input
const VIDEO_EXTENSIONS: &[&str] = &[
    "3gp", "avi", "flv", "m2ts", "m4v", "mkv", "mov", "mp4", "mpeg", "mpg", "mts", "ogv", "ts",
    "webm", "wmv",
];

/// Path utilities
pub struct PathUtils;

impl PathUtils {
    /// Get lowercase file extension from path
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// File name component as a string
    pub fn file_name(path: &Path) -> Option<String> {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
    }

    /// Check the input looks like a video by its extension
    pub fn validate_video_input(path: &Path) -> Result<(), DomainError> {
        match Self::get_extension(path) {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            Some(ext) => Err(DomainError::BadArgs(format!(
                "Not a video file: {} (.{} is not a supported video extension)",
                path.display(),
                ext
            ))),
            None => Err(DomainError::BadArgs(format!(
                "Not a video file: {} has no extension",
                path.display()
            ))),
        }
    }

    /// Output directory: explicit choice, else the input's directory
    pub fn output_dir(explicit: Option<&Path>, input: &Path) -> PathBuf {
        match explicit {
            Some(dir) => dir.to_path_buf(),
            None => input
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

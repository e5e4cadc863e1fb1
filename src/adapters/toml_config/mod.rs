// TOML config adapter - Tool configuration loaded from TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::*;
use crate::utils::logging::LogFormat;

/// Default config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "videocompress.toml";

/// Tool configuration. Conversion settings are never stored here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineSection,
    pub log: LogSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Engine executable
    pub ffmpeg_path: PathBuf,
    /// Parent directory for the engine's temporary filesystem
    pub work_dir: Option<PathBuf>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            work_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory for converted files; defaults to the input's directory
    pub dir: Option<PathBuf>,
    /// Replace existing output files
    pub overwrite: bool,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration from TOML text
    pub fn parse(toml_content: &str) -> Result<AppConfig, DomainError> {
        let config: AppConfig = toml::from_str(toml_content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load(file_path: &Path) -> Result<AppConfig, DomainError> {
        if !file_path.exists() {
            return Err(DomainError::FileNotFound(format!(
                "Config file does not exist: {}",
                file_path.display()
            )));
        }

        let content = std::fs::read_to_string(file_path)
            .map_err(|e| DomainError::FsFail(format!("Failed to read config file: {}", e)))?;
        Self::parse(&content)
    }

    /// Serialize configuration to TOML text
    pub fn serialize(config: &AppConfig) -> Result<String, DomainError> {
        toml::to_string_pretty(config)
            .map_err(|e| DomainError::InternalError(format!("Failed to serialize config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(config: &AppConfig) -> Result<(), DomainError> {
        crate::utils::logging::parse_level(&config.log.level)?;
        if config.engine.ffmpeg_path.as_os_str().is_empty() {
            return Err(DomainError::BadArgs(
                "engine.ffmpeg_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-user config file path
    pub fn default_config_path() -> Option<PathBuf> {
        // %APPDATA% on Windows, XDG config home or ~/.config elsewhere
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join("videocompress").join("config.toml"));
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("videocompress").join("config.toml"));
        }
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config").join("videocompress").join("config.toml"))
    }
}

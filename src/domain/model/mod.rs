// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Name under which the source bytes are staged in the engine filesystem
pub const INPUT_NAME: &str = "input";

/// Stem of the file the engine writes its result to
pub const OUTPUT_STEM: &str = "output";

/// Stem of the short preview file
pub const PREVIEW_STEM: &str = "preview";

/// Highest constant-rate-factor value the encoder accepts
pub const MAX_CRF: u8 = 51;

/// Source video handed over by the user, never mutated
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMedia {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceMedia {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Output container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    Mp4,
}

impl TargetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Mp4 => "mp4",
        }
    }

    /// Media type of the produced file
    pub fn mime_type(&self) -> String {
        format!("video/{}", self.extension())
    }

    /// Engine filesystem name of the converted file
    pub fn output_name(&self) -> String {
        format!("{}.{}", OUTPUT_STEM, self.extension())
    }

    /// Engine filesystem name of the preview file
    pub fn preview_name(&self) -> String {
        format!("{}.{}", PREVIEW_STEM, self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp4" => Ok(TargetFormat::Mp4),
            other => Err(DomainError::BadArgs(format!(
                "Unsupported format: {}. Supported formats: mp4",
                other
            ))),
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Fixed output sizes offered next to "original" and "custom"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionPreset {
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
}

impl ResolutionPreset {
    pub const ALL: [ResolutionPreset; 4] = [
        ResolutionPreset::P1080,
        ResolutionPreset::P720,
        ResolutionPreset::P480,
        ResolutionPreset::P360,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ResolutionPreset::P1080 => "1080p",
            ResolutionPreset::P720 => "720p",
            ResolutionPreset::P480 => "480p",
            ResolutionPreset::P360 => "360p",
        }
    }

    /// Width and height in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ResolutionPreset::P1080 => (1920, 1080),
            ResolutionPreset::P720 => (1280, 720),
            ResolutionPreset::P480 => (854, 480),
            ResolutionPreset::P360 => (640, 360),
        }
    }

    /// Look up a preset by key, falling back to 1080p for unknown keys
    pub fn from_key_or_default(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|preset| preset.key().eq_ignore_ascii_case(key.trim()))
            .unwrap_or_else(|| {
                tracing::warn!("Unknown resolution preset '{}', using 1080p", key);
                ResolutionPreset::P1080
            })
    }
}

/// Requested output resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resolution {
    /// Keep the source dimensions
    #[default]
    Original,
    Preset { preset: ResolutionPreset },
    Custom { width: u32, height: u32 },
}

impl Resolution {
    /// Resolve a form-style key. `custom` takes the given pair; any other
    /// non-original key is treated as a preset name.
    pub fn from_key(key: &str, custom: (u32, u32)) -> Self {
        match key.trim().to_lowercase().as_str() {
            "original" => Resolution::Original,
            "custom" => Resolution::Custom {
                width: custom.0,
                height: custom.1,
            },
            other => Resolution::Preset {
                preset: ResolutionPreset::from_key_or_default(other),
            },
        }
    }

    /// Concrete target size, or `None` to keep the source size
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Resolution::Original => None,
            Resolution::Preset { preset } => Some(preset.dimensions()),
            Resolution::Custom { width, height } => Some((*width, *height)),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Original => f.write_str("original"),
            Resolution::Preset { preset } => f.write_str(preset.key()),
            Resolution::Custom { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

/// Rate-control mode with its mode-specific value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RateControl {
    /// Quality-targeting; lower CRF means higher quality and larger output
    ConstantQuality { crf: u8 },
    /// Size-targeting average bitrate in kbps
    ConstantBitrate { kbps: u32 },
}

impl RateControl {
    pub fn validate(&self) -> Result<(), DomainError> {
        match *self {
            RateControl::ConstantQuality { crf } if crf > MAX_CRF => {
                Err(DomainError::InvalidSettings(format!(
                    "CRF value {} exceeds {}",
                    crf, MAX_CRF
                )))
            }
            RateControl::ConstantBitrate { kbps: 0 } => Err(DomainError::InvalidSettings(
                "Bitrate must be greater than 0 kbps".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RateControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateControl::ConstantQuality { crf } => write!(f, "crf {}", crf),
            RateControl::ConstantBitrate { kbps } => write!(f, "cbr {}k", kbps),
        }
    }
}

/// Settings for one conversion, immutable once built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSettings {
    pub format: TargetFormat,
    pub resolution: Resolution,
    pub rate_control: RateControl,
}

impl ConversionSettings {
    pub fn new(format: TargetFormat, resolution: Resolution, rate_control: RateControl) -> Self {
        Self {
            format,
            resolution,
            rate_control,
        }
    }

    /// Check ranges before the settings reach the command builder
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Resolution::Custom { width, height } = self.resolution {
            if width == 0 || height == 0 {
                return Err(DomainError::InvalidSettings(format!(
                    "Custom resolution must be positive, got {}x{}",
                    width, height
                )));
            }
        }
        self.rate_control.validate()
    }
}

/// Lifecycle of one conversion job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    Idle,
    Initializing,
    Writing,
    Encoding,
    Reading,
    CleaningUp,
    Done,
    Failed,
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Done | JobPhase::Failed)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobPhase::Idle => "idle",
            JobPhase::Initializing => "initializing",
            JobPhase::Writing => "writing",
            JobPhase::Encoding => "encoding",
            JobPhase::Reading => "reading",
            JobPhase::CleaningUp => "cleanup",
            JobPhase::Done => "done",
            JobPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Transcoded bytes together with their media type
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedMedia {
    pub bytes: Vec<u8>,
    pub format: TargetFormat,
    pub mime_type: String,
}

impl ConvertedMedia {
    pub fn new(bytes: Vec<u8>, format: TargetFormat) -> Self {
        Self {
            mime_type: format.mime_type(),
            bytes,
            format,
        }
    }

    /// `<stem>-compressed.<ext>` for the given source file name
    pub fn download_name(&self, source_name: &str) -> String {
        format!(
            "{}-compressed.{}",
            source_stem(source_name),
            self.format.extension()
        )
    }
}

/// File name with its last extension removed. A name without a dot has an
/// empty stem.
pub fn source_stem(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[..idx].to_string(),
        None => String::new(),
    }
}

//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::app::{ConvertRequest, PreviewRequest};
use crate::domain::errors::DomainError;
use crate::domain::model::*;

/// Manual quality used when auto-quality is off and none is given
pub const DEFAULT_MANUAL_CRF: u8 = 28;
pub const DEFAULT_BITRATE_KBPS: u32 = 4000;

/// Rate-control mode choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RateControlMode {
    /// Constant rate factor (quality target)
    Crf,
    /// Constant bitrate (size target)
    Cbr,
}

fn parse_crf(value: &str) -> Result<u8, String> {
    clap_num::number_range(value, 0, MAX_CRF)
}

fn parse_positive(value: &str) -> Result<u32, String> {
    clap_num::number_range(value, 1, u32::MAX)
}

/// Conversion settings shared by `convert` and `command`
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output container format
    #[arg(short, long, default_value = "mp4")]
    pub format: String,

    /// Output resolution
    #[arg(
        short,
        long,
        default_value = "original",
        value_parser = ["original", "1080p", "720p", "480p", "360p", "custom"]
    )]
    pub resolution: String,

    /// Width for --resolution custom
    #[arg(long, default_value_t = 1920, value_parser = parse_positive)]
    pub width: u32,

    /// Height for --resolution custom
    #[arg(long, default_value_t = 1080, value_parser = parse_positive)]
    pub height: u32,

    /// Rate-control mode
    #[arg(long, value_enum, default_value_t = RateControlMode::Crf)]
    pub rate_control: RateControlMode,

    /// Constant Rate Factor (0-51); disables auto quality
    #[arg(short, long, value_parser = parse_crf)]
    pub quality: Option<u8>,

    /// Target bitrate in kbps for --rate-control cbr
    #[arg(short, long, default_value_t = DEFAULT_BITRATE_KBPS, value_parser = parse_positive)]
    pub bitrate: u32,

    /// Do not derive quality from the file size
    #[arg(long)]
    pub no_auto_quality: bool,
}

impl SettingsArgs {
    /// Turn the flags into a conversion request
    pub fn to_request(&self) -> Result<ConvertRequest, DomainError> {
        let format: TargetFormat = self.format.parse()?;
        let resolution = Resolution::from_key(&self.resolution, (self.width, self.height));
        let rate_control = match self.rate_control {
            RateControlMode::Crf => RateControl::ConstantQuality {
                crf: self.quality.unwrap_or(DEFAULT_MANUAL_CRF),
            },
            RateControlMode::Cbr => RateControl::ConstantBitrate { kbps: self.bitrate },
        };

        let mut request = ConvertRequest::new(&self.input);
        request.format = format;
        request.resolution = resolution;
        request.rate_control = rate_control;
        // an explicit quality is a manual override
        request.auto_quality = !self.no_auto_quality && self.quality.is_none();
        Ok(request)
    }
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Output directory (default: next to the input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Replace an existing output file
    #[arg(long)]
    pub overwrite: bool,

    /// Print a JSON conversion report to stdout
    #[arg(long)]
    pub report: bool,
}

/// Arguments for the command command
#[derive(Args, Debug)]
pub struct CommandArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Print the arguments as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Constant Rate Factor (0-51)
    #[arg(short, long, default_value_t = DEFAULT_MANUAL_CRF, value_parser = parse_crf)]
    pub quality: u8,

    /// Output container format
    #[arg(short, long, default_value = "mp4")]
    pub format: String,

    /// Output directory (default: next to the input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Replace an existing output file
    #[arg(long)]
    pub overwrite: bool,
}

impl PreviewArgs {
    pub fn to_request(&self) -> Result<PreviewRequest, DomainError> {
        let mut request = PreviewRequest::new(&self.input, self.quality)?;
        request.format = self.format.parse()?;
        request.output_dir = self.output_dir.clone();
        request.overwrite = self.overwrite;
        Ok(request)
    }
}

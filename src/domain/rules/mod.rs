// Domain rules - Quality heuristic and encoder command construction

use crate::domain::model::*;

/// Video encoder used for every conversion
pub const VIDEO_CODEC: &str = "libx264";
/// Speed/quality tradeoff preset for full conversions
pub const ENCODE_PRESET: &str = "faster";
/// Content tuning hint for full conversions
pub const ENCODE_TUNE: &str = "film";
pub const AUDIO_CODEC: &str = "aac";
pub const AUDIO_BITRATE: &str = "128k";
/// Length of a preview clip in seconds
pub const PREVIEW_SECONDS: u32 = 2;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Default CRF selection from source size
pub struct QualityPolicy;

impl QualityPolicy {
    /// Step function over the size in megabytes. Larger sources get a higher
    /// CRF so that output size grows slower than input size.
    pub fn auto_quality(size_bytes: u64) -> u8 {
        let size_mb = size_bytes as f64 / BYTES_PER_MB;

        if size_mb < 5.0 {
            23
        } else if size_mb < 20.0 {
            26
        } else if size_mb < 50.0 {
            29
        } else if size_mb < 100.0 {
            31
        } else {
            33
        }
    }

    /// Rate control after applying the heuristic. Only constant-quality mode
    /// with auto-quality enabled is affected.
    pub fn resolve(rate_control: RateControl, auto_quality: bool, size_bytes: u64) -> RateControl {
        match rate_control {
            RateControl::ConstantQuality { .. } if auto_quality => RateControl::ConstantQuality {
                crf: Self::auto_quality(size_bytes),
            },
            other => other,
        }
    }
}

/// Translates conversion settings into engine arguments
pub struct CommandBuilder;

impl CommandBuilder {
    /// Full conversion command. Total: values are passed through unchecked,
    /// validation happens on `ConversionSettings` before this is called.
    pub fn build_command(
        input_ref: &str,
        format: TargetFormat,
        rate_control: RateControl,
        resolution: Resolution,
    ) -> Vec<String> {
        let mut command = vec!["-i".to_string(), input_ref.to_string()];

        if let Some((width, height)) = resolution.dimensions() {
            command.push("-vf".to_string());
            command.push(format!("scale={}:{}", width, height));
        }

        command.extend(args(&[
            "-c:v",
            VIDEO_CODEC,
            "-movflags",
            "+faststart",
        ]));

        match rate_control {
            RateControl::ConstantQuality { crf } => {
                command.push("-crf".to_string());
                command.push(crf.to_string());
                // zero bitrate target leaves the CRF authoritative
                command.push("-b:v".to_string());
                command.push("0".to_string());
            }
            RateControl::ConstantBitrate { kbps } => {
                let target = kbps as f64;
                command.push("-b:v".to_string());
                command.push(kbps_arg(target));
                command.push("-maxrate".to_string());
                command.push(kbps_arg(target * 1.5));
                command.push("-bufsize".to_string());
                command.push(kbps_arg(target * 2.0));
            }
        }

        command.extend(args(&[
            "-preset",
            ENCODE_PRESET,
            "-tune",
            ENCODE_TUNE,
            "-c:a",
            AUDIO_CODEC,
            "-b:a",
            AUDIO_BITRATE,
        ]));
        command.push(format.output_name());

        command
    }

    /// Build the command for a full conversion from settings
    pub fn for_settings(input_ref: &str, settings: &ConversionSettings) -> Vec<String> {
        Self::build_command(
            input_ref,
            settings.format,
            settings.rate_control,
            settings.resolution,
        )
    }

    /// Short silent preview encoded for fast decoding
    pub fn build_preview_command(input_ref: &str, format: TargetFormat, crf: u8) -> Vec<String> {
        let mut command = args(&["-i", input_ref, "-t"]);
        command.push(PREVIEW_SECONDS.to_string());
        command.extend(args(&["-c:v", VIDEO_CODEC, "-crf"]));
        command.push(crf.to_string());
        command.extend(args(&["-preset", "veryfast", "-tune", "fastdecode", "-an"]));
        command.push(format.preview_name());
        command
    }

    /// Recover the rate control from a built command
    pub fn parse_rate_control(command: &[String]) -> Option<RateControl> {
        let value_of = |flag: &str| {
            command
                .iter()
                .position(|arg| arg == flag)
                .and_then(|idx| command.get(idx + 1))
        };

        if let Some(crf) = value_of("-crf") {
            return crf
                .parse()
                .ok()
                .map(|crf| RateControl::ConstantQuality { crf });
        }

        let bitrate = value_of("-b:v")?;
        bitrate
            .strip_suffix('k')
            .and_then(|kbps| kbps.parse().ok())
            .map(|kbps| RateControl::ConstantBitrate { kbps })
    }
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// f64 Display drops a zero fraction, so 6000.0 renders as "6000k"
fn kbps_arg(kbps: f64) -> String {
    format!("{}k", kbps)
}

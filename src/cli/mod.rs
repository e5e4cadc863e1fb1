//! CLI module for videocompress
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

/// videocompress
///
/// Convert a video to a smaller web-friendly file. Encoding is done by an
/// external ffmpeg executable; nothing leaves the machine.
#[derive(Parser, Debug)]
#[command(name = "videocompress")]
#[command(about = "videocompress - Video format and bitrate converter")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (overridden by RUST_LOG)
    #[arg(long, global = true, env = "VIDEOCOMPRESS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true, env = "VIDEOCOMPRESS_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// ffmpeg executable to use as the engine
    #[arg(long, global = true, env = "VIDEOCOMPRESS_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a video file
    Convert(args::ConvertArgs),
    /// Print the engine arguments a conversion would use
    Command(args::CommandArgs),
    /// Encode a two-second silent preview
    Preview(args::PreviewArgs),
}

//! videocompress CLI
//!
//! Converts a video file into a smaller web-friendly MP4 using an external
//! ffmpeg engine.
//!
//! # Usage
//!
//! ```bash
//! videocompress convert --input holiday.mov
//! videocompress convert --input holiday.mov --resolution 720p --rate-control cbr --bitrate 2500
//! videocompress command --input holiday.mov --resolution custom --width 1280 --height 720
//! videocompress preview --input holiday.mov --quality 30
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use videocompress::app::DefaultAppContainer;
use videocompress::cli::{commands, Cli, Commands};
use videocompress::config_initialization::initialize_configuration_hierarchy;
use videocompress::utils::logging::init_logging;

/// Main entry point for the videocompress CLI
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let loaded = initialize_configuration_hierarchy(&cli)?;
    let config = loaded.config;

    // Initialize logging
    init_logging(&config.log.level, config.log.format)?;

    info!("Starting videocompress");
    match &loaded.source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    if loaded.env_overrides > 0 {
        info!("Applied {} environment variable overrides", loaded.env_overrides);
    }

    let container = DefaultAppContainer::new(&config);

    // Execute the requested command
    match cli.command {
        Commands::Convert(args) => {
            info!("Executing convert command");
            commands::execute_convert(&container, &config, args).await?;
        }
        Commands::Command(args) => {
            commands::execute_command(&container, args).await?;
        }
        Commands::Preview(args) => {
            info!("Executing preview command");
            commands::execute_preview(&container, args).await?;
        }
    }

    info!("videocompress completed successfully");
    Ok(())
}

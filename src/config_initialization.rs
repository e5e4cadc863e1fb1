//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter, LOCAL_CONFIG_FILE};
use crate::cli::Cli;

/// Environment variables read after the config file
const ENV_WORK_DIR: &str = "VIDEOCOMPRESS_WORK_DIR";
const ENV_OUTPUT_DIR: &str = "VIDEOCOMPRESS_OUTPUT_DIR";
const ENV_OVERWRITE: &str = "VIDEOCOMPRESS_OVERWRITE";

/// Resolved configuration and the file it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
    pub env_overrides: usize,
}

/// Build configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<LoadedConfig> {
    // Step 1 + 2: defaults, then the first config file found
    let (mut config, source) = load_config_file(cli)?;

    // Step 3: environment variables
    let env_overrides = apply_environment_overrides(&mut config, |key| std::env::var(key).ok())?;

    // Step 4: CLI arguments (clap already folded their env fallbacks in)
    apply_cli_overrides(&mut config, cli);

    TomlConfigAdapter::validate(&config)
        .context("Invalid configuration")?;

    Ok(LoadedConfig {
        config,
        source,
        env_overrides,
    })
}

/// Load the explicit `--config` file, else the first existing default path
fn load_config_file(cli: &Cli) -> Result<(AppConfig, Option<PathBuf>)> {
    if let Some(path) = &cli.config {
        let config = TomlConfigAdapter::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        return Ok((config, Some(path.clone())));
    }

    let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
        .chain(TomlConfigAdapter::default_config_path());
    for path in candidates {
        if path.exists() {
            let config = TomlConfigAdapter::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            return Ok((config, Some(path)));
        }
    }

    Ok((AppConfig::default(), None))
}

/// Apply `VIDEOCOMPRESS_*` variables; returns how many were applied
pub fn apply_environment_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;

    if let Some(dir) = lookup(ENV_WORK_DIR) {
        config.engine.work_dir = Some(PathBuf::from(dir));
        applied += 1;
    }
    if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
        config.output.dir = Some(PathBuf::from(dir));
        applied += 1;
    }
    if let Some(value) = lookup(ENV_OVERWRITE) {
        config.output.overwrite = value
            .trim()
            .parse()
            .with_context(|| format!("{} must be true or false, got '{}'", ENV_OVERWRITE, value))?;
        applied += 1;
    }

    Ok(applied)
}

fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.engine.ffmpeg_path = ffmpeg.clone();
    }
}
